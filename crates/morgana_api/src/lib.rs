pub mod domain;
pub mod http;
pub mod morgana_api;

pub use domain::*;
pub use http::*;
pub use morgana_api::*;
