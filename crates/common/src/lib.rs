pub mod auth;
pub mod domain;
pub mod email;
pub mod garde;
pub mod http;
pub mod postgres;
pub mod telemetry;
