mod analytics;
mod content;
mod convention;
mod event;
mod news;
mod newsletter;
mod query;
mod representative;
mod result;
mod role;
mod user;

pub use analytics::*;
pub use content::*;
pub use convention::*;
pub use event::*;
pub use news::*;
pub use newsletter::*;
pub use query::*;
pub use representative::*;
pub use result::*;
pub use role::*;
pub use user::*;
