mod analytics_service;
mod convention_service;
mod event_service;
mod news_service;
mod newsletter_service;
mod parsing;
mod representative_service;
mod user_service;

pub use analytics_service::*;
pub use convention_service::*;
pub use event_service::*;
pub use news_service::*;
pub use newsletter_service::*;
pub use representative_service::*;
pub use user_service::*;
