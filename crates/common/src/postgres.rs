mod analytics_repository;
mod client;
mod config;
mod convention_repository;
mod event_repository;
mod news_repository;
mod newsletter_repository;
mod password_reset_token_repository;
mod predicate;
mod representative_repository;
mod support;
mod user_repository;

pub use analytics_repository::*;
pub use client::*;
pub use config::*;
pub use convention_repository::*;
pub use event_repository::*;
pub use news_repository::*;
pub use newsletter_repository::*;
pub use password_reset_token_repository::*;
pub use predicate::*;
pub use representative_repository::*;
pub use user_repository::*;
