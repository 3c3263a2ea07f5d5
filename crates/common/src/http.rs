mod cookie;
mod error;
mod logging;
mod server;
mod tracing;

pub use cookie::*;
pub use error::*;
pub use logging::*;
pub use server::*;
pub use self::tracing::*;
