mod sender;
mod templates;

pub use sender::*;
pub use templates::*;
