mod config;
mod department_keywords;
mod jwt;
mod password;
mod password_reset;
mod policy;
mod role_assignment;
mod session;
mod traits;
mod visibility;

pub use config::*;
pub use department_keywords::*;
pub use jwt::*;
pub use password::*;
pub use password_reset::*;
pub use policy::*;
pub use role_assignment::*;
pub use session::*;
pub use traits::*;
pub use visibility::*;
