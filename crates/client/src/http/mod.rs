//! HTTP session management.

mod session;

pub use session::{HttpSession, SessionConfig};
