//! Account authentication
//!
//! - password: salted HMAC-SHA256 hashes in the `sha256$salt$digest` format
//! - session: server-side sessions and the cookies that carry them
//! - validation: sign-up and login form rules
//! - middleware: gating of protected pages and API routes

pub mod middleware;
pub mod password;
pub mod session;
pub mod validation;

pub use middleware::{CurrentUser, authenticate, require_api_auth, require_page_auth};
pub use password::{hash_password, verify_password};
pub use session::{Session, SessionStore};
pub use validation::{LoginForm, SignUpForm, validate_sign_up};
