mod crypto;
mod extractor;
mod jwt;

pub use crypto::{hash_password, verify_password};
pub use extractor::{AuthUser, CreatorUser};
pub use jwt::{AuthError, JwtHandler, TokenPair};
