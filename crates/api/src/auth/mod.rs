//! Console authentication primitives: password hashing, JWT access
//! tokens, and opaque refresh tokens.

pub mod jwt;
pub mod password;
pub mod refresh;
