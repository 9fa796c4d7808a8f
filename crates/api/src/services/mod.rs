//! External service integrations.

pub mod line_auth;
pub mod object_storage;

pub use line_auth::LineIdentityVerifier;
pub use object_storage::HttpObjectStorage;
