//! Domain services for vehicle booking.
//!
//! Lifecycle rules plus the external collaborators (identity provider,
//! object storage) the booking flow depends on.

pub mod identity;
pub mod lifecycle;
pub mod storage;

pub use identity::{ExternalIdentity, IdentityError, IdentityVerifier, MockIdentityVerifier};
pub use lifecycle::{authorize, can_view, plan, Actor, AuthorizationError, LifecycleError};
pub use storage::{photo_object_key, MockObjectStorage, ObjectStorage, StorageError, StoredObject};
