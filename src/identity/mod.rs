//! Client-held identity: the snapshot shape, the backend contract, and the
//! per-context store tying them to durable session state.

pub mod backend;
pub mod snapshot;
pub mod store;

pub use backend::{HttpIdentityBackend, IdentityBackend, LoginOutcome, ProfilePayload};
pub use snapshot::IdentitySnapshot;
pub use store::{Credentials, IdentityStore};
