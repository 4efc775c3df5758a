//! Session authorization gate for the appointment platform.
//!
//! Decides, for every incoming navigation, whether the requester may
//! proceed, must be redirected to authentication, or must be redirected
//! away because their role does not match the resource. Two cooperating
//! components evaluated at different times in the request lifecycle:
//!
//! - the **edge gate** ([`gate::evaluate`]): a synchronous, pure decision
//!   function run before any content is produced, reading only the signed
//!   token/role pair and the target path;
//! - the **route guard** ([`guard::RouteGuard`]): a per-view state machine
//!   run after mount with the full resolved identity, kept consistent
//!   across browsing contexts by the [`events::ChangeBus`].
//!
//! Between them sits the [`identity::IdentityStore`], the per-context
//! source of truth for "who is logged in now", backed by the durable
//! [`session::SessionStore`] shared across contexts of one profile.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod guard;
pub mod identity;
pub mod observability;
pub mod routes;
pub mod session;

pub use config::Config;
pub use error::GateError;
pub use events::{ChangeBus, ChangeListener};
pub use gate::{Decision, evaluate, evaluate_request};
pub use guard::{GuardState, RouteGuard};
pub use identity::{Credentials, IdentitySnapshot, IdentityStore};
pub use routes::{Role, RouteClass, RouteTable};
pub use session::{SessionRecord, SessionStore, SessionToken};
