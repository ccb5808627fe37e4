//! Domain types shared by the services and the HTTP layer.
//!
//! Roles and the authorization policy live here so that permission decisions
//! can be tested without a database or a router.

pub mod policy;
pub mod role;
pub mod validate;

pub use policy::{Action, Caller, Denial, Principal, Resource, allowed, authorize};
pub use role::Role;
pub use validate::FieldError;
