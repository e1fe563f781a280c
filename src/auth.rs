//! Auth-domain identifiers, roles, permission sets, claims, and credential material.

pub mod claims;
pub mod credential;
pub mod id;
pub mod permission;
pub mod role;

pub use claims::*;
pub use credential::*;
pub use id::*;
pub use permission::*;
pub use role::*;
