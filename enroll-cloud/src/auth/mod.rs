//! Actor authentication and role policy

pub mod actor_auth;
pub mod policy;

pub use actor_auth::{Actor, actor_auth_middleware};
pub use policy::{RolePolicy, ScopeRule, policy_for};
