//! Role resolution and access gating for the terrace platform.
//!
//! This crate provides:
//! - Session and role models (`Session`, `Role`)
//! - The role cache (`RoleCache`, `InMemoryRoleCache`)
//! - The role resolver with override precedence (`RoleResolver`)
//! - The permission gate (`PermissionGate`, `AccessDecision`)
//! - The safety timeout bounding pending checks (`SafetyTimeout`)
//! - The identity-provider interface (`IdentityProvider`, `SessionEvent`)
//!
//! # Access Control Model
//!
//! Every user holds at most one role, resolved with override precedence:
//! a trusted-domain email is an admin, a provider-membership row is a
//! provider, and otherwise the generic role relation decides. An admin
//! satisfies every requirement and a manager additionally satisfies
//! user-level requirements. An unresolved role never grants access.
//!
//! # Example
//!
//! ```
//! use terrace_access::cache::{InMemoryRoleCache, RoleCache};
//! use terrace_access::{AccessRequirement, Role};
//!
//! // A manager opening a user-level surface is allowed through.
//! let requirement = AccessRequirement::role(Role::User);
//! assert_eq!(requirement.required_role(), Some(Role::User));
//! assert!(Role::Manager.satisfies(Role::User));
//!
//! // Resolved roles are cached; negative results are not.
//! let cache = InMemoryRoleCache::new();
//! cache.put(Some(Role::Manager));
//! assert_eq!(cache.get(), Some(Role::Manager));
//! cache.put(None);
//! assert_eq!(cache.get(), None);
//! ```

pub mod cache;
pub mod config;
#[cfg(feature = "dev-fallback")]
pub mod dev;
pub mod error;
pub mod gate;
pub mod identity;
pub mod notify;
pub mod resolver;
pub mod retry;
pub mod role;
pub mod session;
pub mod timeout;

// Re-export main types at crate root
pub use cache::{InMemoryRoleCache, RoleCache};
pub use config::{AccessConfig, RetryConfig};
pub use error::IdentityError;
pub use gate::{AccessDecision, AccessRequirement, DenyReason, PermissionGate, RedirectTarget};
pub use identity::{
    Credentials, HttpIdentityProvider, IdentityProvider, SessionEvent, StaticIdentityProvider,
    watch_sessions,
};
pub use notify::{Notification, Notifier, Severity, TracingNotifier};
pub use resolver::RoleResolver;
pub use retry::RetryPolicy;
pub use role::{ParseRoleError, Role};
pub use session::{EmailDomain, Session, SessionId};
pub use timeout::SafetyTimeout;

#[cfg(feature = "dev-fallback")]
pub use dev::DevelopmentFallback;
