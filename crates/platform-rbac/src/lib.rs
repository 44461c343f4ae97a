//! # Platform RBAC (Role-Based Access Control)
//!
//! Permissions and policy evaluation for platform tenancy operations.
//!
//! ## Overview
//!
//! The platform-rbac crate handles:
//! - **Resources**: Tenancy resource types (users, organizations, memberships)
//! - **Actions**: Operations that can be performed on resources
//! - **Permissions**: Resource + Action combinations
//! - **Permission Sets**: Collections of permissions granted to a subject
//! - **Policy**: The [`Authorizer`] interface services are handed
//!
//! ## Architecture
//!
//! ```text
//! Permission = Resource + Action [+ Resource ID]
//!
//! Examples:
//!   "organization:create"          - Create organizations
//!   "organization:update:<org-id>" - Update one organization
//!   "organization:manage"          - Full control of organizations
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use platform_rbac::{Authorizer, Permission, StaticPolicy};
//! use uuid::Uuid;
//!
//! let blocked = Uuid::now_v7();
//! let policy = StaticPolicy::organization_creators().deny_all(blocked);
//!
//! assert!(policy.authorize(Uuid::now_v7(), &Permission::create_organization()).is_ok());
//! assert!(policy.authorize(blocked, &Permission::create_organization()).is_err());
//! ```
//!
//! ## Action Implications
//!
//! - `Manage` implies all actions
//! - `Update`, `Delete`, `Create` imply `Read`

pub mod actions;
pub mod permissions;
pub mod policy;
pub mod resources;

// Re-export main types for convenience
pub use actions::Action;
pub use permissions::{ParsePermissionError, Permission, PermissionSet};
pub use policy::{AuthorizationError, Authorizer, StaticPolicy};
pub use resources::ResourceType;
