//! # Policy
//!
//! Explicit authorization interface injected into services. Callers hand a
//! service an [`Authorizer`] instead of the service resolving a global gate
//! from the caller's identity.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::actions::Action;
use crate::permissions::{Permission, PermissionSet};
use crate::resources::ResourceType;

/// Authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// The subject lacks the requested permission.
    #[error("Forbidden: {subject} may not {permission}")]
    Forbidden {
        /// Subject that was checked.
        subject: Uuid,
        /// Permission that was requested.
        permission: Permission,
    },
}

impl AuthorizationError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        403
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        "FORBIDDEN"
    }
}

/// Decides whether a subject may perform an action.
///
/// # Example
///
/// ```
/// use platform_rbac::{Authorizer, Permission, StaticPolicy};
/// use uuid::Uuid;
///
/// let policy = StaticPolicy::organization_creators();
/// assert!(policy.authorize(Uuid::now_v7(), &Permission::create_organization()).is_ok());
/// ```
pub trait Authorizer: Send + Sync {
    /// Return `Ok(())` if `subject` holds `permission`.
    fn authorize(&self, subject: Uuid, permission: &Permission) -> Result<(), AuthorizationError>;

    /// Convenience form taking the action and resource type separately.
    fn authorize_action(
        &self,
        subject: Uuid,
        action: Action,
        resource: ResourceType,
    ) -> Result<(), AuthorizationError> {
        self.authorize(subject, &Permission::new(resource, action))
    }
}

/// Policy backed by fixed permission sets.
///
/// Every subject receives `defaults` unless it has an override, in which
/// case the override replaces the defaults entirely.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    defaults: PermissionSet,
    overrides: HashMap<Uuid, PermissionSet>,
}

impl StaticPolicy {
    /// Create a policy granting `defaults` to every subject.
    pub fn new(defaults: PermissionSet) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    /// Policy where any authenticated subject may create organizations.
    pub fn organization_creators() -> Self {
        Self::new(PermissionSet::new().with(Permission::create_organization()))
    }

    /// Replace a subject's permissions with `permissions`.
    pub fn grant(mut self, subject: Uuid, permissions: PermissionSet) -> Self {
        self.overrides.insert(subject, permissions);
        self
    }

    /// Strip every permission from a subject.
    pub fn deny_all(self, subject: Uuid) -> Self {
        self.grant(subject, PermissionSet::new())
    }

    /// Effective permissions for a subject.
    pub fn permissions_for(&self, subject: Uuid) -> &PermissionSet {
        self.overrides.get(&subject).unwrap_or(&self.defaults)
    }
}

impl Authorizer for StaticPolicy {
    fn authorize(&self, subject: Uuid, permission: &Permission) -> Result<(), AuthorizationError> {
        if self.permissions_for(subject).has(permission) {
            Ok(())
        } else {
            Err(AuthorizationError::Forbidden {
                subject,
                permission: permission.clone(),
            })
        }
    }
}
