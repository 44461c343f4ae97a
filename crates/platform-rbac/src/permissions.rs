//! # Permissions
//!
//! A permission combines a resource type with an action, optionally scoped
//! to one resource instance.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::actions::Action;
use crate::resources::ResourceType;

/// A permission is a combination of resource type and action.
///
/// Permissions can be:
/// - **Global**: Apply to all instances of a resource type (no resource_id)
/// - **Resource-specific**: Apply only to one instance (with resource_id)
///
/// # Example
///
/// ```
/// use platform_rbac::{Action, Permission, ResourceType};
///
/// let perm = Permission::new(ResourceType::Organization, Action::Create);
/// assert_eq!(perm.to_string(), "organization:create");
///
/// let perm = Permission::for_resource(ResourceType::Organization, Action::Update, "org-1");
/// assert_eq!(perm.to_string(), "organization:update:org-1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// The resource type this permission applies to.
    pub resource: ResourceType,
    /// The action allowed on the resource.
    pub action: Action,
    /// Specific resource instance, `None` means every instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl Permission {
    /// Create a new global permission.
    pub fn new(resource: ResourceType, action: Action) -> Self {
        Self {
            resource,
            action,
            resource_id: None,
        }
    }

    /// Create a permission for a specific resource instance.
    pub fn for_resource(
        resource: ResourceType,
        action: Action,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            resource,
            action,
            resource_id: Some(resource_id.into()),
        }
    }

    /// The permission checked before a new organization is created.
    pub fn create_organization() -> Self {
        Self::new(ResourceType::Organization, Action::Create)
    }

    /// Check if this granted permission covers a requested one.
    ///
    /// A grant covers a request if:
    /// - Resource types match
    /// - Actions match, or the granted action implies the requested one
    /// - The grant is global, or both name the same resource instance
    ///
    /// # Example
    ///
    /// ```
    /// use platform_rbac::{Action, Permission, ResourceType};
    ///
    /// let grant = Permission::new(ResourceType::Organization, Action::Manage);
    /// let request = Permission::for_resource(ResourceType::Organization, Action::Update, "org-1");
    /// assert!(grant.covers(&request));
    /// assert!(!request.covers(&grant));
    /// ```
    pub fn covers(&self, requested: &Permission) -> bool {
        if self.resource != requested.resource {
            return false;
        }

        if self.action != requested.action && !self.action.implies(requested.action) {
            return false;
        }

        match (&self.resource_id, &requested.resource_id) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a == b,
        }
    }

    /// Check if this is a global permission.
    pub fn is_global(&self) -> bool {
        self.resource_id.is_none()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_id {
            Some(id) => write!(f, "{}:{}:{}", self.resource, self.action, id),
            None => write!(f, "{}:{}", self.resource, self.action),
        }
    }
}

/// Error returned when a permission string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid permission string: {0}")]
pub struct ParsePermissionError(pub String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    /// Parse `resource:action` or `resource:action:id`. The id may itself
    /// contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePermissionError(s.to_string());

        let mut parts = s.splitn(3, ':');
        let resource = parts
            .next()
            .and_then(ResourceType::parse)
            .ok_or_else(invalid)?;
        let action = parts.next().and_then(Action::parse).ok_or_else(invalid)?;
        let resource_id = match parts.next() {
            Some("") => return Err(invalid()),
            Some(id) => Some(id.to_string()),
            None => None,
        };

        Ok(Self {
            resource,
            action,
            resource_id,
        })
    }
}

/// A set of permissions granted to a subject.
///
/// # Example
///
/// ```
/// use platform_rbac::{Action, Permission, PermissionSet, ResourceType};
///
/// let mut set = PermissionSet::new();
/// set.add(Permission::new(ResourceType::Organization, Action::Create));
///
/// assert!(set.has(&Permission::create_organization()));
/// assert!(set.has(&Permission::new(ResourceType::Organization, Action::Read)));
/// assert!(!set.has(&Permission::new(ResourceType::Organization, Action::Delete)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: HashSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Builder form of [`PermissionSet::add`].
    pub fn with(mut self, permission: Permission) -> Self {
        self.add(permission);
        self
    }

    /// Remove a permission. Returns `true` if it was present.
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(permission)
    }

    /// Check if any permission in the set covers the requested one.
    ///
    /// Exact, wildcard (global grant) and implied (e.g. `manage`) matches
    /// all count.
    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
            || self.permissions.iter().any(|grant| grant.covers(permission))
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Build a set from permission strings, skipping any that do not parse.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_rbac::PermissionSet;
    ///
    /// let set = PermissionSet::from_strings(&["organization:create", "bogus"]);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn from_strings(perms: &[&str]) -> Self {
        perms.iter().filter_map(|p| p.parse().ok()).collect()
    }

    /// Iterate over the permissions in the set.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}
