//! # Resource Types
//!
//! Resources that tenancy permissions can be granted on.

use serde::{Deserialize, Serialize};

/// Resource types that can have permissions assigned.
///
/// Organizations are the tenant root; the other resources either belong to
/// an organization (memberships, invitations) or describe the acting user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// User accounts.
    User,
    /// Organizations (tenants).
    Organization,
    /// A user's membership in an organization.
    Membership,
    /// Pending invitations to join an organization.
    Invitation,
}

impl ResourceType {
    /// Get the string representation of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::User => "user",
            ResourceType::Organization => "organization",
            ResourceType::Membership => "membership",
            ResourceType::Invitation => "invitation",
        }
    }

    /// Parse resource type from string representation.
    ///
    /// Accepts plural forms and a few common aliases, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_rbac::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::parse("organization"), Some(ResourceType::Organization));
    /// assert_eq!(ResourceType::parse("Teams"), Some(ResourceType::Organization));
    /// assert_eq!(ResourceType::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" | "users" => Some(ResourceType::User),
            "organization" | "organizations" | "org" | "orgs" | "team" | "teams" => {
                Some(ResourceType::Organization)
            }
            "membership" | "memberships" | "member" | "members" => Some(ResourceType::Membership),
            "invitation" | "invitations" | "invite" | "invites" => Some(ResourceType::Invitation),
            _ => None,
        }
    }

    /// Get all resource types.
    pub fn all() -> Vec<Self> {
        vec![
            ResourceType::User,
            ResourceType::Organization,
            ResourceType::Membership,
            ResourceType::Invitation,
        ]
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
