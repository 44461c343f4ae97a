//! Organization domain models
//!
//! Organizations are the tenant entities of the platform. Every organization
//! has exactly one owner, fixed when it is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization represents a tenant in the multi-tenant system.
///
/// Personal organizations are provisioned automatically for each user
/// elsewhere; organizations created explicitly by a user are never personal.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use platform_org::Organization;
///
/// let owner_id = Uuid::now_v7();
/// let org = Organization::new("Acme Corp", owner_id);
/// assert_eq!(org.name, "Acme Corp");
/// assert!(!org.is_personal);
/// assert!(org.is_owned_by(owner_id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Whether this is the owner's automatically provisioned organization
    pub is_personal: bool,

    /// Owner user ID (the user who created the org)
    pub owner_id: Uuid,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new, non-personal organization with a fresh UUID v7 ID.
    pub fn new(name: impl Into<String>, owner_id: Uuid) -> Self {
        Self::from_request(NewOrganization::new(owner_id, name))
    }

    /// Materializes a persistence request into an organization record.
    pub fn from_request(request: NewOrganization) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: request.name,
            is_personal: request.is_personal,
            owner_id: request.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if `user_id` owns this organization.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Build a list entry, flagging whether it is the viewer's active one.
    pub fn summary(&self, active_organization_id: Option<Uuid>) -> OrganizationSummary {
        OrganizationSummary {
            id: self.id,
            name: self.name.clone(),
            is_personal: self.is_personal,
            is_active: active_organization_id == Some(self.id),
        }
    }
}

/// Request to persist a new organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganization {
    /// Owning user
    pub owner_id: Uuid,

    /// Organization name, already validated
    pub name: String,

    /// Personal-organization flag
    pub is_personal: bool,
}

impl NewOrganization {
    /// Request for a non-personal organization.
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            name: name.into(),
            is_personal: false,
        }
    }
}

/// Summary of an organization for list displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    /// Organization ID
    pub id: Uuid,

    /// Organization name
    pub name: String,

    /// Personal-organization flag
    pub is_personal: bool,

    /// Whether this is the viewer's active organization
    pub is_active: bool,
}
