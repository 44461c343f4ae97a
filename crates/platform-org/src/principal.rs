//! Acting users and their active organization
//!
//! A [`Principal`] is an authenticated user. Its active organization is the
//! tenant context subsequent requests are scoped to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user performing an operation.
///
/// The active organization is a weak reference: the principal does not own
/// the organization it points at, and the pointer is only a lookup key.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use platform_org::Principal;
///
/// let mut principal = Principal::new(Uuid::now_v7(), "Ada");
/// assert!(principal.active_organization_id.is_none());
///
/// let org_id = Uuid::now_v7();
/// principal.switch_organization(org_id);
/// assert!(principal.is_active_organization(org_id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID
    pub id: Uuid,

    /// Name shown in logs and UIs
    pub display_name: String,

    /// Currently selected organization
    pub active_organization_id: Option<Uuid>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Creates a principal with no active organization.
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            active_organization_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Builder form that starts the principal in `org_id`.
    pub fn with_active_organization(mut self, org_id: Uuid) -> Self {
        self.active_organization_id = Some(org_id);
        self
    }

    /// Switch to a different organization.
    ///
    /// Returns the previously active organization, if any.
    pub fn switch_organization(&mut self, org_id: Uuid) -> Option<Uuid> {
        let previous = self.active_organization_id.replace(org_id);
        self.updated_at = Utc::now();
        previous
    }

    /// Check whether `org_id` is the active organization.
    pub fn is_active_organization(&self, org_id: Uuid) -> bool {
        self.active_organization_id == Some(org_id)
    }

    /// Clear the active organization, e.g. after it was deleted.
    pub fn clear_active_organization(&mut self) {
        self.active_organization_id = None;
        self.updated_at = Utc::now();
    }
}
