//! Organization persistence
//!
//! [`OrganizationStore`] is the seam between organization services and
//! whatever database backs them. [`InMemoryOrganizationStore`] is the
//! reference implementation used by single-process deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::organization::{NewOrganization, Organization, OrganizationSummary};

/// Store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Referenced organization does not exist
    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),

    /// Owner already owns `limit` non-personal organizations
    #[error("Owner {owner_id} already owns {limit} organizations")]
    OwnedLimitReached {
        /// Owner who hit the limit
        owner_id: Uuid,
        /// Configured limit
        limit: usize,
    },

    /// Backend failure (connection, constraint, serialization)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for organizations and each principal's active organization.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Persist a new organization.
    async fn create(&self, new: NewOrganization) -> StoreResult<Organization>;

    /// Point a principal's active organization at `organization_id`.
    async fn set_active_organization(
        &self,
        principal_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<()>;

    /// Persist a new organization and make it the owner's active one.
    ///
    /// The default runs [`create`](Self::create) then
    /// [`set_active_organization`](Self::set_active_organization) as two
    /// steps. Stores that can, override this to commit both in one
    /// transaction.
    async fn create_and_activate(&self, new: NewOrganization) -> StoreResult<Organization> {
        let owner_id = new.owner_id;
        let organization = self.create(new).await?;
        self.set_active_organization(owner_id, organization.id)
            .await?;
        Ok(organization)
    }

    /// Like [`create_and_activate`](Self::create_and_activate), but fail
    /// with [`StoreError::OwnedLimitReached`] when `max_owned` is set and the
    /// owner already owns that many non-personal organizations. Personal
    /// organizations are never limited.
    ///
    /// The default counts first and then writes, which is not atomic.
    /// Stores that can, run the count and both writes in one transaction.
    async fn create_and_activate_within(
        &self,
        new: NewOrganization,
        max_owned: Option<usize>,
    ) -> StoreResult<Organization> {
        if let Some(limit) = max_owned.filter(|_| !new.is_personal) {
            if self.count_owned(new.owner_id, false).await? >= limit {
                return Err(StoreError::OwnedLimitReached {
                    owner_id: new.owner_id,
                    limit,
                });
            }
        }
        self.create_and_activate(new).await
    }

    /// Look up an organization by ID.
    async fn find(&self, id: Uuid) -> StoreResult<Option<Organization>>;

    /// A principal's active organization, if any.
    async fn active_organization(&self, principal_id: Uuid) -> StoreResult<Option<Uuid>>;

    /// Organizations owned by `owner_id`, oldest first.
    async fn owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<Organization>>;

    /// Number of organizations owned by `owner_id`.
    async fn count_owned(&self, owner_id: Uuid, include_personal: bool) -> StoreResult<usize> {
        let owned = self.owned_by(owner_id).await?;
        Ok(owned
            .iter()
            .filter(|org| include_personal || !org.is_personal)
            .count())
    }

    /// List entries for the organizations `principal_id` owns, with the
    /// active one flagged.
    async fn summaries_for(&self, principal_id: Uuid) -> StoreResult<Vec<OrganizationSummary>> {
        let active = self.active_organization(principal_id).await?;
        let owned = self.owned_by(principal_id).await?;
        Ok(owned.iter().map(|org| org.summary(active)).collect())
    }
}

#[derive(Debug, Default)]
struct State {
    organizations: HashMap<Uuid, Organization>,
    /// Insertion order of `organizations`
    order: Vec<Uuid>,
    active: HashMap<Uuid, Uuid>,
}

impl State {
    fn insert(&mut self, new: NewOrganization) -> Organization {
        let organization = Organization::from_request(new);
        self.organizations
            .insert(organization.id, organization.clone());
        self.order.push(organization.id);
        organization
    }

    fn count_team_organizations(&self, owner_id: Uuid) -> usize {
        self.organizations
            .values()
            .filter(|org| org.is_owned_by(owner_id) && !org.is_personal)
            .count()
    }

    fn activate(&mut self, principal_id: Uuid, organization_id: Uuid) -> StoreResult<()> {
        if !self.organizations.contains_key(&organization_id) {
            return Err(StoreError::OrganizationNotFound(organization_id));
        }
        self.active.insert(principal_id, organization_id);
        Ok(())
    }
}

/// In-memory organization store.
///
/// All state sits behind one lock, so [`create_and_activate_within`] is
/// atomic: no reader ever observes the new organization without its
/// activation, and concurrent creations cannot both slip under the limit.
///
/// [`create_and_activate_within`]: OrganizationStore::create_and_activate_within
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrganizationStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryOrganizationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of organizations stored.
    pub async fn len(&self) -> usize {
        self.state.read().await.organizations.len()
    }

    /// Check if no organizations are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrganizationStore for InMemoryOrganizationStore {
    async fn create(&self, new: NewOrganization) -> StoreResult<Organization> {
        Ok(self.state.write().await.insert(new))
    }

    async fn set_active_organization(
        &self,
        principal_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<()> {
        self.state
            .write()
            .await
            .activate(principal_id, organization_id)
    }

    async fn create_and_activate(&self, new: NewOrganization) -> StoreResult<Organization> {
        self.create_and_activate_within(new, None).await
    }

    async fn create_and_activate_within(
        &self,
        new: NewOrganization,
        max_owned: Option<usize>,
    ) -> StoreResult<Organization> {
        let mut state = self.state.write().await;
        let owner_id = new.owner_id;
        if let Some(limit) = max_owned.filter(|_| !new.is_personal) {
            if state.count_team_organizations(owner_id) >= limit {
                return Err(StoreError::OwnedLimitReached { owner_id, limit });
            }
        }
        let organization = state.insert(new);
        state.activate(owner_id, organization.id)?;
        Ok(organization)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        Ok(self.state.read().await.organizations.get(&id).cloned())
    }

    async fn active_organization(&self, principal_id: Uuid) -> StoreResult<Option<Uuid>> {
        Ok(self.state.read().await.active.get(&principal_id).copied())
    }

    async fn owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<Organization>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.organizations.get(id))
            .filter(|org| org.is_owned_by(owner_id))
            .cloned()
            .collect())
    }
}
