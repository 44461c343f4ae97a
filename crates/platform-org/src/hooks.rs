//! Pre-create hooks
//!
//! Hooks are the extension point that runs after a creation request is
//! authorized and validated but before anything is persisted. They run in
//! registration order and any hook may reject the request, which aborts the
//! creation. Quota enforcement is the typical use.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::store::OrganizationStore;

/// Payload handed to every pre-create hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddingOrganization {
    /// Principal creating the organization
    pub principal_id: Uuid,
    /// Validated organization name
    pub name: String,
}

/// A hook's refusal to let a creation proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct HookRejection {
    /// Why the hook refused
    pub reason: String,
}

impl HookRejection {
    /// Create a rejection with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Creation aborted by a pre-create hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Organization creation rejected by {hook}: {reason}")]
pub struct EventVetoError {
    /// Name of the rejecting hook
    pub hook: String,
    /// The hook's reason
    pub reason: String,
}

/// Check run before an organization is persisted.
#[async_trait]
pub trait PreCreateHook: Send + Sync {
    /// Name reported when this hook rejects.
    fn name(&self) -> &str;

    /// Return `Err` to abort the creation.
    async fn before_create(&self, event: &AddingOrganization) -> Result<(), HookRejection>;
}

/// Rejects creation once a principal owns `max_owned` non-personal
/// organizations.
pub struct OwnedOrganizationQuota {
    store: Arc<dyn OrganizationStore>,
    max_owned: usize,
}

impl OwnedOrganizationQuota {
    /// Name reported when the quota rejects.
    pub const NAME: &'static str = "owned_organization_quota";

    /// Create a quota hook reading ownership counts from `store`.
    pub fn new(store: Arc<dyn OrganizationStore>, max_owned: usize) -> Self {
        Self { store, max_owned }
    }

    /// Configured limit.
    pub fn max_owned(&self) -> usize {
        self.max_owned
    }

    /// Veto for a principal who already owns `limit` organizations.
    ///
    /// The store re-checks the limit when it writes, so a request that slips
    /// past [`before_create`](PreCreateHook::before_create) is refused with
    /// this same veto.
    pub fn limit_reached(limit: usize) -> EventVetoError {
        EventVetoError {
            hook: Self::NAME.to_string(),
            reason: format!("organization limit of {limit} reached"),
        }
    }
}

impl fmt::Debug for OwnedOrganizationQuota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedOrganizationQuota")
            .field("max_owned", &self.max_owned)
            .finish()
    }
}

#[async_trait]
impl PreCreateHook for OwnedOrganizationQuota {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn before_create(&self, event: &AddingOrganization) -> Result<(), HookRejection> {
        let owned = self
            .store
            .count_owned(event.principal_id, false)
            .await
            .map_err(|e| HookRejection::new(format!("could not count owned organizations: {e}")))?;

        if owned >= self.max_owned {
            return Err(HookRejection::new(
                Self::limit_reached(self.max_owned).reason,
            ));
        }
        Ok(())
    }
}

/// Adapter turning a synchronous closure into a hook.
///
/// ```
/// use platform_org::hooks::{AddingOrganization, FnHook, HookRejection};
///
/// let hook = FnHook::new("no_test_names", |event: &AddingOrganization| {
///     if event.name.starts_with("test") {
///         Err(HookRejection::new("test organizations are not allowed"))
///     } else {
///         Ok(())
///     }
/// });
/// ```
pub struct FnHook<F> {
    name: String,
    check: F,
}

impl<F> FnHook<F>
where
    F: Fn(&AddingOrganization) -> Result<(), HookRejection> + Send + Sync,
{
    /// Wrap `check` under `name`.
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

#[async_trait]
impl<F> PreCreateHook for FnHook<F>
where
    F: Fn(&AddingOrganization) -> Result<(), HookRejection> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn before_create(&self, event: &AddingOrganization) -> Result<(), HookRejection> {
        (self.check)(event)
    }
}

/// Run `hooks` in order, stopping at the first rejection.
pub async fn run_hooks(
    hooks: &[Arc<dyn PreCreateHook>],
    event: &AddingOrganization,
) -> Result<(), EventVetoError> {
    for hook in hooks {
        if let Err(rejection) = hook.before_create(event).await {
            return Err(EventVetoError {
                hook: hook.name().to_string(),
                reason: rejection.reason,
            });
        }
    }
    Ok(())
}
