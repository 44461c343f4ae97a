//! Organization creation service
//!
//! [`OrganizationCreator`] creates a new organization on behalf of a
//! principal and makes it the principal's active organization.
//!
//! # Flow
//!
//! ```text
//! authorize ─→ validate ─→ pre-create hooks ─→ create + activate ─→ notify
//!    │            │              │                    │
//!    403          422            409                  500
//! ```
//!
//! Each step runs only if every earlier step succeeded, so a denied or
//! invalid request never reaches the hooks and a vetoed request never
//! touches the store. Notification happens after commit and cannot fail the
//! operation.

use std::fmt;
use std::sync::Arc;

use platform_events::{EventBus, OrganizationEvent};
use platform_rbac::{Authorizer, Permission};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigError, CreatorConfig};
use crate::error::CreateOrganizationResult;
use crate::hooks::{run_hooks, AddingOrganization, OwnedOrganizationQuota, PreCreateHook};
use crate::organization::{NewOrganization, Organization};
use crate::principal::Principal;
use crate::store::{OrganizationStore, StoreError};
use crate::validation::{organization_rules, validate, RuleSet, NAME_FIELD};

/// Creates organizations for principals.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use platform_org::{InMemoryOrganizationStore, OrganizationCreator, Principal};
/// use platform_rbac::StaticPolicy;
/// use serde_json::json;
/// use uuid::Uuid;
///
/// async fn example() {
///     let creator = OrganizationCreator::new(
///         Arc::new(StaticPolicy::organization_creators()),
///         Arc::new(InMemoryOrganizationStore::new()),
///     );
///
///     let mut principal = Principal::new(Uuid::now_v7(), "Ada");
///     let input = json!({ "name": "Engineering" });
///
///     let org = creator
///         .create(&mut principal, input.as_object().unwrap())
///         .await
///         .unwrap();
///
///     assert_eq!(org.name, "Engineering");
///     assert_eq!(principal.active_organization_id, Some(org.id));
/// }
/// ```
pub struct OrganizationCreator {
    authorizer: Arc<dyn Authorizer>,
    store: Arc<dyn OrganizationStore>,
    hooks: Vec<Arc<dyn PreCreateHook>>,
    quota: Option<Arc<OwnedOrganizationQuota>>,
    event_bus: Option<Arc<dyn EventBus>>,
    config: CreatorConfig,
    rules: RuleSet,
}

impl fmt::Debug for OrganizationCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks: Vec<&str> = self.hooks.iter().map(|hook| hook.name()).collect();
        f.debug_struct("OrganizationCreator")
            .field("hooks", &hooks)
            .field("quota", &self.quota.as_ref().map(|quota| quota.max_owned()))
            .field("has_event_bus", &self.event_bus.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl OrganizationCreator {
    /// Create a creator with default configuration, no hooks and no bus.
    pub fn new(authorizer: Arc<dyn Authorizer>, store: Arc<dyn OrganizationStore>) -> Self {
        let config = CreatorConfig::default();
        Self {
            authorizer,
            store,
            hooks: Vec::new(),
            quota: None,
            event_bus: None,
            rules: organization_rules(config.name_max_length),
            config,
        }
    }

    /// Apply `config`, replacing any earlier one.
    ///
    /// When `max_owned_organizations` is set, an [`OwnedOrganizationQuota`]
    /// backed by this creator's store runs ahead of the registered hooks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails [`CreatorConfig::validate`].
    pub fn with_config(mut self, config: CreatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.rules = organization_rules(config.name_max_length);
        self.quota = config
            .max_owned_organizations
            .map(|max_owned| Arc::new(OwnedOrganizationQuota::new(self.store.clone(), max_owned)));
        self.config = config;
        Ok(self)
    }

    /// Append a pre-create hook. Hooks run in the order they were added,
    /// after the ownership quota.
    pub fn with_hook(mut self, hook: Arc<dyn PreCreateHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Publish lifecycle events to `bus` after each successful creation.
    pub fn with_event_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &CreatorConfig {
        &self.config
    }

    /// Validate and create a new organization owned by `principal`, then
    /// switch `principal` to it.
    ///
    /// `input` must carry a `name` string. Identical calls create distinct
    /// organizations.
    ///
    /// # Errors
    ///
    /// - `Authorization` if the principal may not create organizations
    /// - `Validation` if `name` is missing, blank, not a string or too long
    /// - `Vetoed` if a pre-create hook rejects the request
    /// - `Store` if persistence fails
    #[instrument(skip_all, fields(principal_id = %principal.id))]
    pub async fn create(
        &self,
        principal: &mut Principal,
        input: &Map<String, Value>,
    ) -> CreateOrganizationResult<Organization> {
        if let Err(e) = self
            .authorizer
            .authorize(principal.id, &Permission::create_organization())
        {
            warn!(error = %e, "Organization creation denied");
            return Err(e.into());
        }

        validate(input, &self.rules, &self.config.validation_bag).inspect_err(|e| {
            debug!(error = %e, "Organization input rejected");
        })?;
        let name = validated_name(input);

        let adding = AddingOrganization {
            principal_id: principal.id,
            name: name.clone(),
        };
        let hooks: Vec<Arc<dyn PreCreateHook>> = self
            .quota
            .iter()
            .map(|quota| quota.clone() as Arc<dyn PreCreateHook>)
            .chain(self.hooks.iter().cloned())
            .collect();
        debug!(hooks = hooks.len(), "Running pre-create hooks");
        run_hooks(&hooks, &adding).await.inspect_err(|e| {
            warn!(hook = %e.hook, reason = %e.reason, "Organization creation vetoed");
        })?;

        // The store re-checks the quota under its own lock
        let organization = match self
            .store
            .create_and_activate_within(
                NewOrganization::new(principal.id, name),
                self.config.max_owned_organizations,
            )
            .await
        {
            Ok(organization) => organization,
            Err(StoreError::OwnedLimitReached { limit, .. }) => {
                let veto = OwnedOrganizationQuota::limit_reached(limit);
                warn!(hook = %veto.hook, reason = %veto.reason, "Organization creation vetoed");
                return Err(veto.into());
            }
            Err(e) => return Err(e.into()),
        };
        let previous = principal.switch_organization(organization.id);

        info!(
            organization_id = %organization.id,
            previous_organization_id = ?previous,
            "Organization created"
        );

        self.announce(&organization).await;

        Ok(organization)
    }

    /// Publish creation and switch events. Failures are logged only; the
    /// organization is already committed.
    async fn announce(&self, organization: &Organization) {
        let Some(bus) = self.event_bus.as_ref() else {
            return;
        };
        if !self.config.publish_events {
            return;
        }

        let events = [
            OrganizationEvent::Created {
                organization_id: organization.id,
                owner_id: organization.owner_id,
                name: organization.name.clone(),
                is_personal: organization.is_personal,
            },
            OrganizationEvent::Switched {
                principal_id: organization.owner_id,
                organization_id: organization.id,
            },
        ];

        for event in events {
            if let Err(e) = bus.publish(event.to_event()).await {
                warn!(
                    error = %e,
                    event_type = event.event_type(),
                    organization_id = %organization.id,
                    "Failed to publish organization event"
                );
            }
        }
    }
}

/// The `name` value of input that passed [`organization_rules`].
fn validated_name(input: &Map<String, Value>) -> String {
    input
        .get(NAME_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CreateOrganizationError;
    use crate::hooks::{FnHook, HookRejection};
    use crate::store::InMemoryOrganizationStore;
    use platform_rbac::StaticPolicy;
    use serde_json::json;
    use uuid::Uuid;

    fn input(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn creator(store: Arc<InMemoryOrganizationStore>) -> OrganizationCreator {
        OrganizationCreator::new(Arc::new(StaticPolicy::organization_creators()), store)
    }

    #[tokio::test]
    async fn test_create_switches_context() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let creator = creator(store.clone());
        let mut principal = Principal::new(Uuid::now_v7(), "Ada");

        let org = creator
            .create(&mut principal, &input(json!({ "name": "Acme" })))
            .await
            .unwrap();

        assert_eq!(org.name, "Acme");
        assert_eq!(org.owner_id, principal.id);
        assert!(!org.is_personal);
        assert!(principal.is_active_organization(org.id));
        assert_eq!(
            store.active_organization(principal.id).await.unwrap(),
            Some(org.id)
        );
    }

    #[tokio::test]
    async fn test_authorization_checked_before_validation() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let mut principal = Principal::new(Uuid::now_v7(), "Mallory");
        let creator = OrganizationCreator::new(
            Arc::new(StaticPolicy::organization_creators().deny_all(principal.id)),
            store.clone(),
        );

        // Invalid input still yields the authorization error
        let err = creator
            .create(&mut principal, &input(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateOrganizationError::Authorization(_)));
        assert!(store.is_empty().await);
        assert!(principal.active_organization_id.is_none());
    }

    #[tokio::test]
    async fn test_name_is_stored_verbatim() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let creator = creator(store);
        let mut principal = Principal::new(Uuid::now_v7(), "Ada");

        let org = creator
            .create(&mut principal, &input(json!({ "name": " Acme Labs " })))
            .await
            .unwrap();
        assert_eq!(org.name, " Acme Labs ");
    }

    #[tokio::test]
    async fn test_hook_sees_principal_and_name() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let mut principal = Principal::new(Uuid::now_v7(), "Ada");
        let expected = principal.id;

        let creator = creator(store.clone()).with_hook(Arc::new(FnHook::new(
            "inspect",
            move |event: &AddingOrganization| {
                if event.principal_id == expected && event.name == "Acme" {
                    Ok(())
                } else {
                    Err(HookRejection::new("unexpected payload"))
                }
            },
        )));

        assert!(creator
            .create(&mut principal, &input(json!({ "name": "Acme" })))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_config_applies_name_length_and_bag() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let creator = creator(store)
            .with_config(CreatorConfig {
                name_max_length: 4,
                validation_bag: "newTeam".to_string(),
                ..Default::default()
            })
            .unwrap();
        let mut principal = Principal::new(Uuid::now_v7(), "Ada");

        let err = creator
            .create(&mut principal, &input(json!({ "name": "Acme Corp" })))
            .await
            .unwrap_err();
        match err {
            CreateOrganizationError::Validation(e) => {
                assert_eq!(e.bag, "newTeam");
                assert_eq!(e.rules_for("name"), vec!["max"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_lists_hooks() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let creator = creator(store)
            .with_hook(Arc::new(FnHook::new("audit", |_: &AddingOrganization| Ok(()))))
            .with_config(CreatorConfig {
                max_owned_organizations: Some(3),
                ..Default::default()
            })
            .unwrap();

        let debug = format!("{creator:?}");
        assert!(debug.contains("hooks: [\"audit\"]"));
        assert!(debug.contains("quota: Some(3)"));
        assert!(debug.contains("has_event_bus: false"));
    }

    #[tokio::test]
    async fn test_with_config_replaces_quota() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let creator = creator(store.clone())
            .with_config(CreatorConfig {
                max_owned_organizations: Some(1),
                ..Default::default()
            })
            .unwrap()
            .with_config(CreatorConfig {
                max_owned_organizations: Some(2),
                ..Default::default()
            })
            .unwrap();
        let mut principal = Principal::new(Uuid::now_v7(), "Ada");

        for name in ["Acme", "Beta"] {
            creator
                .create(&mut principal, &input(json!({ "name": name })))
                .await
                .unwrap();
        }
        let err = creator
            .create(&mut principal, &input(json!({ "name": "Gamma" })))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateOrganizationError::Vetoed(ref veto)
            if veto.reason == "organization limit of 2 reached"));
        assert_eq!(store.len().await, 2);

        // Dropping the limit removes the quota entirely
        let creator = creator.with_config(CreatorConfig::default()).unwrap();
        assert!(format!("{creator:?}").contains("quota: None"));
        assert!(creator
            .create(&mut principal, &input(json!({ "name": "Gamma" })))
            .await
            .is_ok());
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let err = creator(store)
            .with_config(CreatorConfig {
                name_max_length: 0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. }
            if key == "ORG_NAME_MAX_LENGTH"));
    }
}
