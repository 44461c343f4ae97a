//! # Platform Organization Management
//!
//! Organization creation for the multi-tenant platform.
//!
//! ## Overview
//!
//! The platform-org crate handles:
//! - **Organizations**: Tenant entities, each with exactly one owner
//! - **Principals**: Acting users and their active organization
//! - **Validation**: Declarative, side-effect free input rules
//! - **Hooks**: Ordered pre-create checks that may veto a creation
//! - **Store**: Persistence seam with an in-memory implementation
//! - **Creator**: The service tying the above together
//!
//! ## Architecture
//!
//! ```text
//! OrganizationCreator
//!   ├─ Authorizer (platform-rbac)      organization:create
//!   ├─ RuleSet / validate              name: required|string|max:255
//!   ├─ [PreCreateHook]                 e.g. OwnedOrganizationQuota
//!   ├─ OrganizationStore               create_and_activate
//!   └─ EventBus (platform-events)      organization.created, organization.switched
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use platform_org::{CreatorConfig, InMemoryOrganizationStore, OrganizationCreator, Principal};
//! use platform_rbac::StaticPolicy;
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let policy = Arc::new(StaticPolicy::organization_creators());
//!     let store = Arc::new(InMemoryOrganizationStore::new());
//!     let creator =
//!         OrganizationCreator::new(policy, store).with_config(CreatorConfig::from_env())?;
//!
//!     let mut principal = Principal::new(Uuid::now_v7(), "Ada");
//!     let input = json!({ "name": "Acme" });
//!     let org = creator.create(&mut principal, input.as_object().unwrap()).await?;
//!
//!     assert!(principal.is_active_organization(org.id));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod creator;
pub mod error;
pub mod hooks;
pub mod organization;
pub mod principal;
pub mod store;
pub mod validation;

// Re-export main types for convenience
pub use config::{ConfigError, CreatorConfig};
pub use creator::OrganizationCreator;
pub use error::{CreateOrganizationError, CreateOrganizationResult};
pub use hooks::{
    AddingOrganization, EventVetoError, FnHook, HookRejection, OwnedOrganizationQuota,
    PreCreateHook,
};
pub use organization::{NewOrganization, Organization, OrganizationSummary};
pub use principal::Principal;
pub use store::{InMemoryOrganizationStore, OrganizationStore, StoreError, StoreResult};
pub use validation::{FieldError, Rule, RuleSet, ValidationError};
