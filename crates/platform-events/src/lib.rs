//! # Platform Events
//!
//! Event bus used by platform services to announce tenancy changes.
//!
//! ## Overview
//!
//! The platform-events crate handles:
//! - **Event Envelope**: Routing and tracing metadata around a JSON payload
//! - **Organization Events**: Typed payloads for organization lifecycle changes
//! - **Event Bus**: Publish/subscribe messaging with topic wildcards
//! - **Event Handlers**: Async event processing
//!
//! Events are notifications about committed changes. Anything that must be
//! able to stop an operation belongs in that operation's pre-create hooks,
//! not on the bus.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use platform_events::{EventBus, MemoryEventBus, OrganizationEvent};
//! use uuid::Uuid;
//!
//! async fn example() {
//!     let bus = MemoryEventBus::new();
//!     let mut sub = bus.subscribe("platform.organization.*").await.unwrap();
//!
//!     let created = OrganizationEvent::Created {
//!         organization_id: Uuid::now_v7(),
//!         owner_id: Uuid::now_v7(),
//!         name: "Acme".to_string(),
//!         is_personal: false,
//!     };
//!     bus.publish(created.to_event()).await.unwrap();
//!
//!     let event = sub.recv().await.unwrap();
//!     assert_eq!(event.event_type, "organization.created");
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are structured as `{source}.{event_type}`, e.g.
//! `platform.organization.created`.
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments

pub mod bus;
pub mod types;

// Re-export main types
pub use bus::{
    EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, MemoryEventBus,
    Subscription,
};
pub use types::{Event, OrganizationEvent, PLATFORM_SOURCE};
