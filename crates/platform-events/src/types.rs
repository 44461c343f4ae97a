//! Event types
//!
//! The generic event envelope and the typed tenancy events carried in it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Source name used for events emitted by tenancy services.
pub const PLATFORM_SOURCE: &str = "platform";

/// Event envelope.
///
/// All events are wrapped in this envelope which provides metadata
/// for routing, tracing, and processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type (e.g., "organization.created")
    pub event_type: String,

    /// Emitting service
    pub source: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Organization context
    pub org_id: Option<Uuid>,

    /// User who triggered the event
    pub user_id: Option<Uuid>,

    /// Correlation ID for tracing
    pub correlation_id: Option<String>,

    /// Event version for schema evolution
    pub version: u32,

    /// Event payload
    pub payload: serde_json::Value,

    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Event {
    /// Create a new event.
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            source: source.into(),
            timestamp: Utc::now(),
            org_id: None,
            user_id: None,
            correlation_id: None,
            version: 1,
            payload,
            metadata: HashMap::new(),
        }
    }

    /// Set organization context.
    pub fn with_org(mut self, org_id: Uuid) -> Self {
        self.org_id = Some(org_id);
        self
    }

    /// Set user context.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set correlation ID.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get the topic for this event: `{source}.{event_type}`.
    pub fn topic(&self) -> String {
        format!("{}.{}", self.source, self.event_type)
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Organization lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrganizationEvent {
    /// An organization was persisted
    Created {
        organization_id: Uuid,
        owner_id: Uuid,
        name: String,
        is_personal: bool,
    },
    /// A principal's active organization changed
    Switched {
        principal_id: Uuid,
        organization_id: Uuid,
    },
}

impl OrganizationEvent {
    /// Event type string, without the source prefix.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrganizationEvent::Created { .. } => "organization.created",
            OrganizationEvent::Switched { .. } => "organization.switched",
        }
    }

    /// Convert to generic event, filling organization and user context.
    pub fn to_event(&self) -> Event {
        let payload = serde_json::to_value(self).unwrap_or_default();
        let event = Event::new(self.event_type(), PLATFORM_SOURCE, payload);

        match self {
            OrganizationEvent::Created {
                organization_id,
                owner_id,
                ..
            } => event.with_org(*organization_id).with_user(*owner_id),
            OrganizationEvent::Switched {
                principal_id,
                organization_id,
            } => event.with_org(*organization_id).with_user(*principal_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = Event::new("test.event", "svc", serde_json::json!({"key": "value"}))
            .with_org(Uuid::now_v7())
            .with_user(Uuid::now_v7())
            .with_correlation_id("req-1");

        assert_eq!(event.event_type, "test.event");
        assert_eq!(event.topic(), "svc.test.event");
        assert_eq!(event.version, 1);
        assert!(event.org_id.is_some());
        assert_eq!(event.correlation_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_created_event() {
        let org_id = Uuid::now_v7();
        let owner_id = Uuid::now_v7();
        let created = OrganizationEvent::Created {
            organization_id: org_id,
            owner_id,
            name: "Acme".to_string(),
            is_personal: false,
        };

        let event = created.to_event();
        assert_eq!(event.topic(), "platform.organization.created");
        assert_eq!(event.org_id, Some(org_id));
        assert_eq!(event.user_id, Some(owner_id));
        assert_eq!(event.payload["type"], "created");
        assert_eq!(event.payload["name"], "Acme");

        let parsed: OrganizationEvent = event.parse_payload().unwrap();
        assert_eq!(parsed, created);
    }

    #[test]
    fn test_switched_event() {
        let principal_id = Uuid::now_v7();
        let organization_id = Uuid::now_v7();
        let event = OrganizationEvent::Switched {
            principal_id,
            organization_id,
        }
        .to_event();

        assert_eq!(event.topic(), "platform.organization.switched");
        assert_eq!(event.org_id, Some(organization_id));
        assert_eq!(event.user_id, Some(principal_id));
        assert_eq!(event.payload["type"], "switched");
    }
}
