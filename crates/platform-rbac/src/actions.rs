//! # Actions
//!
//! Operations that can be performed on tenancy resources.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on resources.
///
/// - **Read**: View a resource
/// - **List**: Browse multiple resources
/// - **Create**: Create a new resource
/// - **Update**: Modify an existing resource
/// - **Delete**: Remove a resource
/// - **Manage**: Full administrative control, implies every other action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read/view resource.
    Read,

    /// List/query resources.
    List,

    /// Create new resource.
    Create,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,

    /// Manage resource, implies all other actions.
    Manage,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("create"), Some(Action::Create));
    /// assert_eq!(Action::parse("add"), Some(Action::Create));
    /// assert_eq!(Action::parse("edit"), Some(Action::Update));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" | "get" => Some(Action::Read),
            "list" | "index" | "browse" => Some(Action::List),
            "create" | "add" | "new" => Some(Action::Create),
            "update" | "edit" | "write" => Some(Action::Update),
            "delete" | "remove" | "destroy" => Some(Action::Delete),
            "manage" | "admin" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::List,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ]
    }

    /// Check if this action implies another action.
    ///
    /// - `Manage` implies every action
    /// - `Create`, `Update` and `Delete` imply `Read`
    ///
    /// # Example
    ///
    /// ```
    /// use platform_rbac::actions::Action;
    ///
    /// assert!(Action::Manage.implies(Action::Create));
    /// assert!(Action::Create.implies(Action::Read));
    /// assert!(!Action::Read.implies(Action::Create));
    /// ```
    pub fn implies(&self, other: Action) -> bool {
        match self {
            Action::Manage => true,
            Action::Create | Action::Update | Action::Delete => other == Action::Read,
            _ => false,
        }
    }

    /// Check if this action modifies data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Action::Create | Action::Update | Action::Delete | Action::Manage
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
