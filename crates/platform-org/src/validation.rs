//! Declarative input validation
//!
//! Validation is a pure function over a JSON object and a [`RuleSet`]. It
//! reads no ambient configuration and never mutates anything.
//!
//! ```
//! use platform_org::validation::{organization_rules, validate};
//! use serde_json::json;
//!
//! let rules = organization_rules(255);
//! let input = json!({ "name": "" });
//!
//! let err = validate(input.as_object().unwrap(), &rules, "createOrganization").unwrap_err();
//! assert_eq!(err.bag, "createOrganization");
//! assert_eq!(err.rules_for("name"), vec!["required"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name validated on organization creation.
pub const NAME_FIELD: &str = "name";

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and non-blank.
    Required,
    /// Field must be a JSON string.
    String,
    /// String field must have at most this many characters.
    MaxLength(usize),
}

impl Rule {
    /// Short rule code reported in errors.
    pub fn code(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::MaxLength(_) => "max",
        }
    }

    /// Implicit rules run even when the field is missing.
    fn is_implicit(&self) -> bool {
        matches!(self, Rule::Required)
    }

    fn check(&self, field: &str, value: Option<&Value>) -> Option<FieldError> {
        let failed = match (self, value) {
            (Rule::Required, value) => !is_present(value),
            (Rule::String, Some(value)) => !value.is_string(),
            (Rule::MaxLength(max), Some(Value::String(s))) => s.chars().count() > *max,
            _ => false,
        };

        failed.then(|| FieldError {
            rule: self.code(),
            message: self.message(field),
        })
    }

    fn message(&self, field: &str) -> String {
        match self {
            Rule::Required => format!("The {field} field is required."),
            Rule::String => format!("The {field} field must be a string."),
            Rule::MaxLength(max) => {
                format!("The {field} field must not be greater than {max} characters.")
            }
        }
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
        Some(_) => true,
    }
}

/// Ordered mapping of field names to rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for a field, merging with any rules already declared.
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        let name = name.into();
        match self.fields.iter().position(|(field, _)| *field == name) {
            Some(index) => self.fields[index].1.extend(rules),
            None => self.fields.push((name, rules.into_iter().collect())),
        }
        self
    }

    /// Rules declared for `name`.
    pub fn rules_for(&self, name: &str) -> &[Rule] {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields
            .iter()
            .map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }
}

/// Rules for the organization creation form: `name: required|string|max`.
pub fn organization_rules(name_max_length: usize) -> RuleSet {
    RuleSet::new().field(
        NAME_FIELD,
        [Rule::Required, Rule::String, Rule::MaxLength(name_max_length)],
    )
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Rule code, e.g. `"required"`
    pub rule: &'static str,
    /// Human-readable message
    pub message: String,
}

/// Field-keyed validation failures, grouped under a named bag so several
/// forms rendered together keep their errors apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Error bag name
    pub bag: String,
    /// Failures per field, in field-name order
    pub errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationError {
    /// Check whether `field` failed any rule.
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// First message for `field`.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|errors| errors.first())
            .map(|error| error.message.as_str())
    }

    /// Codes of the rules `field` failed, in evaluation order.
    pub fn rules_for(&self, field: &str) -> Vec<&'static str> {
        self.errors
            .get(field)
            .map(|errors| errors.iter().map(|error| error.rule).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed ({})", self.bag)?;
        for (field, errors) in &self.errors {
            for error in errors {
                write!(f, "; {field}: {}", error.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// Rule codes are interned back to the static codes on the way in.
impl<'de> Deserialize<'de> for FieldError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            rule: String,
            message: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        let rule = match raw.rule.as_str() {
            "required" => Rule::Required.code(),
            "string" => Rule::String.code(),
            "max" => Rule::MaxLength(0).code(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "unknown rule code: {other}"
                )))
            }
        };
        Ok(FieldError {
            rule,
            message: raw.message,
        })
    }
}

/// Validate `input` against `rules`, reporting failures under `bag`.
///
/// Every field and rule is evaluated; failures accumulate. A missing or
/// `null` field only runs its implicit rules.
pub fn validate(
    input: &Map<String, Value>,
    rules: &RuleSet,
    bag: &str,
) -> Result<(), ValidationError> {
    let mut errors: BTreeMap<String, Vec<FieldError>> = BTreeMap::new();

    for (field, field_rules) in rules.iter() {
        let value = input.get(field);
        let missing = matches!(value, None | Some(Value::Null));

        for rule in field_rules {
            if missing && !rule.is_implicit() {
                continue;
            }
            if let Some(error) = rule.check(field, value) {
                errors.entry(field.to_string()).or_default().push(error);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            bag: bag.to_string(),
            errors,
        })
    }
}
