//! Declarative validation schema for the order form.
//!
//! A `ValidationSchema` groups one `FieldRule` per validated field. Each rule holds an
//! ordered list of constraints, each paired with the message surfaced when it is the
//! first one violated. The schema is immutable once built and carries no interior
//! state, so a single instance can be shared (`Arc<ValidationSchema>`) by every
//! controller and every in-flight validation task.
//!
//! ```ignore
//! use order_form::{Field, ValidationSchema};
//!
//! let schema = ValidationSchema::default();
//! assert!(schema.check_field(Field::FullName, "  Al  ").is_err());
//! assert!(schema.check_field(Field::Size, "M").is_ok());
//! ```

use thiserror::Error;

use crate::model::{Field, FieldValue, Size};
use strum::IntoEnumIterator;

pub const FULL_NAME_TOO_SHORT: &str = "full name must be at least 3 characters";
pub const FULL_NAME_TOO_LONG: &str = "full name must be at most 20 characters";
pub const SIZE_INCORRECT: &str = "size must be S or M or L";

/// First violated constraint of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

/// A single check applied to a (possibly trimmed) string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// At least `n` characters.
    MinChars(usize),
    /// At most `n` characters.
    MaxChars(usize),
    /// Value must equal one of the options.
    OneOf(Vec<String>),
}

impl Rule {
    fn holds(&self, value: &str) -> bool {
        match self {
            Rule::MinChars(n) => value.chars().count() >= *n,
            Rule::MaxChars(n) => value.chars().count() <= *n,
            Rule::OneOf(options) => options.iter().any(|o| o == value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub rule: Rule,
    pub message: String,
}

/// Constraints of one field, evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub label: String,
    /// Strip leading/trailing whitespace before evaluating constraints.
    pub trim: bool,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn new(field: Field, label: impl Into<String>) -> Self {
        Self {
            field,
            label: label.into(),
            trim: false,
            constraints: Vec::new(),
        }
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn min_chars(self, n: usize, message: impl Into<String>) -> Self {
        self.constraint(Rule::MinChars(n), message)
    }

    pub fn max_chars(self, n: usize, message: impl Into<String>) -> Self {
        self.constraint(Rule::MaxChars(n), message)
    }

    pub fn one_of<I, S>(self, options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        self.constraint(Rule::OneOf(options), message)
    }

    fn constraint(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint {
            rule,
            message: message.into(),
        });
        self
    }

    /// Message of the first violated constraint, if any.
    pub fn first_violation(&self, raw: &str) -> Option<&str> {
        let value = if self.trim { raw.trim() } else { raw };
        self.constraints
            .iter()
            .find(|c| !c.rule.holds(value))
            .map(|c| c.message.as_str())
    }
}

/// Per-field and whole-form constraints of the order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSchema {
    fields: Vec<FieldRule>,
}

impl Default for ValidationSchema {
    /// The pizza order rules: full name 3..=20 trimmed characters, size one of S/M/L.
    /// Toppings carry no constraint.
    fn default() -> Self {
        Self::new(vec![
            FieldRule::new(Field::FullName, "Full Name")
                .trim()
                .min_chars(3, FULL_NAME_TOO_SHORT)
                .max_chars(20, FULL_NAME_TOO_LONG),
            FieldRule::new(Field::Size, "Size")
                .one_of(Size::iter().map(|s| s.to_string()), SIZE_INCORRECT),
        ])
    }
}

impl ValidationSchema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    pub fn field_rule(&self, field: Field) -> Option<&FieldRule> {
        self.fields.iter().find(|r| r.field == field)
    }

    /// Display label of `field`; falls back to the wire name for fields without rules.
    pub fn label(&self, field: Field) -> String {
        self.field_rule(field)
            .map(|r| r.label.clone())
            .unwrap_or_else(|| field.to_string())
    }

    /// Check a single field. A field without rules always passes.
    pub fn check_field(&self, field: Field, value: &str) -> Result<(), FieldViolation> {
        match self.field_rule(field).and_then(|r| r.first_violation(value)) {
            None => Ok(()),
            Some(message) => Err(FieldViolation {
                field,
                message: message.to_string(),
            }),
        }
    }

    /// True iff every declared constraint holds for `value`.
    pub fn check_whole(&self, value: &FieldValue) -> bool {
        self.fields
            .iter()
            .all(|r| r.first_violation(value.get(r.field)).is_none())
    }

    /// `check_whole` restricted to the gating inputs.
    pub fn compute_submit_enabled(&self, full_name: &str, size: &str) -> bool {
        let value = FieldValue {
            full_name: full_name.to_string(),
            size: size.to_string(),
            ..FieldValue::default()
        };
        self.check_whole(&value)
    }
}
