//! Form runtime (mutable) state.
//!
//! Data only. `FormController` is the sole mutator; everything else reads it through
//! `FormController::state()`.
//!
//! - `values`: current `FieldValue` (what would be submitted)
//! - `errors`: per-field message, `""` meaning no error
//! - `status`: per-field validation lifecycle
//! - `submit_enabled`: latest accepted whole-form check
//! - `outcome`: result of the last completed round trip
//! - `in_flight`: submission attempt currently awaiting the transport

use crate::model::{Field, FieldValue};

/// One value per validated field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerField<T> {
    pub full_name: T,
    pub size: T,
}

impl<T> PerField<T> {
    pub fn get(&self, field: Field) -> &T {
        match field {
            Field::FullName => &self.full_name,
            Field::Size => &self.size,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut T {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Size => &mut self.size,
        }
    }
}

/// Current human-readable violation per field. Empty string means "no error".
pub type FieldErrors = PerField<String>;

/// Validation lifecycle of one field. Edits are accepted in every state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldStatus {
    #[default]
    Pristine,
    Validating,
    Valid,
    Invalid,
}

/// Whole-form gating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Disabled,
    Enabled,
}

/// Result of the last completed submission. At most one side is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOutcome {
    pub success: String,
    pub failure: String,
}

impl ServerOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: message.into(),
            failure: String::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: String::new(),
            failure: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failure.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub values: FieldValue,
    pub errors: FieldErrors,
    pub status: PerField<FieldStatus>,
    pub submit_enabled: bool,
    pub outcome: ServerOutcome,
    pub in_flight: Option<u64>,
}

impl FormState {
    pub fn error(&self, field: Field) -> &str {
        self.errors.get(field)
    }

    pub fn gate(&self) -> Gate {
        if self.submit_enabled {
            Gate::Enabled
        } else {
            Gate::Disabled
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// What a submit affordance should show: enabled and not waiting on the server.
    pub fn can_submit(&self) -> bool {
        self.submit_enabled && !self.is_submitting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_field_access() {
        let mut errors = FieldErrors::default();
        *errors.get_mut(Field::Size) = "bad".into();
        assert_eq!(errors.get(Field::Size), "bad");
        assert_eq!(errors.get(Field::FullName), "");
    }

    #[test]
    fn initial_state_is_gated() {
        let state = FormState::default();
        assert_eq!(state.gate(), Gate::Disabled);
        assert!(!state.can_submit());
        assert!(state.outcome.is_empty());
        assert_eq!(state.status.full_name, FieldStatus::Pristine);
    }
}
