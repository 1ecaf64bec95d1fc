//! Form controller: the sole mutator of `FormState`.
//!
//! Two entry points, both synchronous and side-effect free:
//!   * `reduce(intent)`  – user events (edits, topping toggles, submit, mount)
//!   * `apply(result)`   – completions of tasks issued earlier
//!
//! Both return the `Effect`s the caller has to run. Nothing here awaits; the
//! asynchronous part (validation latency, the HTTP round trip) happens in the
//! executor and re-enters through `apply`.
//!
//! Ordering:
//!   Every field check carries the field's sequence number at issue time and every
//!   whole-form check carries the whole-form sequence number. `apply` only accepts a
//!   result whose number is the latest issued for its slot, so a slow validation of an
//!   older value can never overwrite the outcome for a newer one. Submissions carry an
//!   attempt number; only the attempt currently in flight is accepted, which makes a
//!   duplicated completion a no-op.

use tracing::trace;

use crate::effects::{Effect, SubmitOutcome, TaskKind, TaskResultKind};
use crate::model::{Field, FieldValue, ToppingId};
use crate::state::{FieldStatus, FormState, PerField, ServerOutcome};

/// User-originated events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The form was shown; runs the initial whole-form check.
    Mount,
    EditField { field: Field, value: String },
    ToggleTopping { id: ToppingId, checked: bool },
    Submit,
}

impl Intent {
    pub fn edit(field: Field, value: impl Into<String>) -> Self {
        Intent::EditField {
            field,
            value: value.into(),
        }
    }

    pub fn toggle(id: impl Into<String>, checked: bool) -> Self {
        Intent::ToggleTopping {
            id: ToppingId::new(id),
            checked,
        }
    }
}

#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
    field_seq: PerField<u64>,
    whole_seq: u64,
    last_attempt: u64,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Reduce a user intent into state transitions + effects.
    pub fn reduce(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::Mount => vec![self.issue_whole_check()],
            Intent::EditField { field, value } => self.edit_field(field, value),
            Intent::ToggleTopping { id, checked } => {
                let toppings = &mut self.state.values.toppings;
                if checked {
                    toppings.insert(id);
                } else {
                    toppings.remove(&id);
                }
                Vec::new()
            }
            Intent::Submit => self.submit(),
        }
    }

    /// Fold a finished task back into the state. Stale results are dropped.
    pub fn apply(&mut self, result: TaskResultKind) -> Vec<Effect> {
        match result {
            TaskResultKind::FieldChecked { field, seq, error } => {
                if seq != *self.field_seq.get(field) {
                    trace!(%field, seq, "dropping stale field check");
                    return Vec::new();
                }
                *self.state.status.get_mut(field) = if error.is_some() {
                    FieldStatus::Invalid
                } else {
                    FieldStatus::Valid
                };
                *self.state.errors.get_mut(field) = error.unwrap_or_default();
                Vec::new()
            }
            TaskResultKind::WholeChecked { seq, valid } => {
                if seq != self.whole_seq {
                    trace!(seq, latest = self.whole_seq, "dropping stale whole-form check");
                    return Vec::new();
                }
                self.state.submit_enabled = valid;
                Vec::new()
            }
            TaskResultKind::OrderSubmitted { attempt, outcome } => {
                if self.state.in_flight != Some(attempt) {
                    return vec![Effect::log(format!(
                        "ignoring result of submission attempt {attempt}: not in flight"
                    ))];
                }
                self.state.in_flight = None;
                match outcome {
                    SubmitOutcome::Accepted { message } => {
                        let previous = std::mem::take(&mut self.state.values);
                        self.state.outcome = ServerOutcome::succeeded(message);
                        if previous.full_name.is_empty() && previous.size.is_empty() {
                            Vec::new()
                        } else {
                            vec![self.issue_whole_check()]
                        }
                    }
                    SubmitOutcome::Rejected { message } => {
                        self.state.outcome = ServerOutcome::failed(message);
                        Vec::new()
                    }
                }
            }
        }
    }

    fn edit_field(&mut self, field: Field, value: String) -> Vec<Effect> {
        let changed = self.state.values.get(field) != value;
        self.state.values = self.state.values.with(field, value.clone());

        let seq = self.field_seq.get_mut(field);
        *seq += 1;
        let seq = *seq;
        *self.state.status.get_mut(field) = FieldStatus::Validating;

        let mut effects = vec![Effect::async_task(TaskKind::ValidateField { field, value, seq })];
        if changed {
            effects.push(self.issue_whole_check());
        }
        effects
    }

    fn submit(&mut self) -> Vec<Effect> {
        if let Some(attempt) = self.state.in_flight {
            return vec![Effect::log(format!(
                "submit ignored: attempt {attempt} is still in flight"
            ))];
        }
        self.last_attempt += 1;
        let attempt = self.last_attempt;
        self.state.in_flight = Some(attempt);
        vec![Effect::async_task(TaskKind::SubmitOrder {
            order: self.state.values.clone(),
            attempt,
        })]
    }

    fn issue_whole_check(&mut self) -> Effect {
        self.whole_seq += 1;
        Effect::async_task(TaskKind::ValidateWhole {
            value: self.gating_snapshot(),
            seq: self.whole_seq,
        })
    }

    fn gating_snapshot(&self) -> FieldValue {
        FieldValue {
            full_name: self.state.values.full_name.clone(),
            size: self.state.values.size.clone(),
            ..FieldValue::default()
        }
    }
}
