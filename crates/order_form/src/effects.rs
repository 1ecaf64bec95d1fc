/*!
Effect & task model of the order form.

The controller stays pure: every state transition returns a `Vec<Effect>`
describing work to do, never doing it itself. The `TaskExecutor` interprets
`Effect::Async(TaskKind)` by spawning the work; each finished task comes back
as a `TaskCompletion` carrying a `TaskResultKind`, which the owner of the
controller feeds into `FormController::apply`.

Every `TaskKind` carries the sequence number (or submission attempt) it was
issued under. The controller uses it on the way back to drop results that a
newer request for the same slot has superseded.
*/

use std::fmt;

use crate::model::{Field, FieldValue};

/// Monotonic task identifier assigned by the executor.
pub type TaskId = u64;

/// Declarative instruction emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Schedule an asynchronous task.
    Async(TaskKind),
    /// Lightweight side-effect: log a message (info-level semantic).
    Log(String),
}

impl Effect {
    pub fn log<T: Into<String>>(msg: T) -> Self {
        Effect::Log(msg.into())
    }

    pub fn async_task(kind: TaskKind) -> Self {
        Effect::Async(kind)
    }

    /// The scheduled task, if this is an `Async` effect.
    pub fn task(&self) -> Option<&TaskKind> {
        match self {
            Effect::Async(kind) => Some(kind),
            Effect::Log(_) => None,
        }
    }
}

/// Asynchronous work units. Each variant holds everything needed to run it.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Check one field's value against the schema.
    ValidateField { field: Field, value: String, seq: u64 },
    /// Check the whole form for submit gating.
    ValidateWhole { value: FieldValue, seq: u64 },
    /// Send the order to the transport.
    SubmitOrder { order: FieldValue, attempt: u64 },
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::ValidateField { field, seq, .. } => {
                write!(f, "ValidateField(field={field}, seq={seq})")
            }
            TaskKind::ValidateWhole { seq, .. } => write!(f, "ValidateWhole(seq={seq})"),
            TaskKind::SubmitOrder { attempt, .. } => write!(f, "SubmitOrder(attempt={attempt})"),
        }
    }
}

/// Outcome of one submission round trip, already reduced to what the form displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server accepted the order; `message` is its success message.
    Accepted { message: String },
    /// Round trip failed or the server rejected the order; `message` may be empty.
    Rejected { message: String },
}

/// Results produced by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResultKind {
    /// `error` is the first violated constraint's message, `None` when valid.
    FieldChecked {
        field: Field,
        seq: u64,
        error: Option<String>,
    },
    WholeChecked { seq: u64, valid: bool },
    OrderSubmitted { attempt: u64, outcome: SubmitOutcome },
}

/// A finished task as delivered over the executor's completion channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompletion {
    pub id: TaskId,
    pub result: TaskResultKind,
}
