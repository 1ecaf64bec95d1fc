/*!
Task executor for the order form.

Turns the controller's declarative `Effect::Async(TaskKind)` outputs into running
work and reports each completion back over a channel as a `TaskCompletion`.

- `spawn(kind)` enqueues a task on an unbounded channel and returns its id.
- A single worker drains the queue and starts every task as its own tokio task,
  so validations and the submission round trip run concurrently and may finish
  in any order. Ordering is the controller's concern (sequence numbers), not ours.
- Validation runs the shared, stateless `ValidationSchema` after an optional
  artificial latency (`ExecutorSettings::validation_delay`).
- Submission goes through the `OrderTransport`; transport errors are converted to
  `SubmitOutcome::Rejected` here and never escape further.

Pending tasks are dropped silently on shutdown. There is no cancellation.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::effects::{SubmitOutcome, TaskCompletion, TaskId, TaskKind, TaskResultKind};
use crate::schema::ValidationSchema;
use crate::transport::OrderTransport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Delay applied before every validation task resolves.
    pub validation_delay: Duration,
}

/// Evaluate a validation task synchronously. `None` for non-validation tasks.
pub fn validation_result(schema: &ValidationSchema, kind: &TaskKind) -> Option<TaskResultKind> {
    match kind {
        TaskKind::ValidateField { field, value, seq } => Some(TaskResultKind::FieldChecked {
            field: *field,
            seq: *seq,
            error: schema.check_field(*field, value).err().map(|v| v.message),
        }),
        TaskKind::ValidateWhole { value, seq } => Some(TaskResultKind::WholeChecked {
            seq: *seq,
            valid: schema.check_whole(value),
        }),
        TaskKind::SubmitOrder { .. } => None,
    }
}

/// Handle for scheduling background tasks. Cheap to clone.
#[derive(Clone)]
pub struct TaskExecutor {
    tx: mpsc::UnboundedSender<Dispatch>,
}

struct Dispatch {
    id: TaskId,
    kind: TaskKind,
}

impl TaskExecutor {
    /// Create an executor and spawn its worker loop. Must be called inside a tokio runtime.
    pub fn new(
        schema: Arc<ValidationSchema>,
        transport: Arc<dyn OrderTransport>,
        settings: ExecutorSettings,
        completion_tx: mpsc::UnboundedSender<TaskCompletion>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Dispatch>();
        let worker = Worker {
            rx,
            context: Arc::new(TaskContext {
                schema,
                transport,
                settings,
                completion_tx,
            }),
        };
        worker.spawn();
        Self { tx }
    }

    /// Schedule a task. Returns `None` if the worker is gone.
    pub fn spawn(&self, kind: TaskKind) -> Option<TaskId> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        match self.tx.send(Dispatch { id, kind }) {
            Ok(()) => Some(id),
            Err(e) => {
                warn!("TaskExecutor channel closed; failed to schedule task: {}", e.0.kind);
                None
            }
        }
    }
}

/// Everything a running task needs; shared by all tasks of one executor.
struct TaskContext {
    schema: Arc<ValidationSchema>,
    transport: Arc<dyn OrderTransport>,
    settings: ExecutorSettings,
    completion_tx: mpsc::UnboundedSender<TaskCompletion>,
}

impl TaskContext {
    async fn run(&self, dispatch: Dispatch) {
        let Dispatch { id, kind } = dispatch;
        let result = match kind {
            TaskKind::SubmitOrder { order, attempt } => {
                info!("[task:{id}] submitting order attempt {attempt}");
                let outcome = match self.transport.submit(order).await {
                    Ok(receipt) => {
                        info!("[task:{id}] order accepted");
                        SubmitOutcome::Accepted {
                            message: receipt.message,
                        }
                    }
                    Err(e) => {
                        warn!("[task:{id}] order submission failed: {e}");
                        SubmitOutcome::Rejected {
                            message: e.user_message(),
                        }
                    }
                };
                TaskResultKind::OrderSubmitted { attempt, outcome }
            }
            validation => {
                if !self.settings.validation_delay.is_zero() {
                    tokio::time::sleep(self.settings.validation_delay).await;
                }
                match validation_result(&self.schema, &validation) {
                    Some(result) => result,
                    None => return,
                }
            }
        };
        debug!("[task:{id}] finished: {result:?}");
        if self.completion_tx.send(TaskCompletion { id, result }).is_err() {
            debug!("[task:{id}] completion dropped; receiver closed");
        }
    }
}

struct Worker {
    rx: mpsc::UnboundedReceiver<Dispatch>,
    context: Arc<TaskContext>,
}

impl Worker {
    fn spawn(mut self) {
        tokio::spawn(async move {
            while let Some(dispatch) = self.rx.recv().await {
                let context = Arc::clone(&self.context);
                tokio::spawn(async move { context.run(dispatch).await });
            }
            info!("TaskExecutor worker stopped (channel closed)");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldValue};
    use crate::transport::{OrderReceipt, TransportError};
    use futures::FutureExt;
    use futures::future::BoxFuture;

    struct Accepting;

    impl OrderTransport for Accepting {
        fn submit(
            &self,
            order: FieldValue,
        ) -> BoxFuture<'static, Result<OrderReceipt, TransportError>> {
            async move {
                Ok(OrderReceipt {
                    message: format!("thanks {}", order.full_name),
                })
            }
            .boxed()
        }
    }

    struct Refusing;

    impl OrderTransport for Refusing {
        fn submit(
            &self,
            _order: FieldValue,
        ) -> BoxFuture<'static, Result<OrderReceipt, TransportError>> {
            async {
                Err(TransportError::Rejected {
                    status: 503,
                    message: Some("Out of dough".into()),
                })
            }
            .boxed()
        }
    }

    /// Answers 200 with a body that is not JSON.
    struct Garbled;

    impl OrderTransport for Garbled {
        fn submit(
            &self,
            _order: FieldValue,
        ) -> BoxFuture<'static, Result<OrderReceipt, TransportError>> {
            async {
                let err = serde_json::from_str::<serde_json::Value>("<html>proxy page</html>")
                    .unwrap_err();
                Err(TransportError::Decode(err))
            }
            .boxed()
        }
    }

    fn executor(
        transport: Arc<dyn OrderTransport>,
    ) -> (TaskExecutor, mpsc::UnboundedReceiver<TaskCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let exec = TaskExecutor::new(
            Arc::new(ValidationSchema::default()),
            transport,
            ExecutorSettings::default(),
            tx,
        );
        (exec, rx)
    }

    #[test]
    fn submit_is_not_a_validation() {
        let kind = TaskKind::SubmitOrder {
            order: FieldValue::default(),
            attempt: 1,
        };
        assert!(validation_result(&ValidationSchema::default(), &kind).is_none());
    }

    #[tokio::test]
    async fn field_check_completes() {
        let (exec, mut rx) = executor(Arc::new(Accepting));
        let id = exec
            .spawn(TaskKind::ValidateField {
                field: Field::FullName,
                value: "Al".into(),
                seq: 7,
            })
            .unwrap();
        let done = rx.recv().await.unwrap();
        assert_eq!(done.id, id);
        assert_eq!(
            done.result,
            TaskResultKind::FieldChecked {
                field: Field::FullName,
                seq: 7,
                error: Some(crate::schema::FULL_NAME_TOO_SHORT.into()),
            }
        );
    }

    #[tokio::test]
    async fn submission_outcomes_are_mapped() {
        let (exec, mut rx) = executor(Arc::new(Accepting));
        let order = FieldValue {
            full_name: "Alice".into(),
            ..FieldValue::default()
        };
        exec.spawn(TaskKind::SubmitOrder { order, attempt: 1 });
        assert_eq!(
            rx.recv().await.unwrap().result,
            TaskResultKind::OrderSubmitted {
                attempt: 1,
                outcome: SubmitOutcome::Accepted {
                    message: "thanks Alice".into()
                },
            }
        );

        let (exec, mut rx) = executor(Arc::new(Refusing));
        exec.spawn(TaskKind::SubmitOrder {
            order: FieldValue::default(),
            attempt: 2,
        });
        assert_eq!(
            rx.recv().await.unwrap().result,
            TaskResultKind::OrderSubmitted {
                attempt: 2,
                outcome: SubmitOutcome::Rejected {
                    message: "Out of dough".into()
                },
            }
        );
    }

    #[tokio::test]
    async fn undecodable_response_is_a_rejection() {
        let (exec, mut rx) = executor(Arc::new(Garbled));
        exec.spawn(TaskKind::SubmitOrder {
            order: FieldValue::default(),
            attempt: 3,
        });
        assert_eq!(
            rx.recv().await.unwrap().result,
            TaskResultKind::OrderSubmitted {
                attempt: 3,
                outcome: SubmitOutcome::Rejected {
                    message: String::new()
                },
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn validation_delay_is_applied() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exec = TaskExecutor::new(
            Arc::new(ValidationSchema::default()),
            Arc::new(Accepting),
            ExecutorSettings {
                validation_delay: Duration::from_millis(250),
            },
            tx,
        );
        let started = tokio::time::Instant::now();
        exec.spawn(TaskKind::ValidateWhole {
            value: FieldValue::default(),
            seq: 1,
        });
        let done = rx.recv().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));
        assert_eq!(done.result, TaskResultKind::WholeChecked { seq: 1, valid: false });
    }
}
