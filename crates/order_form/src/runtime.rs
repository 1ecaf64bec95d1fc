//! Headless form runtime: one controller, one executor, one completion channel.
//!
//! The owner drives it from a single task. `dispatch` reduces an intent and schedules the
//! resulting work; completions are pulled with `next_completion` (cancel-safe, so it can
//! sit inside `tokio::select!`) and folded back with `apply`. `settle` drains until no
//! scheduled task is outstanding.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::controller::{FormController, Intent};
use crate::effects::{Effect, TaskCompletion};
use crate::executor::{ExecutorSettings, TaskExecutor};
use crate::schema::ValidationSchema;
use crate::state::FormState;
use crate::transport::OrderTransport;

pub struct FormRuntime {
    controller: FormController,
    executor: TaskExecutor,
    completions: mpsc::UnboundedReceiver<TaskCompletion>,
    pending: usize,
}

impl FormRuntime {
    /// Must be called inside a tokio runtime (spawns the executor worker).
    pub fn new(
        schema: Arc<ValidationSchema>,
        transport: Arc<dyn OrderTransport>,
        settings: ExecutorSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller: FormController::new(),
            executor: TaskExecutor::new(schema, transport, settings, tx),
            completions: rx,
            pending: 0,
        }
    }

    pub fn state(&self) -> &FormState {
        self.controller.state()
    }

    /// Number of scheduled tasks whose completion has not been applied yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn dispatch(&mut self, intent: Intent) {
        debug!(?intent, "dispatch");
        let effects = self.controller.reduce(intent);
        self.run_effects(effects);
    }

    /// Wait for the next finished task.
    pub async fn next_completion(&mut self) -> Option<TaskCompletion> {
        self.completions.recv().await
    }

    pub fn apply(&mut self, completion: TaskCompletion) {
        self.pending = self.pending.saturating_sub(1);
        let effects = self.controller.apply(completion.result);
        self.run_effects(effects);
    }

    /// Apply one completion. Returns false if the channel is closed.
    pub async fn pump(&mut self) -> bool {
        match self.next_completion().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is outstanding.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            if !self.pump().await {
                break;
            }
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Log(msg) => info!("[effect] {msg}"),
                Effect::Async(task) => {
                    debug!("[effect] schedule async task: {task}");
                    if self.executor.spawn(task).is_some() {
                        self.pending += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldValue, ToppingSet};
    use crate::transport::{OrderReceipt, TransportError};
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Replays a fixed response and records every order it receives.
    struct Scripted {
        response: Result<String, Option<String>>,
        seen: Mutex<Vec<FieldValue>>,
        gate: Option<Arc<Notify>>,
    }

    impl Scripted {
        fn accepting(message: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(message.into()),
                seen: Mutex::new(Vec::new()),
                gate: None,
            })
        }

        fn rejecting(message: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                response: Err(message.map(str::to_string)),
                seen: Mutex::new(Vec::new()),
                gate: None,
            })
        }

        fn seen(&self) -> Vec<FieldValue> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl OrderTransport for Scripted {
        fn submit(
            &self,
            order: FieldValue,
        ) -> BoxFuture<'static, Result<OrderReceipt, TransportError>> {
            self.seen.lock().unwrap().push(order);
            let response = self.response.clone();
            let gate = self.gate.clone();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                response
                    .map(|message| OrderReceipt { message })
                    .map_err(|message| TransportError::Rejected {
                        status: 400,
                        message,
                    })
            }
            .boxed()
        }
    }

    fn runtime(transport: Arc<Scripted>) -> FormRuntime {
        FormRuntime::new(
            Arc::new(ValidationSchema::default()),
            transport,
            ExecutorSettings::default(),
        )
    }

    async fn fill(rt: &mut FormRuntime) {
        rt.dispatch(Intent::Mount);
        rt.dispatch(Intent::edit(Field::FullName, "Alice Smith"));
        rt.dispatch(Intent::edit(Field::Size, "M"));
        rt.dispatch(Intent::toggle("1", true));
        rt.dispatch(Intent::toggle("3", true));
        rt.settle().await;
    }

    #[tokio::test]
    async fn successful_order_round_trip() {
        let transport = Scripted::accepting("Order placed!");
        let mut rt = runtime(transport.clone());
        fill(&mut rt).await;
        assert!(rt.state().can_submit());

        rt.dispatch(Intent::Submit);
        rt.settle().await;

        let state = rt.state();
        assert_eq!(state.outcome.success, "Order placed!");
        assert_eq!(state.outcome.failure, "");
        assert_eq!(state.values, FieldValue::default());
        assert!(!state.submit_enabled);
        assert_eq!(
            transport.seen(),
            vec![FieldValue {
                full_name: "Alice Smith".into(),
                size: "M".into(),
                toppings: ToppingSet::from(["1", "3"]),
            }]
        );
    }

    #[tokio::test]
    async fn rejected_order_keeps_form() {
        let transport = Scripted::rejecting(Some("Out of dough"));
        let mut rt = runtime(transport.clone());
        fill(&mut rt).await;
        let before = rt.state().values.clone();

        rt.dispatch(Intent::Submit);
        rt.settle().await;

        let state = rt.state();
        assert_eq!(state.outcome.failure, "Out of dough");
        assert_eq!(state.outcome.success, "");
        assert_eq!(state.values, before);

        rt.dispatch(Intent::Submit);
        rt.settle().await;
        assert_eq!(transport.seen().len(), 2);
    }

    #[tokio::test]
    async fn rejection_without_message_is_empty() {
        let mut rt = runtime(Scripted::rejecting(None));
        fill(&mut rt).await;
        rt.dispatch(Intent::Submit);
        rt.settle().await;
        assert_eq!(rt.state().outcome.failure, "");
        assert_eq!(rt.state().values.full_name, "Alice Smith");
    }

    #[tokio::test]
    async fn form_stays_editable_while_submitting() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(Scripted {
            response: Ok("done".into()),
            seen: Mutex::new(Vec::new()),
            gate: Some(gate.clone()),
        });
        let mut rt = runtime(transport.clone());
        fill(&mut rt).await;

        rt.dispatch(Intent::Submit);
        rt.dispatch(Intent::Submit);
        assert_eq!(rt.pending(), 1);

        rt.dispatch(Intent::edit(Field::FullName, "Al"));
        // Field check and whole check finish while the order is still in flight.
        while rt.pending() > 1 {
            assert!(rt.pump().await);
        }
        assert!(rt.state().is_submitting());
        assert_eq!(
            rt.state().error(Field::FullName),
            crate::schema::FULL_NAME_TOO_SHORT
        );
        assert!(!rt.state().submit_enabled);

        gate.notify_one();
        rt.settle().await;
        assert_eq!(rt.state().outcome.success, "done");
        assert_eq!(transport.seen().len(), 1);
    }
}
