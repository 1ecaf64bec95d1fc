//! Form state and validation engine for the pizza order form.
//!
//! - `schema`: declarative, stateless field constraints (`ValidationSchema`)
//! - `model`: order data (`FieldValue`, toppings, sizes)
//! - `state`: everything the form displays (`FormState`)
//! - `controller`: the only mutator of `FormState`; pure reducer returning `Effect`s
//! - `effects` / `executor`: asynchronous validation and submission tasks
//! - `transport`: order submission (`OrderTransport`, `HttpTransport`)
//! - `runtime`: controller + executor wired to one completion channel

pub mod controller;
pub mod effects;
pub mod executor;
pub mod model;
pub mod runtime;
pub mod schema;
pub mod state;
pub mod transport;

pub use controller::{FormController, Intent};
pub use effects::{Effect, SubmitOutcome, TaskCompletion, TaskKind, TaskResultKind};
pub use executor::{ExecutorSettings, TaskExecutor};
pub use model::{Field, FieldValue, Size, Topping, ToppingCatalog, ToppingId, ToppingSet};
pub use runtime::FormRuntime;
pub use schema::{FieldViolation, ValidationSchema};
pub use state::{FieldErrors, FieldStatus, FormState, Gate, ServerOutcome};
pub use transport::{
    DEFAULT_ORDER_ENDPOINT, HttpTransport, OrderReceipt, OrderTransport, TransportError,
};
