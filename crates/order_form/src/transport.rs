//! Order submission transport.
//!
//! The controller never talks HTTP itself; the executor hands the order snapshot to an
//! `OrderTransport` and turns the outcome into a `SubmitOutcome`. `HttpTransport` is the
//! production implementation: a single JSON POST per submission, no auth headers, no
//! idempotency key.
//!
//! Response handling:
//!   * 2xx: `{ "message": string }` becomes the receipt message (empty if absent); a body
//!     that is not JSON is a `Decode` error, never an accepted order
//!   * other status: the user-facing message is read from `message` or, for an error
//!     envelope, from `error.message`; absent means empty
//!   * connection / protocol failures carry no user-facing message

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::FieldValue;

pub const DEFAULT_ORDER_ENDPOINT: &str = "http://localhost:9009/api/order";

/// Successful round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("order rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed order response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Message to display inline; empty when the server did not provide one.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Rejected { message, .. } => message.clone().unwrap_or_default(),
            TransportError::Network(_) | TransportError::Decode(_) => String::new(),
        }
    }
}

/// Opaque request/response operation used for submission.
pub trait OrderTransport: Send + Sync + 'static {
    fn submit(
        &self,
        order: FieldValue,
    ) -> BoxFuture<'static, Result<OrderReceipt, TransportError>>;
}

/// JSON-over-HTTP transport posting to a single configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER_ENDPOINT)
    }
}

impl OrderTransport for HttpTransport {
    fn submit(
        &self,
        order: FieldValue,
    ) -> BoxFuture<'static, Result<OrderReceipt, TransportError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        async move {
            let response = client.post(&endpoint).json(&order).send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            debug!(%endpoint, status = status.as_u16(), "order response received");

            if status.is_success() {
                let body = serde_json::from_slice::<Value>(&bytes)?;
                Ok(OrderReceipt {
                    message: extract_message(&body).unwrap_or_default(),
                })
            } else {
                // Error pages are often not JSON; the status alone is enough to reject.
                let body = serde_json::from_slice::<Value>(&bytes).ok();
                Err(TransportError::Rejected {
                    status: status.as_u16(),
                    message: body.as_ref().and_then(extract_message),
                })
            }
        }
        .boxed()
    }
}

fn extract_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}
