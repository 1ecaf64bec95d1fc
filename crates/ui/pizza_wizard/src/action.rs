use order_form::Intent;
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Quit,
    Error(String),
    /// Forwarded to the form runtime.
    Form(Intent),
}
