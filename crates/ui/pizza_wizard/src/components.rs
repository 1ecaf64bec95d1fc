use color_eyre::Result;
use crossterm::event::KeyEvent;
use ::order_form::FormState;
use ratatui::{Frame, layout::Rect};

use crate::{action::Action, tui::Event};

pub mod order_form;

/// A visual and interactive element of the terminal UI.
///
/// Components never mutate the form themselves: they read `FormState` and answer events with
/// `Action`s, which the app loop forwards to the runtime.
pub trait Component {
    fn init(&mut self, _state: &FormState) -> Result<()> {
        Ok(())
    }

    fn handle_events(&mut self, event: Event, state: &FormState) -> Result<Option<Action>> {
        let r = match event {
            Event::Key(key_event) => self.handle_key_events(key_event, state)?,
            _ => None,
        };
        Ok(r)
    }

    fn handle_key_events(&mut self, _key: KeyEvent, _state: &FormState) -> Result<Option<Action>> {
        Ok(None)
    }

    fn update(&mut self, _action: Action, _state: &FormState) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &FormState) -> Result<()>;
}
