use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use order_form::{Field, FormState, Intent, Size, ToppingCatalog, ValidationSchema};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use strum::IntoEnumIterator;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{action::Action, components::Component, tui::Event};

const TITLE: &str = "Order Your Pizza";
const SIZE_PLACEHOLDER: &str = "----Choose Size----";
const NAME_PLACEHOLDER: &str = "Type full name";
const INPUT_PREFIX: &str = "  > ";

/// Focusable rows, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    FullName,
    Size,
    Topping(usize),
    Submit,
}

/// The pizza order form: name input, size selector, topping checkboxes and submit button.
///
/// Holds only UI-local state (focus, cursor). Everything the user can see about the order
/// comes from `FormState`; edits leave as `Action::Form` intents.
pub struct OrderFormView {
    catalog: ToppingCatalog,
    name_label: String,
    size_label: String,
    focus: Focus,
    input: Input,
}

impl OrderFormView {
    pub fn new(catalog: ToppingCatalog, schema: &ValidationSchema) -> Self {
        Self {
            catalog,
            name_label: schema.label(Field::FullName),
            size_label: schema.label(Field::Size),
            focus: Focus::FullName,
            input: Input::default(),
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    fn focus_next(&mut self) {
        let toppings = self.catalog.len();
        self.focus = match self.focus {
            Focus::FullName => Focus::Size,
            Focus::Size if toppings > 0 => Focus::Topping(0),
            Focus::Size => Focus::Submit,
            Focus::Topping(i) if i + 1 < toppings => Focus::Topping(i + 1),
            Focus::Topping(_) => Focus::Submit,
            Focus::Submit => Focus::FullName,
        };
    }

    fn focus_prev(&mut self) {
        let toppings = self.catalog.len();
        self.focus = match self.focus {
            Focus::FullName => Focus::Submit,
            Focus::Size => Focus::FullName,
            Focus::Topping(0) => Focus::Size,
            Focus::Topping(i) => Focus::Topping(i - 1),
            Focus::Submit if toppings > 0 => Focus::Topping(toppings - 1),
            Focus::Submit => Focus::Size,
        };
    }

    /// Keep the input buffer in step with the form (e.g. after a successful submit resets it).
    fn sync_input(&mut self, state: &FormState) {
        if self.input.value() != state.values.full_name {
            self.input = Input::new(state.values.full_name.clone());
        }
    }

    fn edit_name(&mut self, event: &CrosstermEvent) -> Option<Action> {
        let changed = self.input.handle_event(event)?;
        changed
            .value
            .then(|| Action::Form(Intent::edit(Field::FullName, self.input.value())))
    }

    fn cycle_size(current: &str, dir: i32) -> String {
        let options: Vec<String> = std::iter::once(String::new())
            .chain(Size::iter().map(|s| s.to_string()))
            .collect();
        let idx = options.iter().position(|o| o == current).unwrap_or(0) as i32;
        let next = (idx + dir).rem_euclid(options.len() as i32) as usize;
        options[next].clone()
    }

    fn size_text(value: &str) -> &str {
        match value.parse::<Size>() {
            Ok(size) => size.label(),
            Err(_) if value.is_empty() => SIZE_PLACEHOLDER,
            Err(_) => value,
        }
    }

    fn label_style(&self, focus: Focus) -> Style {
        if self.focus == focus {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    fn push_error(lines: &mut Vec<Line<'_>>, message: &str) {
        if !message.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {message}"),
                Style::default().fg(Color::Red),
            )));
        }
    }
}

impl Component for OrderFormView {
    fn handle_events(&mut self, event: Event, state: &FormState) -> Result<Option<Action>> {
        match event {
            Event::Key(key) => self.handle_key_events(key, state),
            Event::Paste(text) if self.focus == Focus::FullName => {
                let mut value = self.input.value().to_string();
                value.push_str(&text);
                self.input = Input::new(value);
                Ok(Some(Action::Form(Intent::edit(
                    Field::FullName,
                    self.input.value(),
                ))))
            }
            _ => Ok(None),
        }
    }

    fn handle_key_events(&mut self, key: KeyEvent, state: &FormState) -> Result<Option<Action>> {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Ok(Some(Action::Quit));
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                return Ok(None);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                return Ok(None);
            }
            _ => {}
        }

        let action = match (self.focus, key.code) {
            (Focus::FullName, KeyCode::Enter) => {
                self.focus_next();
                None
            }
            (Focus::FullName, _) => {
                self.sync_input(state);
                self.edit_name(&CrosstermEvent::Key(key))
            }
            (Focus::Size, KeyCode::Left | KeyCode::Right) => {
                let dir = if key.code == KeyCode::Left { -1 } else { 1 };
                let next = Self::cycle_size(&state.values.size, dir);
                Some(Action::Form(Intent::edit(Field::Size, next)))
            }
            (Focus::Size, KeyCode::Enter) => {
                self.focus_next();
                None
            }
            (Focus::Topping(i), KeyCode::Char(' ') | KeyCode::Enter) => {
                self.catalog.get(i).map(|topping| {
                    let checked = state.values.toppings.contains(&topping.id);
                    Action::Form(Intent::ToggleTopping {
                        id: topping.id.clone(),
                        checked: !checked,
                    })
                })
            }
            (Focus::Submit, KeyCode::Enter | KeyCode::Char(' ')) if state.can_submit() => {
                Some(Action::Form(Intent::Submit))
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &FormState) -> Result<()> {
        self.sync_input(state);

        let block = Block::default()
            .title(Line::from(format!(" {TITLE} ")).bold().centered())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        f.render_widget(Clear, area);
        f.render_widget(block, area);

        let mut lines: Vec<Line> = Vec::new();

        if !state.outcome.success.is_empty() {
            lines.push(Line::from(Span::styled(
                state.outcome.success.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }
        if !state.outcome.failure.is_empty() {
            lines.push(Line::from(Span::styled(
                state.outcome.failure.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }
        if !state.outcome.is_empty() {
            lines.push(Line::raw(""));
        }

        lines.push(Line::from(Span::styled(
            self.name_label.clone(),
            self.label_style(Focus::FullName),
        )));
        let input_row = lines.len();
        let name = if self.input.value().is_empty() {
            Span::styled(NAME_PLACEHOLDER, Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.input.value().to_string())
        };
        lines.push(Line::from(vec![Span::raw(INPUT_PREFIX), name]));
        Self::push_error(&mut lines, state.error(Field::FullName));
        lines.push(Line::raw(""));

        lines.push(Line::from(Span::styled(
            self.size_label.clone(),
            self.label_style(Focus::Size),
        )));
        lines.push(Line::from(format!(
            "  < {} >",
            Self::size_text(&state.values.size)
        )));
        Self::push_error(&mut lines, state.error(Field::Size));
        lines.push(Line::raw(""));

        lines.push(Line::from(Span::styled(
            "Toppings",
            Style::default().fg(Color::Gray),
        )));
        for (i, topping) in self.catalog.iter().enumerate() {
            let mark = if state.values.toppings.contains(&topping.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let line = format!("  {mark} {}", topping.display_text);
            let style = if self.focus == Focus::Topping(i) {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(line, style)));
        }
        lines.push(Line::raw(""));

        let button = if state.is_submitting() {
            "[ Submitting... ]"
        } else {
            "[ Submit ]"
        };
        let mut button_style = if state.can_submit() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if self.focus == Focus::Submit {
            button_style = button_style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(button, button_style)));

        f.render_widget(Paragraph::new(lines), inner);

        if self.focus == Focus::FullName && (input_row as u16) < inner.height {
            let x = inner.x + INPUT_PREFIX.len() as u16 + self.input.visual_cursor() as u16;
            f.set_cursor_position(Position::new(
                x.min(inner.right().saturating_sub(1)),
                inner.y + input_row as u16,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_form::ServerOutcome;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn view() -> OrderFormView {
        OrderFormView::new(ToppingCatalog::default(), &ValidationSchema::default())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn press(view: &mut OrderFormView, state: &FormState, code: KeyCode) -> Option<Action> {
        view.handle_events(key(code), state).unwrap()
    }

    fn render(view: &mut OrderFormView, state: &FormState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(48, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.draw(f, area, state).unwrap();
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn typing_edits_the_name_one_keystroke_at_a_time() {
        let mut view = view();
        let mut state = FormState::default();

        let action = press(&mut view, &state, KeyCode::Char('A'));
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::FullName, "A"))));

        state.values.full_name = "A".into();
        let action = press(&mut view, &state, KeyCode::Char('l'));
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::FullName, "Al"))));

        state.values.full_name = "Al".into();
        let action = press(&mut view, &state, KeyCode::Backspace);
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::FullName, "A"))));
    }

    #[test]
    fn focus_walks_every_row_and_wraps() {
        let catalog = ToppingCatalog::default();
        let toppings = catalog.len();
        let mut view = OrderFormView::new(catalog, &ValidationSchema::default());
        let state = FormState::default();

        press(&mut view, &state, KeyCode::Tab);
        assert_eq!(view.focus(), Focus::Size);
        for i in 0..toppings {
            press(&mut view, &state, KeyCode::Down);
            assert_eq!(view.focus(), Focus::Topping(i));
        }
        press(&mut view, &state, KeyCode::Tab);
        assert_eq!(view.focus(), Focus::Submit);
        press(&mut view, &state, KeyCode::Tab);
        assert_eq!(view.focus(), Focus::FullName);
        press(&mut view, &state, KeyCode::BackTab);
        assert_eq!(view.focus(), Focus::Submit);
    }

    #[test]
    fn size_cycles_through_placeholder() {
        let mut view = view();
        let mut state = FormState::default();
        press(&mut view, &state, KeyCode::Tab);

        let action = press(&mut view, &state, KeyCode::Right);
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::Size, "S"))));

        let action = press(&mut view, &state, KeyCode::Left);
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::Size, "L"))));

        state.values.size = "L".into();
        let action = press(&mut view, &state, KeyCode::Right);
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::Size, ""))));
    }

    #[test]
    fn space_toggles_focused_topping() {
        let mut view = view();
        let mut state = FormState::default();
        press(&mut view, &state, KeyCode::Tab);
        press(&mut view, &state, KeyCode::Tab);
        assert_eq!(view.focus(), Focus::Topping(0));

        let action = press(&mut view, &state, KeyCode::Char(' '));
        assert_eq!(action, Some(Action::Form(Intent::toggle("1", true))));

        state.values.toppings = ["1"].into();
        let action = press(&mut view, &state, KeyCode::Char(' '));
        assert_eq!(action, Some(Action::Form(Intent::toggle("1", false))));
    }

    #[test]
    fn submit_only_when_enabled_and_idle() {
        let mut view = view();
        let mut state = FormState::default();
        press(&mut view, &state, KeyCode::BackTab);
        assert_eq!(view.focus(), Focus::Submit);

        assert_eq!(press(&mut view, &state, KeyCode::Enter), None);

        state.submit_enabled = true;
        assert_eq!(
            press(&mut view, &state, KeyCode::Enter),
            Some(Action::Form(Intent::Submit))
        );

        state.in_flight = Some(1);
        assert_eq!(press(&mut view, &state, KeyCode::Enter), None);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut view = view();
        let state = FormState::default();
        assert_eq!(press(&mut view, &state, KeyCode::Esc), Some(Action::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(view.handle_events(ctrl_c, &state).unwrap(), Some(Action::Quit));
    }

    #[test]
    fn paste_appends_to_name() {
        let mut view = view();
        let state = FormState::default();
        let action = view
            .handle_events(Event::Paste("Bob Ross".into()), &state)
            .unwrap();
        assert_eq!(action, Some(Action::Form(Intent::edit(Field::FullName, "Bob Ross"))));
    }

    #[test]
    fn renders_fields_errors_and_outcome() {
        let mut view = view();
        let mut state = FormState::default();
        state.values.full_name = "Al".into();
        state.values.size = "M".into();
        state.values.toppings = ["2"].into();
        state.errors.full_name = "full name must be at least 3 characters".into();
        state.outcome = ServerOutcome::failed("Server says no");

        let screen = render(&mut view, &state);
        assert!(screen.contains("Order Your Pizza"));
        assert!(screen.contains("Server says no"));
        assert!(screen.contains("> Al"));
        assert!(screen.contains("at least 3"));
        assert!(screen.contains("< Medium >"));
        assert!(screen.contains("[x] Green Peppers"));
        assert!(screen.contains("[ ] Pepperoni"));
        assert!(screen.contains("[ Submit ]"));
    }

    #[test]
    fn empty_form_shows_placeholders() {
        let mut view = view();
        let screen = render(&mut view, &FormState::default());
        assert!(screen.contains("Full Name"));
        assert!(screen.contains(&format!("> {NAME_PLACEHOLDER}")));
        assert!(screen.contains(SIZE_PLACEHOLDER));
        assert!(!screen.contains("Server"));
    }

    #[test]
    fn draw_resyncs_input_after_reset() {
        let mut view = view();
        let mut state = FormState::default();
        state.values.full_name = "Alice".into();
        render(&mut view, &state);

        state.values.full_name.clear();
        state.outcome = ServerOutcome::succeeded("Thanks, Alice");
        let screen = render(&mut view, &state);
        assert!(screen.contains("Thanks, Alice"));
        assert!(!screen.contains("> Alice"));
    }
}
