use std::sync::Arc;

use color_eyre::Result;
use order_form::{FormRuntime, HttpTransport, Intent, TaskCompletion, ValidationSchema};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout},
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    action::Action,
    cli::Cli,
    components::{Component, order_form::OrderFormView},
    config::Config,
    tui::{Event, Tui},
};

const FORM_WIDTH: u16 = 52;
const FORM_HEIGHT: u16 = 28;

/// One wake-up of the main loop.
enum Step {
    Terminal(Option<Event>),
    Completion(Option<TaskCompletion>),
}

pub struct App {
    pub config: Config,
    pub runtime: FormRuntime,
    pub view: OrderFormView,
    pub tick_rate: f64,
    pub frame_rate: f64,
    pub should_quit: bool,
}

impl App {
    /// Must be called inside a tokio runtime.
    pub fn new(cli: &Cli, config: Config) -> Self {
        let schema = Arc::new(ValidationSchema::default());
        let transport = Arc::new(HttpTransport::new(config.order_endpoint.clone()));
        let view = OrderFormView::new(config.catalog(), &schema);
        let runtime = FormRuntime::new(schema, transport, config.executor_settings());
        Self {
            config,
            runtime,
            view,
            tick_rate: cli.tick_rate,
            frame_rate: cli.frame_rate,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = Tui::new()?
            .tick_rate(self.tick_rate)
            .frame_rate(self.frame_rate);
        tui.enter()?;

        info!(endpoint = %self.config.order_endpoint, "order form mounted");
        self.view.init(self.runtime.state())?;
        self.runtime.dispatch(Intent::Mount);

        let mut completions_open = true;
        loop {
            let step = tokio::select! {
                event = tui.next_event() => Step::Terminal(event),
                completion = self.runtime.next_completion(), if completions_open => {
                    Step::Completion(completion)
                }
            };

            match step {
                Step::Terminal(None) => break,
                Step::Terminal(Some(event)) => self.handle_event(event, &action_tx)?,
                Step::Completion(Some(completion)) => {
                    self.runtime.apply(completion);
                    action_tx.send(Action::Render)?;
                }
                Step::Completion(None) => {
                    warn!("task completion channel closed");
                    completions_open = false;
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                if action != Action::Tick && action != Action::Render {
                    debug!("{action:?}");
                }
                match action {
                    Action::Resize(w, h) => {
                        tui.resize(ratatui::layout::Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw(&mut tui, &action_tx)?,
                    action => {
                        if let Some(next) = self.update(action)? {
                            action_tx.send(next)?;
                        }
                    }
                }
            }

            if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn handle_event(
        &mut self,
        event: Event,
        action_tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        match &event {
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(*x, *y))?,
            Event::Error => action_tx.send(Action::Error("terminal event stream failed".into()))?,
            _ => {}
        }
        if let Some(action) = self.view.handle_events(event, self.runtime.state())? {
            action_tx.send(action)?;
        }
        Ok(())
    }

    /// Apply one action to the app. Drawing is handled by the loop.
    pub fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match &action {
            Action::Quit => self.should_quit = true,
            Action::Error(msg) => error!("{msg}"),
            Action::Form(intent) => {
                if *intent == Intent::Submit {
                    info!(endpoint = %self.config.order_endpoint, "submitting order");
                }
                self.runtime.dispatch(intent.clone());
            }
            _ => {}
        }
        self.view.update(action, self.runtime.state())
    }

    fn draw(&mut self, tui: &mut Tui, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        let mut failed = None;
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                failed = Some(err);
            }
        })?;
        if let Some(err) = failed {
            action_tx.send(Action::Error(format!("Failed to draw: {err:?}")))?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let [area] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [area] = Layout::vertical([Constraint::Length(FORM_HEIGHT)])
            .flex(Flex::Center)
            .areas(area);
        self.view.draw(frame, area, self.runtime.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use order_form::Field;
    use pretty_assertions::assert_eq;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["pizza_wizard", "--endpoint", "http://127.0.0.1:9/api/order"]);
        let config = Config::load(dir.path(), dir.path(), &cli).unwrap();
        (App::new(&cli, config), dir)
    }

    #[tokio::test]
    async fn form_actions_reach_the_runtime() {
        let (mut app, _dir) = app();
        app.update(Action::Form(Intent::Mount)).unwrap();
        app.update(Action::Form(Intent::edit(Field::FullName, "Al")))
            .unwrap();
        app.runtime.settle().await;

        let state = app.runtime.state();
        assert_eq!(state.values.full_name, "Al");
        assert_eq!(state.error(Field::FullName), order_form::schema::FULL_NAME_TOO_SHORT);
        assert!(!state.submit_enabled);

        app.update(Action::Form(Intent::edit(Field::FullName, "Alice")))
            .unwrap();
        app.update(Action::Form(Intent::edit(Field::Size, "L")))
            .unwrap();
        app.runtime.settle().await;
        assert!(app.runtime.state().can_submit());
    }

    #[tokio::test]
    async fn quit_sets_flag() {
        let (mut app, _dir) = app();
        assert!(!app.should_quit);
        assert_eq!(app.update(Action::Quit).unwrap(), None);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn cli_rates_are_used() {
        let (app, _dir) = app();
        assert_eq!(app.tick_rate, 4.0);
        assert_eq!(app.frame_rate, 30.0);
        assert_eq!(app.config.order_endpoint, "http://127.0.0.1:9/api/order");
    }
}
