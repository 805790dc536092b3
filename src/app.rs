use crate::controller::{Controller, Snapshot};
use crate::error::{ApiError, FetchError, SubmitError};
use crate::feeds::Mention;
use crate::ui::{self, widgets::form::MentionForm};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, widgets::ListState, Terminal};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(100);
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Submit,
    Refresh,
    RefreshSelected,
}

/// Everything the loop reacts to besides poll reports: terminal input and
/// requests that finished on their own task.
#[derive(Debug)]
pub(crate) enum AppEvent {
    Input(Event),
    Submitted(Result<Mention, SubmitError>),
    Refreshed(Result<Snapshot, FetchError>),
    MentionLoaded(Result<Mention, ApiError>),
}

pub struct App {
    pub(crate) controller: Controller,
    pub(crate) form: MentionForm,
    pub(crate) list_state: ListState,
    pub(crate) focus: Focus,
    pub(crate) status: Option<String>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    refreshing: bool,
    should_quit: bool,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            form: MentionForm::default(),
            list_state: ListState::default(),
            focus: Focus::List,
            status: None,
            events_tx,
            events_rx,
            refreshing: false,
            should_quit: false,
        }
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.spawn_input_reader();
        self.controller.start();
        let result = self.event_loop(terminal).await;
        self.controller.stop();
        result
    }

    /// Reads terminal events on a blocking thread. The thread ends once the
    /// app has dropped its receiver.
    fn spawn_input_reader(&self) {
        let tx = self.events_tx.clone();
        tokio::task::spawn_blocking(move || {
            while !tx.is_closed() {
                match event::poll(INPUT_POLL) {
                    Ok(true) => match event::read() {
                        Ok(ev) => {
                            if tx.send(AppEvent::Input(ev)).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    },
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut redraw = tokio::time::interval(TICK_RATE);
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                Some(report) = self.controller.next_report() => {
                    if self.controller.apply(report) {
                        self.clamp_selection();
                    }
                }
                _ = redraw.tick() => {}
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let action = self.handle_key(key);
                self.perform(action);
            }
            AppEvent::Input(_) => {}
            AppEvent::Submitted(Ok(created)) => {
                let id = self.controller.accept_submitted(created).id.clone();
                self.status = Some(format!("Submitted mention {}", id));
                self.form.succeed();
                self.list_state.select(Some(0));
            }
            AppEvent::Submitted(Err(err)) => self.form.fail(&err),
            AppEvent::Refreshed(outcome) => {
                self.refreshing = false;
                self.status = None;
                self.controller.apply_outcome(outcome);
                self.clamp_selection();
            }
            AppEvent::MentionLoaded(result) => {
                self.status = Some(match result {
                    Ok(mention) => {
                        let mention = self.controller.accept_mention(mention);
                        format!("Mention {} is {}", mention.id, mention.status)
                    }
                    Err(err) => format!("Could not refresh mention: {}", err),
                });
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.focus {
            Focus::Form => match key.code {
                KeyCode::Esc | KeyCode::Tab => {
                    self.focus = Focus::List;
                    Action::None
                }
                KeyCode::Enter => Action::Submit,
                KeyCode::Backspace => {
                    self.form.delete_char();
                    Action::None
                }
                KeyCode::Char(c) => {
                    self.form.add_char(c);
                    Action::None
                }
                _ => Action::None,
            },
            Focus::List => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Tab | KeyCode::Char('i') => {
                    self.focus = Focus::Form;
                    Action::None
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.scroll_down();
                    Action::None
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.scroll_up();
                    Action::None
                }
                KeyCode::Char('r') => Action::Refresh,
                KeyCode::Enter => Action::RefreshSelected,
                _ => Action::None,
            },
        }
    }

    /// Starts whatever the key asked for. Network work runs on its own task
    /// and comes back as an [`AppEvent`], so input keeps flowing meanwhile.
    fn perform(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
            Action::Submit => {
                if self.form.is_submitting() {
                    return;
                }
                match self.controller.submission(self.form.text()) {
                    Ok(request) => {
                        self.form.begin_submit();
                        self.spawn_request(request, AppEvent::Submitted);
                    }
                    Err(err) => self.form.fail(&err),
                }
            }
            Action::Refresh => {
                if self.refreshing {
                    return;
                }
                self.refreshing = true;
                self.status = Some("Refreshing...".to_string());
                self.spawn_request(self.controller.cycle(), AppEvent::Refreshed);
            }
            Action::RefreshSelected => {
                let Some(id) = self.selected_id() else {
                    return;
                };
                self.status = Some(format!("Reloading mention {}...", id));
                let request = self.controller.mention_request(&id);
                self.spawn_request(request, AppEvent::MentionLoaded);
            }
        }
    }

    fn spawn_request<F, T>(&self, request: F, wrap: fn(T) -> AppEvent)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            if tx.send(wrap(request.await)).is_err() {
                debug!("app closed before a request finished");
            }
        });
    }

    fn selected_id(&self) -> Option<String> {
        let index = self.list_state.selected()?;
        self.controller
            .state()
            .mentions()
            .get(index)
            .map(|m| m.id.clone())
    }

    fn scroll_up(&mut self) {
        if let Some(selected) = self.list_state.selected() {
            if selected > 0 {
                self.list_state.select(Some(selected - 1));
            }
        }
    }

    fn scroll_down(&mut self) {
        let len = self.controller.state().mentions().len();
        if len == 0 {
            return;
        }
        match self.list_state.selected() {
            Some(selected) if selected < len - 1 => self.list_state.select(Some(selected + 1)),
            Some(_) => {}
            None => self.list_state.select(Some(0)),
        }
    }

    /// Keeps the selection inside the list after it was replaced.
    fn clamp_selection(&mut self) {
        let len = self.controller.state().mentions().len();
        match self.list_state.selected() {
            Some(_) if len == 0 => self.list_state.select(None),
            Some(selected) if selected >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }
}
