//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous assessment via the injected service

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::AssessmentService;
use crate::model::ModelArtifact;

use super::ui::{
    form::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Assessment service over the loaded artifact
    service: AssessmentService<ModelArtifact>,

    /// Patient form state
    form_state: PatientFormState,

    /// Result screen state, set on submit
    result_state: Option<ResultState>,

    /// Degraded-state note carried across form resets
    asset_notice: Option<String>,
}

impl App {
    /// Create a new application instance with the artifact from the
    /// configured path.
    ///
    /// Startup is fail-fast: a missing or inconsistent artifact aborts here
    /// rather than surfacing mid-session.
    ///
    /// # Errors
    /// Returns error if the model artifact cannot be loaded.
    pub fn new() -> Result<Self> {
        let model_path = std::env::var("CRKP_MODEL_PATH")
            .unwrap_or_else(|_| "model/model.json".to_string());
        let artifact = ModelArtifact::load(std::path::Path::new(&model_path)).map_err(|e| {
            anyhow!(
                "Failed to load model from {:?}: {}. Set CRKP_MODEL_PATH or run the train binary first.",
                model_path,
                e
            )
        })?;

        // The feature-importance figure is decorative; its absence degrades
        // the UI but never blocks assessments.
        let asset_path = std::env::var("CRKP_ASSET_PATH")
            .unwrap_or_else(|_| "assets/feature_importance.png".to_string());
        let asset_notice = if std::path::Path::new(&asset_path).exists() {
            None
        } else {
            tracing::warn!("Reference asset not found at {:?}", asset_path);
            Some("Feature-importance figure unavailable".to_string())
        };

        let mut app = Self::with_service(AssessmentService::new(Arc::new(artifact)));
        app.asset_notice = asset_notice;
        app.form_state.notice = app.asset_notice.clone();
        Ok(app)
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_service(service: AssessmentService<ModelArtifact>) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            form_state: PatientFormState::default(),
            result_state: None,
            asset_notice: None,
        }
    }

    fn reset_form(&mut self) {
        self.form_state = PatientFormState::default();
        self.form_state.notice = self.asset_notice.clone();
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                match self.screen {
                    Screen::Form => render_patient_form(f, chunks[0], &self.form_state),
                    Screen::Result => {
                        if let Some(state) = &self.result_state {
                            render_result(f, chunks[0], state);
                        }
                    }
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Char(' ') => {
                self.form_state.toggle_field();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match &self.result_state {
            Some(ResultState::Complete { .. }) => match key {
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.reset_form();
                    self.screen = Screen::Form;
                }
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                _ => {}
            },
            Some(ResultState::Error { .. }) => match key {
                KeyCode::Enter => {
                    self.screen = Screen::Form;
                }
                KeyCode::Esc => {
                    self.should_quit = true;
                }
                _ => {}
            },
            None => {}
        }
    }

    fn submit_form(&mut self) {
        let patient = match self.form_state.to_patient_indicators() {
            Ok(patient) => patient,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        // The model scores in well under a frame; no worker needed.
        match self.service.assess(&patient) {
            Ok(assessment) => {
                self.result_state = Some(ResultState::Complete { assessment });
                self.screen = Screen::Result;
            }
            Err(crate::CrkpError::Validation(message)) => {
                self.form_state.error_message = Some(message);
            }
            Err(e) => {
                tracing::error!("Assessment failed: {e}");
                self.result_state = Some(ResultState::Error {
                    message: e.to_string(),
                });
                self.screen = Screen::Result;
            }
        }
    }
}
