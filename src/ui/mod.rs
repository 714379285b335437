//! TUI module using ratatui.
//!
//! A single screen: a source prompt, the summary pane, and a status bar. Key presses become controller commands.

pub mod components;
pub mod controller;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::debug;

use crate::speech::{SpeechEngine, Voice};
use controller::{Command, Controller, Notice};

const TICK: Duration = Duration::from_millis(250);

/// What keystrokes currently edit
pub enum Mode {
    Normal,
    /// Typing the URL or file to summarize
    Source,
    /// Typing a search term
    Search,
    Voices { voices: Vec<Voice>, selected: usize },
}

pub struct App<E: SpeechEngine> {
    pub controller: Controller<E>,
    pub mode: Mode,
    pub input: String,
    pub notice: Option<Notice>,
    quit: bool,
}

impl<E: SpeechEngine> App<E> {
    pub fn new(controller: Controller<E>, source: Option<String>) -> Self {
        let mode = if source.is_some() {
            Mode::Normal
        } else {
            Mode::Source
        };
        Self {
            controller,
            mode,
            input: source.unwrap_or_default(),
            notice: None,
            quit: false,
        }
    }

    async fn run_command(&mut self, command: Command) {
        self.notice = Some(match self.controller.dispatch(command).await {
            Ok(notice) => notice,
            Err(e) => Notice::Alert(e.to_string()),
        });
    }

    async fn on_key(&mut self, key: KeyEvent) {
        match &mut self.mode {
            Mode::Normal => self.on_normal_key(key.code).await,
            Mode::Source | Mode::Search => match key.code {
                KeyCode::Esc => {
                    self.input.clear();
                    self.mode = Mode::Normal;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                KeyCode::Enter => {
                    let text = std::mem::take(&mut self.input);
                    let command = match self.mode {
                        Mode::Source => Command::Summarize(text.trim().to_string()),
                        _ => Command::Search(text),
                    };
                    self.mode = Mode::Normal;
                    if matches!(command, Command::Summarize(_)) {
                        self.notice = Some(Notice::Info("Summarizing...".to_string()));
                    }
                    self.run_command(command).await;
                }
                _ => {}
            },
            Mode::Voices { voices, selected } => match key.code {
                KeyCode::Esc => self.mode = Mode::Normal,
                KeyCode::Up => *selected = selected.saturating_sub(1),
                KeyCode::Down => {
                    if *selected + 1 < voices.len() {
                        *selected += 1;
                    }
                }
                KeyCode::Enter => {
                    let choice = voices.get(*selected).map(|v| v.name.clone());
                    self.mode = Mode::Normal;
                    if let Some(name) = choice {
                        self.run_command(Command::SelectVoice(name)).await;
                    }
                }
                _ => {}
            },
        }
    }

    async fn on_normal_key(&mut self, code: KeyCode) {
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit = true;
                return;
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if self.input.trim().is_empty() {
                    self.mode = Mode::Source;
                    return;
                }
                let source = std::mem::take(&mut self.input);
                Command::Summarize(source.trim().to_string())
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                return;
            }
            KeyCode::Char('v') => {
                let voices = self.controller.voices();
                if voices.is_empty() {
                    self.notice = Some(Notice::Alert("No voices available".to_string()));
                } else {
                    let selected = self
                        .controller
                        .voice()
                        .and_then(|name| voices.iter().position(|v| v.name == name || v.lang == name))
                        .unwrap_or(0);
                    self.mode = Mode::Voices { voices, selected };
                }
                return;
            }
            KeyCode::Char('r') => Command::ReadAloud,
            KeyCode::Char('p') => Command::Pause,
            KeyCode::Char('u') => Command::Resume,
            KeyCode::Char('f') => Command::FastForward,
            KeyCode::Char('s') => Command::Stop,
            KeyCode::Char('d') => Command::Download,
            _ => return,
        };
        self.run_command(command).await;
    }
}

/// Run the TUI until the user quits. `source` pre-fills the prompt and is
/// summarized right away.
pub async fn run<E: SpeechEngine>(
    controller: Controller<E>,
    source: Option<String>,
) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, App::new(controller, source)).await;
    ratatui::restore();
    result
}

async fn event_loop<E: SpeechEngine>(
    terminal: &mut DefaultTerminal,
    mut app: App<E>,
) -> std::io::Result<()> {
    if !app.input.is_empty() {
        terminal.draw(|frame| components::draw(frame, &app))?;
        let source = std::mem::take(&mut app.input);
        app.run_command(Command::Summarize(source)).await;
    }

    while !app.quit {
        app.controller.poll();
        terminal.draw(|frame| components::draw(frame, &app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    debug!(code = ?key.code, "key");
                    app.on_key(key).await;
                }
            }
        }
    }

    // leave nothing speaking behind
    if app.controller.is_enabled(&Command::Stop) {
        let _ = app.controller.dispatch(Command::Stop).await;
    }
    Ok(())
}
