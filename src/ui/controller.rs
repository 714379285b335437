//! Command controller behind the TUI.
//!
//! Holds everything one session needs: how to summarize, the speech engine,
//! the current summary with its playback session, and the active search
//! highlight. Front ends turn key presses into [`Command`]s and
//! show the returned [`Notice`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ExportConfig, SpeechConfig};
use crate::export::{self, ExportError};
use crate::playback::{Playback, PlaybackState};
use crate::remote::{RemoteError, RemoteSummarizer};
use crate::scraper::{self, ScraperError, WebContent};
use crate::search::{self, Highlighted};
use crate::speech::{SpeechEngine, SpeechError, Voice};
use crate::summary::{Summarizer, Summary};

/// Alert shown when the remote summarizer fails
pub const SUMMARIZE_FAILED: &str = "Failed to summarize this page.";

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("'{0}' is not available right now")]
    Disabled(&'static str),
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Everything a user can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Summarize a URL or file
    Summarize(String),
    ReadAloud,
    Pause,
    Resume,
    FastForward,
    Stop,
    /// Save the summary as plain text
    Download,
    Search(String),
    SelectVoice(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Summarize(_) => "summarize",
            Command::ReadAloud => "read aloud",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::FastForward => "fast forward",
            Command::Stop => "stop",
            Command::Download => "download",
            Command::Search(_) => "search",
            Command::SelectVoice(_) => "select voice",
        }
    }
}

/// Feedback for the user after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Alert(String),
}

/// Where summaries come from
pub enum Backend {
    Local { summarizer: Summarizer, rng: StdRng },
    Remote(RemoteSummarizer),
}

impl Backend {
    /// Local extractive summaries, seeded from config when a seed is set
    pub fn local(config: &Config) -> Self {
        let rng = match config.summary.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Backend::Local {
            summarizer: Summarizer::new(config.summary.min_words),
            rng,
        }
    }

    pub fn remote(config: &Config) -> Result<Self, RemoteError> {
        Ok(Backend::Remote(RemoteSummarizer::from_config(&config.remote)?))
    }

    async fn summarize(&mut self, content: &WebContent) -> Result<Summary, RemoteError> {
        match self {
            Backend::Local { summarizer, rng } => Ok(summarizer.summarize(&content.text, rng)),
            Backend::Remote(remote) => remote.summarize(&content.text).await,
        }
    }
}

struct Session<E: SpeechEngine> {
    summary: Summary,
    playback: Playback<E>,
}

pub struct Controller<E: SpeechEngine> {
    backend: Backend,
    engine: Option<E>,
    session: Option<Session<E>>,
    highlight: Option<Highlighted>,
    voice: Option<String>,
    speech: SpeechConfig,
    export: ExportConfig,
}

impl<E: SpeechEngine> Controller<E> {
    pub fn new(backend: Backend, engine: E, config: &Config) -> Self {
        Self {
            backend,
            engine: Some(engine),
            session: None,
            highlight: None,
            voice: config.speech.voice.clone(),
            speech: config.speech.clone(),
            export: config.export.clone(),
        }
    }

    /// Whether `command` can run in the current state. Summarizing is only
    /// possible once; everything except voice choice needs a summary.
    pub fn is_enabled(&self, command: &Command) -> bool {
        match command {
            Command::Summarize(_) => self.session.is_none(),
            Command::SelectVoice(_) => true,
            _ => self.session.is_some(),
        }
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Notice, ControllerError> {
        if !self.is_enabled(&command) {
            return Err(ControllerError::Disabled(command.name()));
        }

        match command {
            Command::Summarize(source) => self.summarize(&source).await,
            Command::SelectVoice(name) => {
                let notice = Notice::Info(format!("Voice set to {}", name));
                self.voice = Some(name);
                Ok(notice)
            }
            Command::ReadAloud => {
                let (text, voice) = self.speech_input();
                let session = self.session_mut()?;
                session.playback.read_aloud(&text, voice.as_deref())?;
                Ok(Notice::Info(format!(
                    "Reading aloud at {:.1}x",
                    session.playback.rate()
                )))
            }
            Command::FastForward => {
                let (text, voice) = self.speech_input();
                let rate = self.session_mut()?.playback.fast_forward(&text, voice.as_deref())?;
                Ok(Notice::Info(format!("Rate {:.1}x", rate)))
            }
            Command::Pause => {
                self.session_mut()?.playback.pause()?;
                Ok(Notice::Info("Paused".to_string()))
            }
            Command::Resume => {
                self.session_mut()?.playback.resume()?;
                Ok(Notice::Info("Resumed".to_string()))
            }
            Command::Stop => {
                self.session_mut()?.playback.stop()?;
                Ok(Notice::Info("Stopped".to_string()))
            }
            Command::Download => {
                let summary = self.current_summary()?;
                let path =
                    export::write_summary(&self.export.dir, &self.export.file_name, summary)?;
                Ok(Notice::Info(format!("Saved to {}", path.display())))
            }
            Command::Search(term) => {
                let highlighted = search::highlight(self.current_summary()?, &term);
                let notice = if highlighted.term.is_empty() {
                    Notice::Info("Search cleared".to_string())
                } else {
                    Notice::Info(format!(
                        "{} match(es) for '{}'",
                        highlighted.match_count(),
                        highlighted.term
                    ))
                };
                self.highlight = (!highlighted.term.is_empty()).then_some(highlighted);
                Ok(notice)
            }
        }
    }

    async fn summarize(&mut self, source: &str) -> Result<Notice, ControllerError> {
        let content = scraper::load(source).await?;
        let summary = match self.backend.summarize(&content).await {
            Ok(summary) => summary.with_title(content.title.clone()),
            Err(e) => {
                warn!(error = %e, source, "summarizer failed");
                return Ok(Notice::Alert(SUMMARIZE_FAILED.to_string()));
            }
        };
        info!(source, blocks = summary.blocks.len(), "summary ready");
        Ok(self.start_session(summary))
    }

    /// Replace the current summary and start a fresh playback session for it
    pub fn start_session(&mut self, summary: Summary) -> Notice {
        let engine = match self.session.take() {
            Some(old) => Some(old.playback.into_engine()),
            None => self.engine.take(),
        };
        let notice = Notice::Info(format!("Summary ready ({} sentences)", summary.blocks.len()));

        if let Some(engine) = engine {
            self.session = Some(Session {
                summary,
                playback: Playback::from_config(engine, &self.speech),
            });
        }
        self.highlight = None;
        notice
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.session.as_ref().map(|s| &s.summary)
    }

    pub fn highlight(&self) -> Option<&Highlighted> {
        self.highlight.as_ref()
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn voices(&mut self) -> Vec<Voice> {
        match (&mut self.session, &mut self.engine) {
            (Some(session), _) => session.playback.voices().to_vec(),
            (None, Some(engine)) => engine.voices(),
            (None, None) => Vec::new(),
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(|s| s.playback.state())
            .unwrap_or(PlaybackState::Idle)
    }

    pub fn rate(&self) -> f32 {
        self.session
            .as_ref()
            .map(|s| s.playback.rate())
            .unwrap_or(self.speech.rate)
    }

    /// Refresh playback state from the engine
    pub fn poll(&mut self) -> PlaybackState {
        match &mut self.session {
            Some(session) => session.playback.poll(),
            None => PlaybackState::Idle,
        }
    }

    pub fn export_path(&self) -> PathBuf {
        self.export.dir.join(&self.export.file_name)
    }

    fn speech_input(&self) -> (String, Option<String>) {
        let text = self.summary().map(Summary::plain_text).unwrap_or_default();
        (text, self.voice.clone())
    }

    fn current_summary(&self) -> Result<&Summary, ControllerError> {
        self.summary().ok_or(ControllerError::Disabled("no summary yet"))
    }

    fn session_mut(&mut self) -> Result<&mut Session<E>, ControllerError> {
        self.session
            .as_mut()
            .ok_or(ControllerError::Disabled("no summary yet"))
    }
}
