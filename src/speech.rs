//! Speech synthesis backends.
//!
//! The engine is an external collaborator: it takes utterances and plays them,
//! and can be paused, resumed and cancelled. It reports nothing back beyond
//! whether it is still speaking.

use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SpeechConfig;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("failed to run speech program '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to signal speech process: {0}")]
    SignalError(String),
    #[error("pausing speech is not supported on this platform")]
    Unsupported,
}

/// A voice offered by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.lang)
    }
}

/// Text to speak with the voice and rate to speak it at
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` means the engine's default voice
    pub voice: Option<String>,
    pub rate: f32,
}

/// A speech synthesis engine
pub trait SpeechEngine {
    /// Voices available to the engine
    fn voices(&mut self) -> Vec<Voice>;

    /// Start speaking an utterance
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;

    fn pause(&mut self) -> Result<(), SpeechError>;

    fn resume(&mut self) -> Result<(), SpeechError>;

    /// Stop the current utterance, if any
    fn cancel(&mut self) -> Result<(), SpeechError>;

    /// Whether an utterance is still playing (or paused)
    fn is_active(&mut self) -> bool;
}

/// Speech engine driving an `espeak-ng` compatible program.
///
/// Each utterance runs as a child process; pause and resume stop and continue
/// that process.
pub struct CommandEngine {
    program: String,
    base_wpm: u32,
    child: Option<Child>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, base_wpm: u32) -> Self {
        Self {
            program: program.into(),
            base_wpm,
            child: None,
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(config.program.clone(), config.base_wpm)
    }

    /// Words per minute for a playback rate
    pub fn words_per_minute(&self, rate: f32) -> u32 {
        (self.base_wpm as f32 * rate).round().max(1.0) as u32
    }

    fn args(&self, utterance: &Utterance) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(voice) = &utterance.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push("-s".to_string());
        args.push(self.words_per_minute(utterance.rate).to_string());
        args.push("--".to_string());
        args.push(utterance.text.clone());
        args
    }

    #[cfg(unix)]
    fn signal(&self, signal: nix::sys::signal::Signal) -> Result<(), SpeechError> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let Some(child) = &self.child else {
            return Ok(());
        };
        kill(Pid::from_raw(child.id() as i32), signal)
            .map_err(|e| SpeechError::SignalError(e.to_string()))
    }
}

impl SpeechEngine for CommandEngine {
    fn voices(&mut self) -> Vec<Voice> {
        match Command::new(&self.program).arg("--voices").output() {
            Ok(output) => parse_voice_list(&String::from_utf8_lossy(&output.stdout)),
            Err(e) => {
                debug!(program = %self.program, error = %e, "could not list voices");
                Vec::new()
            }
        }
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        info!(
            voice = utterance.voice.as_deref().unwrap_or("default"),
            rate = utterance.rate,
            chars = utterance.text.len(),
            "speaking"
        );
        let child = Command::new(&self.program)
            .args(self.args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::SpawnError {
                program: self.program.clone(),
                source,
            })?;
        self.child = Some(child);
        Ok(())
    }

    #[cfg(unix)]
    fn pause(&mut self) -> Result<(), SpeechError> {
        self.signal(nix::sys::signal::Signal::SIGSTOP)
    }

    #[cfg(not(unix))]
    fn pause(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    #[cfg(unix)]
    fn resume(&mut self) -> Result<(), SpeechError> {
        self.signal(nix::sys::signal::Signal::SIGCONT)
    }

    #[cfg(not(unix))]
    fn resume(&mut self) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn cancel(&mut self) -> Result<(), SpeechError> {
        if let Some(mut child) = self.child.take() {
            // a stopped process still dies on SIGKILL
            if let Err(e) = child.kill() {
                debug!(error = %e, "speech process already exited");
            }
            let _ = child.wait();
        }
        Ok(())
    }

    fn is_active(&mut self) -> bool {
        match self.child.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for CommandEngine {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other Languages`.
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_, lang, _, name, ..] => Some(Voice {
                    name: name.to_string(),
                    lang: lang.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}
