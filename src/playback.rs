//! Read-aloud session for one summary.
//!
//! Owns the playback rate and state. Changing the rate never touches an
//! utterance in flight: fast forward cancels it and starts over from the full
//! text at the new rate.

use tracing::debug;

use crate::config::SpeechConfig;
use crate::speech::{SpeechEngine, SpeechError, Utterance, Voice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Speaking => "speaking",
            PlaybackState::Paused => "paused",
        };
        f.write_str(label)
    }
}

pub struct Playback<E: SpeechEngine> {
    engine: E,
    state: PlaybackState,
    rate: f32,
    rate_step: f32,
    voices: Option<Vec<Voice>>,
}

impl<E: SpeechEngine> Playback<E> {
    pub fn new(engine: E, rate: f32, rate_step: f32) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            rate,
            rate_step,
            voices: None,
        }
    }

    pub fn from_config(engine: E, config: &SpeechConfig) -> Self {
        Self::new(engine, config.rate, config.rate_step)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Voices offered by the engine, listed once and cached
    pub fn voices(&mut self) -> &[Voice] {
        if self.voices.is_none() {
            self.voices = Some(self.engine.voices());
        }
        self.voices.as_deref().unwrap_or_default()
    }

    /// Speak `text` from the start at the current rate, replacing anything
    /// already playing
    pub fn read_aloud(&mut self, text: &str, voice: Option<&str>) -> Result<(), SpeechError> {
        self.engine.cancel()?;
        self.state = PlaybackState::Idle;

        let utterance = Utterance {
            text: text.to_string(),
            voice: self.resolve_voice(voice),
            rate: self.rate,
        };
        self.engine.speak(&utterance)?;
        self.state = PlaybackState::Speaking;
        Ok(())
    }

    /// Raise the rate by one step and restart `text` at the new rate.
    /// Returns the new rate.
    pub fn fast_forward(&mut self, text: &str, voice: Option<&str>) -> Result<f32, SpeechError> {
        self.rate += self.rate_step;
        debug!(rate = self.rate, "fast forward");
        self.read_aloud(text, voice)?;
        Ok(self.rate)
    }

    pub fn pause(&mut self) -> Result<(), SpeechError> {
        if self.state == PlaybackState::Speaking {
            self.engine.pause()?;
            self.state = PlaybackState::Paused;
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SpeechError> {
        if self.state == PlaybackState::Paused {
            self.engine.resume()?;
            self.state = PlaybackState::Speaking;
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), SpeechError> {
        self.engine.cancel()?;
        self.state = PlaybackState::Idle;
        Ok(())
    }

    /// Move to idle once the engine has finished speaking
    pub fn poll(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Speaking && !self.engine.is_active() {
            self.state = PlaybackState::Idle;
        }
        self.state
    }

    /// Stop playback and hand back the engine
    pub fn into_engine(mut self) -> E {
        if let Err(e) = self.engine.cancel() {
            debug!(error = %e, "cancel on session end failed");
        }
        self.engine
    }

    /// A voice is found by name or language code; anything else falls back
    /// to the engine default
    fn resolve_voice(&mut self, name: Option<&str>) -> Option<String> {
        let name = name?;
        let found = self
            .voices()
            .iter()
            .any(|voice| voice.name == name || voice.lang == name);
        if !found {
            debug!(voice = name, "voice not found, using default");
        }
        found.then(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::testing::{Call, RecordingEngine};

    fn playback() -> Playback<RecordingEngine> {
        Playback::new(RecordingEngine::with_voices(&["alice", "bob"]), 1.0, 0.5)
    }

    #[test]
    fn read_aloud_speaks_at_current_rate() {
        let mut playback = playback();
        playback.read_aloud("Hello.", Some("bob")).unwrap();

        assert_eq!(playback.state(), PlaybackState::Speaking);
        let engine = playback.into_engine();
        let spoken = engine.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].voice.as_deref(), Some("bob"));
        assert_eq!(spoken[0].rate, 1.0);
    }

    #[test]
    fn unknown_voice_falls_back_to_default() {
        let mut playback = playback();
        playback.read_aloud("Hello.", Some("carol")).unwrap();
        let engine = playback.into_engine();
        assert_eq!(engine.spoken()[0].voice, None);
    }

    #[test]
    fn language_code_selects_voice() {
        let mut playback = Playback::new(
            RecordingEngine {
                voices: vec![Voice {
                    name: "English_(Great_Britain)".to_string(),
                    lang: "en-gb".to_string(),
                }],
                ..RecordingEngine::default()
            },
            1.0,
            0.5,
        );
        playback.read_aloud("Hello.", Some("en-gb")).unwrap();
        let engine = playback.into_engine();
        assert_eq!(engine.spoken()[0].voice.as_deref(), Some("en-gb"));
    }

    #[test]
    fn fast_forward_twice_reaches_rate_two() {
        let mut playback = playback();
        playback.read_aloud("Text.", None).unwrap();
        assert_eq!(playback.fast_forward("Text.", None).unwrap(), 1.5);
        assert_eq!(playback.fast_forward("Text.", None).unwrap(), 2.0);
        assert_eq!(playback.rate(), 2.0);
        assert_eq!(playback.state(), PlaybackState::Speaking);
    }

    #[test]
    fn fast_forward_cancels_before_restart() {
        let mut playback = playback();
        playback.read_aloud("Text.", None).unwrap();
        playback.fast_forward("Text.", None).unwrap();

        let engine = playback.into_engine();
        let calls = &engine.calls;
        // cancel, speak, cancel, speak, then cancel from into_engine
        assert!(matches!(calls[0], Call::Cancel));
        assert!(matches!(calls[1], Call::Speak(_)));
        assert!(matches!(calls[2], Call::Cancel));
        match &calls[3] {
            Call::Speak(utterance) => {
                assert_eq!(utterance.rate, 1.5);
                assert_eq!(utterance.text, "Text.");
            }
            other => panic!("expected speak, got {:?}", other),
        }
    }

    #[test]
    fn pause_and_resume_follow_state() {
        let mut playback = playback();

        // nothing playing: both are no-ops
        playback.pause().unwrap();
        playback.resume().unwrap();
        assert_eq!(playback.state(), PlaybackState::Idle);

        playback.read_aloud("Text.", None).unwrap();
        playback.resume().unwrap();
        assert_eq!(playback.state(), PlaybackState::Speaking);

        playback.pause().unwrap();
        assert_eq!(playback.state(), PlaybackState::Paused);
        playback.resume().unwrap();
        assert_eq!(playback.state(), PlaybackState::Speaking);

        let engine = playback.into_engine();
        let signals: Vec<_> = engine
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Pause | Call::Resume))
            .collect();
        assert_eq!(signals, vec![&Call::Pause, &Call::Resume]);
    }

    #[test]
    fn new_utterance_replaces_paused_one() {
        let mut playback = playback();
        playback.read_aloud("First.", None).unwrap();
        playback.pause().unwrap();
        playback.read_aloud("Second.", None).unwrap();
        assert_eq!(playback.state(), PlaybackState::Speaking);
    }

    #[test]
    fn poll_detects_finished_utterance() {
        let mut playback = playback();
        playback.read_aloud("Text.", None).unwrap();
        assert_eq!(playback.poll(), PlaybackState::Speaking);

        playback.engine.active = false;
        assert_eq!(playback.poll(), PlaybackState::Idle);
    }
}
