//! Speech readout
//!
//! Best-effort text-to-speech. Starting an utterance cancels the one in
//! progress.

use serde::{Deserialize, Serialize};

/// Speech error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech synthesis not supported")]
    Unsupported,

    #[error("Speech synthesis failed: {0}")]
    Failed(String),
}

/// Voice used for readouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            lang: "es-CO".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl VoiceSettings {
    pub fn utterance(&self, text: impl Into<String>) -> Utterance {
        Utterance {
            text: text.into(),
            lang: self.lang.clone(),
            rate: self.rate,
            pitch: self.pitch,
        }
    }
}

/// One thing to say
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Text-to-speech backend
pub trait SpeechCollaborator {
    /// Cancel whatever is being said and start `utterance`
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;
}

impl<T: SpeechCollaborator + ?Sized> SpeechCollaborator for Box<T> {
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        (**self).speak(utterance)
    }
}

/// Backend for hosts without speech synthesis
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeech;

impl SpeechCollaborator for NoSpeech {
    fn speak(&mut self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Backend that writes utterances to the log and keeps a transcript
#[derive(Debug, Default)]
pub struct Transcript {
    current: Option<Utterance>,
    history: Vec<Utterance>,
    cancelled: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Utterance currently being spoken
    pub fn current(&self) -> Option<&Utterance> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[Utterance] {
        &self.history
    }

    /// Number of utterances cut short by a newer one
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl SpeechCollaborator for Transcript {
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        if self.current.take().is_some() {
            self.cancelled += 1;
        }
        tracing::info!(lang = %utterance.lang, "Speaking: {}", utterance.text);
        self.history.push(utterance.clone());
        self.current = Some(utterance);
        Ok(())
    }
}
