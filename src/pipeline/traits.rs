use crate::error::AlignmentError;
use crate::types::{RawAudio, TimelineEntry};

/// Options forwarded to the external text-to-speech engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisOptions {
    pub language: Option<String>,
    pub voice: Option<String>,
}

/// Audio and timing produced by the external text-to-speech engine.
///
/// The returned timeline may be clause-grouped; consumers flatten it to
/// word level with nested phone timings.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub raw_audio: RawAudio,
    pub timeline: Vec<TimelineEntry>,
    pub voice_name: String,
}

/// External text-to-speech collaborator.
///
/// Failures are surfaced to the caller unchanged; the core performs no
/// retries and holds no partial state.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize_fragments(
        &self,
        fragments: &[String],
        options: &SynthesisOptions,
    ) -> Result<SynthesisResult, AlignmentError>;
}
