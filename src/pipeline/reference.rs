use crate::audio::{downmix_to_mono_and_normalize, resample_to_16k};
use crate::error::AlignmentError;
use crate::pipeline::traits::{SpeechSynthesizer, SynthesisOptions};
use crate::types::{flatten_to_word_timeline, RawAudio, TimelineEntry};

/// A synthesized reference recording for a transcript: 16 kHz mono
/// normalized audio plus a word-level timeline.
#[derive(Debug, Clone)]
pub struct AlignmentReference {
    pub reference_audio: RawAudio,
    pub reference_timeline: Vec<TimelineEntry>,
    pub voice_name: String,
}

/// Synthesizes a reference recording for `transcript` and conditions it for
/// alignment (mono downmix, peak normalization, 16 kHz resample, word-level
/// timeline).
pub fn create_alignment_reference(
    synthesizer: &dyn SpeechSynthesizer,
    transcript: &str,
    language: &str,
    options: &SynthesisOptions,
) -> Result<AlignmentReference, AlignmentError> {
    let fragments: Vec<String> = transcript.split_whitespace().map(str::to_string).collect();
    if fragments.is_empty() {
        return Err(AlignmentError::invalid_input(
            "transcript contains no words",
        ));
    }

    let mut options = options.clone();
    if options.language.is_none() {
        options.language = Some(language.to_string());
    }

    let synthesis = synthesizer.synthesize_fragments(&fragments, &options)?;
    let mono = downmix_to_mono_and_normalize(&synthesis.raw_audio)?;
    let reference_audio = resample_to_16k(&mono)?;
    let reference_timeline = flatten_to_word_timeline(&synthesis.timeline);

    tracing::debug!(
        word_count = reference_timeline.len(),
        duration_seconds = reference_audio.duration_seconds(),
        voice = synthesis.voice_name.as_str(),
        "created alignment reference"
    );

    Ok(AlignmentReference {
        reference_audio,
        reference_timeline,
        voice_name: synthesis.voice_name,
    })
}
