use crate::alignment::indirect::align_using_dtw_with_recognition;
use crate::alignment::multipass::align_using_dtw;
use crate::config::{Granularity, PhoneAlignmentMethod};
use crate::error::AlignmentError;
use crate::pipeline::reference::{create_alignment_reference, AlignmentReference};
use crate::pipeline::traits::{SpeechSynthesizer, SynthesisOptions};
use crate::types::{RawAudio, TimelineEntry};

/// Configured alignment facade over the free-function core.
///
/// Holds the pass schedule and the optional synthesizer collaborator so
/// callers align repeatedly without re-validating options.
pub struct TimelineAligner {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    granularities: Vec<Granularity>,
    window_durations: Vec<f64>,
    phone_alignment_method: PhoneAlignmentMethod,
    synthesis_options: SynthesisOptions,
}

pub(crate) struct TimelineAlignerParts {
    pub synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    pub granularities: Vec<Granularity>,
    pub window_durations: Vec<f64>,
    pub phone_alignment_method: PhoneAlignmentMethod,
    pub synthesis_options: SynthesisOptions,
}

impl TimelineAligner {
    pub(crate) fn from_parts(parts: TimelineAlignerParts) -> Self {
        Self {
            synthesizer: parts.synthesizer,
            granularities: parts.granularities,
            window_durations: parts.window_durations,
            phone_alignment_method: parts.phone_alignment_method,
            synthesis_options: parts.synthesis_options,
        }
    }

    /// Warps `reference_timeline` onto `source_audio` with the configured
    /// pass schedule.
    pub fn align(
        &self,
        source_audio: &RawAudio,
        reference_audio: &RawAudio,
        reference_timeline: &[TimelineEntry],
    ) -> Result<Vec<TimelineEntry>, AlignmentError> {
        align_using_dtw(
            source_audio,
            reference_audio,
            reference_timeline,
            &self.granularities,
            &self.window_durations,
        )
    }

    /// Indirect alignment through a recognition timeline. Requires a
    /// synthesizer.
    pub fn align_with_recognition(
        &self,
        source_audio: &RawAudio,
        reference_audio: &RawAudio,
        reference_timeline: &[TimelineEntry],
        recognition_timeline: &[TimelineEntry],
    ) -> Result<Vec<TimelineEntry>, AlignmentError> {
        let synthesizer = self.require_synthesizer()?;
        align_using_dtw_with_recognition(
            source_audio,
            reference_audio,
            reference_timeline,
            recognition_timeline,
            &self.granularities,
            &self.window_durations,
            synthesizer,
            &self.synthesis_options,
            self.phone_alignment_method,
        )
    }

    /// Synthesizes an alignment reference for `transcript`. Requires a
    /// synthesizer.
    pub fn create_reference(
        &self,
        transcript: &str,
        language: &str,
    ) -> Result<AlignmentReference, AlignmentError> {
        let synthesizer = self.require_synthesizer()?;
        create_alignment_reference(synthesizer, transcript, language, &self.synthesis_options)
    }

    pub fn granularities(&self) -> &[Granularity] {
        &self.granularities
    }

    pub fn window_durations(&self) -> &[f64] {
        &self.window_durations
    }

    fn require_synthesizer(&self) -> Result<&dyn SpeechSynthesizer, AlignmentError> {
        self.synthesizer
            .as_deref()
            .ok_or_else(|| AlignmentError::invalid_input("no speech synthesizer configured"))
    }
}
