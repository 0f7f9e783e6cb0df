//! Recognition-assisted (indirect) alignment.
//!
//! When the source audio does not match the reference transcript verbatim, a
//! recognizer's timeline of what was actually said bridges the gap: the
//! recognized words are synthesized, the reference is aligned to that
//! synthesized audio, and the resulting timestamps are carried over to the
//! recognized axis through an anchor table.

use crate::audio::get_raw_audio_duration;
use crate::config::{Granularity, PhoneAlignmentMethod};
use crate::error::AlignmentError;
use crate::pipeline::traits::{SpeechSynthesizer, SynthesisOptions};
use crate::types::{flatten_to_word_timeline, RawAudio, TimelineEntry};

use super::multipass::align_using_dtw;
use super::phone::align_phone_timelines;

/// Band window for the per-word phone DTW, in seconds. Effectively unbounded
/// for single words.
const PHONE_DTW_WINDOW_SECONDS: f64 = 60.0;

/// Aligns `reference_timeline` onto `source_audio` through a recognition
/// timeline of what the source actually says.
///
/// An empty recognition timeline degenerates to a linear rescale of the
/// reference timeline by the duration ratio of the two recordings.
#[allow(clippy::too_many_arguments)]
pub fn align_using_dtw_with_recognition(
    source_audio: &RawAudio,
    reference_audio: &RawAudio,
    reference_timeline: &[TimelineEntry],
    recognition_timeline: &[TimelineEntry],
    granularities: &[Granularity],
    window_durations: &[f64],
    synthesizer: &dyn SpeechSynthesizer,
    synthesis_options: &SynthesisOptions,
    phone_alignment_method: PhoneAlignmentMethod,
) -> Result<Vec<TimelineEntry>, AlignmentError> {
    if recognition_timeline.is_empty() {
        let ratio = safe_ratio(
            get_raw_audio_duration(source_audio),
            get_raw_audio_duration(reference_audio),
        );
        tracing::debug!(
            ratio,
            "recognition timeline is empty; rescaling the reference timeline linearly"
        );
        return Ok(scale_timeline(reference_timeline, ratio));
    }

    let recognized_words = flatten_to_word_timeline(recognition_timeline);
    let fragments: Vec<String> = recognized_words
        .iter()
        .map(|word| word.text.clone())
        .collect();
    let synthesis = synthesizer.synthesize_fragments(&fragments, synthesis_options)?;
    let synthesized_words = flatten_to_word_timeline(&synthesis.timeline);

    let recognized_with_phones = match phone_alignment_method {
        PhoneAlignmentMethod::Interpolation => {
            interpolate_phone_timelines(&recognized_words, &synthesized_words)
        }
        PhoneAlignmentMethod::Dtw => align_phone_timelines(
            source_audio,
            &recognized_words,
            &synthesis.raw_audio,
            &synthesized_words,
            PHONE_DTW_WINDOW_SECONDS,
        )?,
    };

    let anchors = build_anchor_table(&synthesized_words, &recognized_with_phones);

    // Aligning the reference against the synthesized recording yields
    // reference timestamps on the synthesized axis.
    let reference_on_synthesized = align_using_dtw(
        &synthesis.raw_audio,
        reference_audio,
        reference_timeline,
        granularities,
        window_durations,
    )?;

    let mut cursor = AnchorCursor::new(&anchors);
    Ok(reference_on_synthesized
        .iter()
        .map(|entry| project_entry(entry, &mut cursor))
        .collect())
}

/// Attaches the reference words' phones to the source words by linear
/// scaling: each phone's offset within its reference word is stretched by the
/// ratio of the word durations.
///
/// Words are paired in order; a zero-length reference word yields zero
/// offsets (all phones collapse onto the source word start), never NaN.
pub fn interpolate_phone_timelines(
    source_timeline: &[TimelineEntry],
    reference_timeline: &[TimelineEntry],
) -> Vec<TimelineEntry> {
    source_timeline
        .iter()
        .zip(reference_timeline.iter())
        .map(|(source_word, reference_word)| {
            let ratio = safe_ratio(source_word.duration(), reference_word.duration());
            let phones = reference_word
                .timeline
                .iter()
                .map(|phone| {
                    let start_offset = (phone.start_time - reference_word.start_time) * ratio;
                    let end_offset = (phone.end_time - reference_word.start_time) * ratio;
                    TimelineEntry {
                        kind: phone.kind.clone(),
                        text: phone.text.clone(),
                        start_time: source_word.start_time + start_offset,
                        end_time: source_word.start_time + end_offset.max(start_offset),
                        timeline: Vec::new(),
                    }
                })
                .collect();
            TimelineEntry {
                kind: source_word.kind.clone(),
                text: source_word.text.clone(),
                start_time: source_word.start_time,
                end_time: source_word.end_time,
                timeline: phones,
            }
        })
        .collect()
}

/// Linearly rescales every timestamp in the timeline by `ratio`.
pub(crate) fn scale_timeline(timeline: &[TimelineEntry], ratio: f64) -> Vec<TimelineEntry> {
    timeline
        .iter()
        .map(|entry| TimelineEntry {
            kind: entry.kind.clone(),
            text: entry.text.clone(),
            start_time: entry.start_time * ratio,
            end_time: entry.end_time * ratio,
            timeline: scale_timeline(&entry.timeline, ratio),
        })
        .collect()
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// One synchronized time pair between the synthesized and recognized axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TimeAnchor {
    pub synthesized: f64,
    pub recognized: f64,
}

/// Anchors at every word boundary and phone boundary, monotone nondecreasing
/// on both axes.
pub(crate) fn build_anchor_table(
    synthesized_words: &[TimelineEntry],
    recognized_words: &[TimelineEntry],
) -> Vec<TimeAnchor> {
    let mut anchors = Vec::new();
    for (synthesized, recognized) in synthesized_words.iter().zip(recognized_words.iter()) {
        push_anchor(&mut anchors, synthesized.start_time, recognized.start_time);
        for (synthesized_phone, recognized_phone) in
            synthesized.timeline.iter().zip(recognized.timeline.iter())
        {
            push_anchor(
                &mut anchors,
                synthesized_phone.start_time,
                recognized_phone.start_time,
            );
            push_anchor(
                &mut anchors,
                synthesized_phone.end_time,
                recognized_phone.end_time,
            );
        }
        push_anchor(&mut anchors, synthesized.end_time, recognized.end_time);
    }
    anchors
}

fn push_anchor(anchors: &mut Vec<TimeAnchor>, synthesized: f64, recognized: f64) {
    let anchor = match anchors.last() {
        Some(last) => TimeAnchor {
            synthesized: synthesized.max(last.synthesized),
            recognized: recognized.max(last.recognized),
        },
        None => TimeAnchor {
            synthesized,
            recognized,
        },
    };
    anchors.push(anchor);
}

/// Forward-only lookup into the anchor table.
///
/// One cursor serves one pre-order timeline traversal; queries must be
/// monotone nondecreasing, and the cursor never moves backward.
pub(crate) struct AnchorCursor<'a> {
    anchors: &'a [TimeAnchor],
    index: usize,
}

impl<'a> AnchorCursor<'a> {
    pub fn new(anchors: &'a [TimeAnchor]) -> Self {
        Self { anchors, index: 0 }
    }

    /// Maps a synthesized-axis time to the recognized axis by nearest-anchor
    /// projection. An exact midpoint between two anchors resolves to the
    /// left one.
    pub fn map(&mut self, synthesized_time: f64) -> f64 {
        if self.anchors.is_empty() {
            return synthesized_time;
        }
        while self.index + 1 < self.anchors.len()
            && self.anchors[self.index + 1].synthesized < synthesized_time
        {
            self.index += 1;
        }
        let left = self.anchors[self.index];
        if synthesized_time <= left.synthesized || self.index + 1 >= self.anchors.len() {
            return left.recognized;
        }
        let right = self.anchors[self.index + 1];
        if synthesized_time - left.synthesized <= right.synthesized - synthesized_time {
            left.recognized
        } else {
            right.recognized
        }
    }
}

fn project_entry(entry: &TimelineEntry, cursor: &mut AnchorCursor<'_>) -> TimelineEntry {
    let start_time = cursor.map(entry.start_time);
    let timeline = entry
        .timeline
        .iter()
        .map(|child| project_entry(child, cursor))
        .collect();
    let end_time = cursor.map(entry.end_time).max(start_time);
    TimelineEntry {
        kind: entry.kind.clone(),
        text: entry.text.clone(),
        start_time,
        end_time,
        timeline,
    }
}
