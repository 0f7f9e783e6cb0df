//! Per-word phone sub-alignment.
//!
//! For each aligned word, a small bounded DTW between the source audio slice
//! and the reference (synthesized) word places the reference phones inside
//! the aligned word interval.

use crate::config::Granularity;
use crate::error::AlignmentError;
use crate::mfcc::compute_mfccs;
use crate::types::{RawAudio, TimelineEntry};

use super::dtw::align_mfcc_dtw;
use super::path::{CompactedPath, MappedFrameKind};

/// Granularity of the word-slice features. Words are short, so the finer
/// hop buys boundary precision at negligible cost.
const PHONE_GRANULARITY: Granularity = Granularity::High;

/// Places each reference word's phones inside the corresponding source word
/// by DTW over the word's MFCC slices.
///
/// `source_word_timeline` and `reference_timeline` are word-level timelines;
/// words are paired in order. The returned timeline carries the source words
/// with phone children.
pub fn align_phone_timelines(
    source_audio: &RawAudio,
    source_word_timeline: &[TimelineEntry],
    reference_audio: &RawAudio,
    reference_timeline: &[TimelineEntry],
    window_duration_seconds: f64,
) -> Result<Vec<TimelineEntry>, AlignmentError> {
    let mut mfcc_options = PHONE_GRANULARITY.mfcc_options();
    mfcc_options.zero_first_coefficient = true;
    let source_mfccs = compute_mfccs(source_audio, &mfcc_options)?;
    let reference_mfccs = compute_mfccs(reference_audio, &mfcc_options)?;
    let frames_per_second = mfcc_options.frames_per_second();
    let half_width = ((window_duration_seconds * frames_per_second) as usize).max(1);

    source_word_timeline
        .iter()
        .zip(reference_timeline.iter())
        .map(|(source_word, reference_word)| {
            align_word_phones(
                source_word,
                reference_word,
                &source_mfccs,
                &reference_mfccs,
                frames_per_second,
                half_width,
            )
        })
        .collect()
}

fn align_word_phones(
    source_word: &TimelineEntry,
    reference_word: &TimelineEntry,
    source_mfccs: &[Vec<f32>],
    reference_mfccs: &[Vec<f32>],
    frames_per_second: f64,
    half_width: usize,
) -> Result<TimelineEntry, AlignmentError> {
    let mut mapped = TimelineEntry {
        kind: source_word.kind.clone(),
        text: source_word.text.clone(),
        start_time: source_word.start_time,
        end_time: source_word.end_time,
        timeline: Vec::new(),
    };
    if reference_word.timeline.is_empty() {
        return Ok(mapped);
    }

    let reference_slice = frame_slice(
        reference_mfccs,
        reference_word.start_time,
        reference_word.end_time,
        frames_per_second,
    );
    let source_slice = frame_slice(
        source_mfccs,
        source_word.start_time,
        source_word.end_time,
        frames_per_second,
    );

    let path = align_mfcc_dtw(reference_slice, source_slice, half_width, None)?;
    let compacted = CompactedPath::from_path(&path);

    let mut phones = Vec::with_capacity(reference_word.timeline.len());
    for phone in &reference_word.timeline {
        let start_offset = (phone.start_time - reference_word.start_time).max(0.0);
        let end_offset = (phone.end_time - reference_word.start_time).max(0.0);
        let start_frame = (start_offset * frames_per_second) as usize;
        let end_frame = (end_offset * frames_per_second) as usize;
        let mapped_start = compacted.map_frame(start_frame, MappedFrameKind::First);
        let mapped_end = compacted.map_frame(end_frame, MappedFrameKind::First);

        // Frame rounding may overshoot a word interval that is not
        // frame-aligned; keep phones inside the word.
        let word_end = source_word.end_time.max(source_word.start_time);
        let start_time =
            (source_word.start_time + mapped_start as f64 / frames_per_second).min(word_end);
        let end_time = (source_word.start_time + mapped_end as f64 / frames_per_second)
            .clamp(start_time, word_end);
        phones.push(TimelineEntry {
            kind: phone.kind.clone(),
            text: phone.text.clone(),
            start_time,
            end_time,
            timeline: Vec::new(),
        });
    }

    mapped.timeline = phones;
    Ok(mapped)
}

/// Whole-frame slice covering a time interval; an empty slice clamps to one
/// frame.
fn frame_slice(mfccs: &[Vec<f32>], start_time: f64, end_time: f64, frames_per_second: f64) -> &[Vec<f32>] {
    let last = mfccs.len().saturating_sub(1);
    let start = ((start_time.max(0.0) * frames_per_second) as usize).min(last);
    let mut end = ((end_time.max(0.0) * frames_per_second) as usize).min(mfccs.len());
    if end <= start {
        end = start + 1;
    }
    &mfccs[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimelineEntryKind;

    #[test]
    fn empty_interval_clamps_to_one_frame() {
        let mfccs: Vec<Vec<f32>> = (0..10).map(|k| vec![k as f32]).collect();
        let slice = frame_slice(&mfccs, 0.5, 0.5, 10.0);
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0][0], 5.0);
    }

    #[test]
    fn interval_past_the_end_clamps_into_range(){
        let mfccs: Vec<Vec<f32>> = (0..10).map(|k| vec![k as f32]).collect();
        let slice = frame_slice(&mfccs, 5.0, 9.0, 10.0);
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0][0], 9.0);
    }

    #[test]
    fn word_without_phones_passes_through() {
        let source_word = TimelineEntry::new(TimelineEntryKind::Word, "cat", 0.2, 0.8);
        let reference_word = TimelineEntry::new(TimelineEntryKind::Word, "cat", 0.0, 0.6);
        let mfccs: Vec<Vec<f32>> = (0..100).map(|k| vec![k as f32]).collect();
        let mapped =
            align_word_phones(&source_word, &reference_word, &mfccs, &mfccs, 100.0, 10)
                .expect("align");
        assert_eq!(mapped.text, "cat");
        assert!(mapped.timeline.is_empty());
    }
}
