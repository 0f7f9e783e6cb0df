//! Projects a reference timeline through a compacted warp path onto the
//! source audio's time axis, trimming silence at interval boundaries.

use crate::audio::{
    get_ending_silent_sample_count, get_starting_silent_sample_count,
    DEFAULT_SILENCE_THRESHOLD_DB,
};
use crate::error::AlignmentError;
use crate::types::{RawAudio, TimelineEntry};

use super::path::{CompactedPath, MappedFrameKind};

pub(crate) fn map_timeline_through_path(
    timeline: &[TimelineEntry],
    compacted: &CompactedPath,
    frames_per_second: f64,
    source_audio: &RawAudio,
) -> Result<Vec<TimelineEntry>, AlignmentError> {
    let channel = source_audio
        .channels
        .first()
        .ok_or_else(|| AlignmentError::invalid_input("source audio has no channels"))?;
    if frames_per_second <= 0.0 {
        return Err(AlignmentError::invalid_input(
            "frames per second must be positive",
        ));
    }
    let samples_per_frame =
        ((source_audio.sample_rate_hz as f64 / frames_per_second) as usize).max(1);

    timeline
        .iter()
        .map(|entry| {
            map_entry(
                entry,
                compacted,
                frames_per_second,
                channel,
                source_audio.sample_rate_hz,
                samples_per_frame,
            )
        })
        .collect()
}

fn map_entry(
    entry: &TimelineEntry,
    compacted: &CompactedPath,
    frames_per_second: f64,
    channel: &[f32],
    sample_rate_hz: u32,
    samples_per_frame: usize,
) -> Result<TimelineEntry, AlignmentError> {
    if entry.start_time < 0.0 || entry.end_time < 0.0 {
        return Err(AlignmentError::invalid_input(format!(
            "timeline entry '{}' has a negative timestamp",
            entry.text
        )));
    }

    let start_frame = (entry.start_time * frames_per_second) as usize;
    let end_frame = (entry.end_time * frames_per_second) as usize;
    // Both endpoints map through `first`. The end's trailing footprint is
    // handled by the silence trim below; changing this to `last` would
    // require retuning the trim threshold.
    let mapped_start = compacted.map_frame(start_frame, MappedFrameKind::First);
    let mapped_end = compacted.map_frame(end_frame, MappedFrameKind::First);

    let mut sample_start = (mapped_start * samples_per_frame).min(channel.len());
    let mut sample_end = (mapped_end * samples_per_frame).min(channel.len());
    if sample_end < sample_start {
        sample_end = sample_start;
    }

    if sample_end > sample_start {
        let segment = &channel[sample_start..sample_end];
        let leading = get_starting_silent_sample_count(segment, DEFAULT_SILENCE_THRESHOLD_DB);
        let trailing = get_ending_silent_sample_count(segment, DEFAULT_SILENCE_THRESHOLD_DB);
        sample_start += leading;
        sample_end = sample_end.saturating_sub(trailing).max(sample_start);
    }

    let sample_rate = sample_rate_hz as f64;
    let children = entry
        .timeline
        .iter()
        .map(|child| {
            map_entry(
                child,
                compacted,
                frames_per_second,
                channel,
                sample_rate_hz,
                samples_per_frame,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TimelineEntry {
        kind: entry.kind.clone(),
        text: entry.text.clone(),
        start_time: sample_start as f64 / sample_rate,
        end_time: sample_end as f64 / sample_rate,
        timeline: children,
    })
}
