//! Multi-pass alignment driver.
//!
//! Coarse passes cheaply locate the global alignment corridor; fine passes
//! refine inside a narrow band centered on it, so the fine passes stay linear
//! in audio length instead of quadratic.

use crate::audio::get_raw_audio_duration;
use crate::config::Granularity;
use crate::error::AlignmentError;
use crate::mfcc::compute_mfccs;
use crate::types::{RawAudio, TimelineEntry};

use super::dtw::{align_mfcc_dtw, estimate_banded_matrix_bytes};
use super::path::CompactedPath;
use super::timeline_map::map_timeline_through_path;

/// Warp `reference_timeline` onto `source_audio` through one DTW pass per
/// granularity/window pair.
///
/// `granularities` and `window_durations` (seconds) must have equal, nonzero
/// length; passes run in order, each seeding its band from the previous
/// pass's compacted path.
pub fn align_using_dtw(
    source_audio: &RawAudio,
    reference_audio: &RawAudio,
    reference_timeline: &[TimelineEntry],
    granularities: &[Granularity],
    window_durations: &[f64],
) -> Result<Vec<TimelineEntry>, AlignmentError> {
    if granularities.is_empty() {
        return Err(AlignmentError::invalid_input(
            "at least one alignment pass is required",
        ));
    }
    if granularities.len() != window_durations.len() {
        return Err(AlignmentError::invalid_input(format!(
            "granularity count {} does not match window duration count {}",
            granularities.len(),
            window_durations.len()
        )));
    }
    if let Some(&bad) = window_durations.iter().find(|&&w| !(w > 0.0)) {
        return Err(AlignmentError::invalid_input(format!(
            "window durations must be positive, got {bad}"
        )));
    }

    let source_duration = get_raw_audio_duration(source_audio);
    let mut compacted = CompactedPath::default();
    let mut previous_source_frames = 0usize;
    let mut frames_per_second = 0.0f64;

    for (pass, (&granularity, &window_duration)) in granularities
        .iter()
        .zip(window_durations.iter())
        .enumerate()
    {
        let mut mfcc_options = granularity.mfcc_options();
        // Energy invariance: loudness differences between the recordings must
        // not steer the warp.
        mfcc_options.zero_first_coefficient = true;

        let reference_mfccs = compute_mfccs(reference_audio, &mfcc_options)?;
        let source_mfccs = compute_mfccs(source_audio, &mfcc_options)?;
        frames_per_second = mfcc_options.frames_per_second();

        let half_width = ((window_duration * frames_per_second) as usize).max(1);

        if pass == 0 && window_duration < 0.2 * source_duration {
            tracing::warn!(
                window_duration,
                source_duration,
                "alignment window is narrower than 20% of the source duration; \
                 the warp path may not reach the true alignment"
            );
        }

        let centers = if pass == 0 {
            None
        } else {
            Some(resample_centers(
                &compacted,
                previous_source_frames,
                reference_mfccs.len(),
                source_mfccs.len(),
            ))
        };

        tracing::debug!(
            pass,
            granularity = %granularity,
            reference_frames = reference_mfccs.len(),
            source_frames = source_mfccs.len(),
            half_width,
            estimated_matrix_bytes =
                estimate_banded_matrix_bytes(reference_mfccs.len(), source_mfccs.len(), half_width),
            "running DTW pass"
        );

        let path = align_mfcc_dtw(
            &reference_mfccs,
            &source_mfccs,
            half_width,
            centers.as_deref(),
        )?;
        compacted = CompactedPath::from_path(&path);
        previous_source_frames = source_mfccs.len();
    }

    map_timeline_through_path(
        reference_timeline,
        &compacted,
        frames_per_second,
        source_audio,
    )
}

/// Re-samples the previous pass's center curve to the new pass's resolution
/// on both axes.
///
/// Centers are carried as fractions of the previous source axis, then scaled
/// onto the new one; the reference axis is walked with an index re-map.
fn resample_centers(
    previous: &CompactedPath,
    previous_source_frames: usize,
    new_reference_frames: usize,
    new_source_frames: usize,
) -> Vec<usize> {
    let entries = previous.entries();
    if entries.is_empty() || previous_source_frames == 0 || new_source_frames == 0 {
        return vec![0; new_reference_frames];
    }

    let relative_centers: Vec<f64> = entries
        .iter()
        .map(|entry| (entry.first + entry.last) as f64 / 2.0 / previous_source_frames as f64)
        .collect();

    (0..new_reference_frames)
        .map(|i| {
            let k = i * relative_centers.len() / new_reference_frames;
            let center = (relative_centers[k] * new_source_frames as f64) as usize;
            center.min(new_source_frames - 1)
        })
        .collect()
}
