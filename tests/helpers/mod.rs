#![allow(dead_code)]

use dtw_align_rs::{RawAudio, TimelineEntry, TimelineEntryKind};

pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Constant-frequency sine at half amplitude.
pub fn sine_audio(frequency_hz: f64, duration_seconds: f64) -> RawAudio {
    let sample_count = (duration_seconds * SAMPLE_RATE_HZ as f64).round() as usize;
    let samples = (0..sample_count)
        .map(|n| {
            let t = n as f64 / SAMPLE_RATE_HZ as f64;
            (0.5 * (2.0 * std::f64::consts::PI * frequency_hz * t).sin()) as f32
        })
        .collect();
    RawAudio::mono(samples, SAMPLE_RATE_HZ)
}

/// Concatenated constant-frequency segments of equal duration. Time-varying
/// content keeps the warp path well determined, unlike a stationary tone.
pub fn tone_sequence_audio(frequencies: &[f64], segment_duration_seconds: f64) -> RawAudio {
    let segment_samples = (segment_duration_seconds * SAMPLE_RATE_HZ as f64).round() as usize;
    let mut samples = Vec::with_capacity(frequencies.len() * segment_samples);
    for &frequency_hz in frequencies {
        for n in 0..segment_samples {
            let t = n as f64 / SAMPLE_RATE_HZ as f64;
            samples.push((0.5 * (2.0 * std::f64::consts::PI * frequency_hz * t).sin()) as f32);
        }
    }
    RawAudio::mono(samples, SAMPLE_RATE_HZ)
}

pub fn word(text: &str, start_time: f64, end_time: f64) -> TimelineEntry {
    TimelineEntry::new(TimelineEntryKind::Word, text, start_time, end_time)
}

pub fn phone(text: &str, start_time: f64, end_time: f64) -> TimelineEntry {
    TimelineEntry::new(TimelineEntryKind::Phone, text, start_time, end_time)
}

/// Asserts the output-timeline invariants: intervals well-formed, siblings
/// sorted, children inside the parent.
pub fn assert_timeline_invariants(timeline: &[TimelineEntry]) {
    for window in timeline.windows(2) {
        assert!(
            window[1].start_time >= window[0].start_time,
            "siblings must be sorted by start time"
        );
    }
    for entry in timeline {
        assert!(
            entry.start_time <= entry.end_time,
            "entry '{}' has start {} > end {}",
            entry.text,
            entry.start_time,
            entry.end_time
        );
        for child in &entry.timeline {
            assert!(
                child.start_time >= entry.start_time - 1e-9
                    && child.end_time <= entry.end_time + 1e-9,
                "child '{}' escapes parent '{}'",
                child.text,
                entry.text
            );
        }
        assert_timeline_invariants(&entry.timeline);
    }
}

pub fn assert_time_close(actual: f64, expected: f64, tolerance: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{label}: expected {expected} +/- {tolerance}, got {actual}"
    );
}
