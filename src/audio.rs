use crate::error::AlignmentError;
use crate::types::RawAudio;

/// Default silence threshold for interval trimming, in dBFS.
pub const DEFAULT_SILENCE_THRESHOLD_DB: f32 = -40.0;

/// Analysis frame length used by the silence detectors.
const SILENCE_ANALYSIS_FRAME_MS: f64 = 10.0;

pub const ALIGNMENT_SAMPLE_RATE_HZ: u32 = 16_000;

pub fn get_raw_audio_duration(audio: &RawAudio) -> f64 {
    audio.duration_seconds()
}

/// Number of leading samples whose analysis frames stay below the threshold.
///
/// Counting stops at the first frame whose RMS reaches the threshold, so the
/// result is a multiple of the analysis frame length (except at the buffer
/// end).
pub fn get_starting_silent_sample_count(samples: &[f32], threshold_db: f32) -> usize {
    let frame_len = silence_frame_len(samples.len());
    let mut count = 0usize;
    for chunk in samples.chunks(frame_len) {
        if rms_dbfs(chunk) >= threshold_db {
            break;
        }
        count += chunk.len();
    }
    count
}

/// Number of trailing samples whose analysis frames stay below the threshold.
pub fn get_ending_silent_sample_count(samples: &[f32], threshold_db: f32) -> usize {
    let frame_len = silence_frame_len(samples.len());
    let mut count = 0usize;
    for chunk in samples.rchunks(frame_len) {
        if rms_dbfs(chunk) >= threshold_db {
            break;
        }
        count += chunk.len();
    }
    count
}

fn silence_frame_len(sample_count: usize) -> usize {
    // The detectors operate on bare sample slices, so the frame length is
    // derived from the alignment sample rate they are used with.
    let frame_len =
        (ALIGNMENT_SAMPLE_RATE_HZ as f64 * SILENCE_ANALYSIS_FRAME_MS / 1000.0) as usize;
    frame_len.clamp(1, sample_count.max(1))
}

fn rms_dbfs(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return f32::NEG_INFINITY;
    }
    let mean_sq =
        chunk.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>() / chunk.len() as f64;
    let rms = mean_sq.sqrt().max(1e-10);
    (20.0 * rms.log10()) as f32
}

/// Averages all channels into one and peak-normalizes the result to [-1, 1].
pub fn downmix_to_mono_and_normalize(audio: &RawAudio) -> Result<RawAudio, AlignmentError> {
    if audio.channels.is_empty() {
        return Err(AlignmentError::invalid_input("audio has no channels"));
    }
    let len = audio.sample_count();
    let channel_count = audio.channels.len() as f32;
    let mut mono = vec![0.0f32; len];
    for channel in &audio.channels {
        for (acc, &sample) in mono.iter_mut().zip(channel.iter()) {
            *acc += sample / channel_count;
        }
    }

    let peak = mono.iter().fold(0.0f32, |peak, &x| peak.max(x.abs()));
    if peak > 0.0 {
        let gain = 1.0 / peak;
        for sample in &mut mono {
            *sample *= gain;
        }
    }

    Ok(RawAudio::mono(mono, audio.sample_rate_hz))
}

/// Linear-interpolation resample to 16 kHz. Returns a clone when the input is
/// already at 16 kHz.
pub fn resample_to_16k(audio: &RawAudio) -> Result<RawAudio, AlignmentError> {
    if audio.sample_rate_hz == 0 {
        return Err(AlignmentError::invalid_input("audio sample rate is zero"));
    }
    if audio.channels.is_empty() {
        return Err(AlignmentError::invalid_input("audio has no channels"));
    }
    if audio.sample_rate_hz == ALIGNMENT_SAMPLE_RATE_HZ {
        return Ok(audio.clone());
    }

    let ratio = audio.sample_rate_hz as f64 / ALIGNMENT_SAMPLE_RATE_HZ as f64;
    let out_len =
        (audio.sample_count() as f64 / ratio).round() as usize;
    let channels = audio
        .channels
        .iter()
        .map(|channel| resample_channel(channel, ratio, out_len))
        .collect();

    Ok(RawAudio {
        channels,
        sample_rate_hz: ALIGNMENT_SAMPLE_RATE_HZ,
    })
}

fn resample_channel(channel: &[f32], ratio: f64, out_len: usize) -> Vec<f32> {
    if channel.is_empty() {
        return Vec::new();
    }
    let last = channel.len() - 1;
    (0..out_len)
        .map(|n| {
            let position = n as f64 * ratio;
            let index = (position as usize).min(last);
            let next = (index + 1).min(last);
            let fraction = (position - index as f64) as f32;
            channel[index] * (1.0 - fraction) + channel[next] * fraction
        })
        .collect()
}
