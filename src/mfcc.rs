//! MFCC feature frontend.
//!
//! Converts one PCM channel into a sequence of equal-length cepstral feature
//! vectors. Frame `i` starts at sample `i * hopLength` and the tail is
//! zero-padded, so frame `i` corresponds to time `i * hopDuration` exactly
//! and `frameCount = ceil(sampleCount / hopLength)`.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::config::MfccOptions;
use crate::error::AlignmentError;
use crate::types::RawAudio;

const LOG_ENERGY_FLOOR: f32 = 1e-10;

/// Computes MFCC vectors for channel 0 of `audio`.
pub fn compute_mfccs(
    audio: &RawAudio,
    options: &MfccOptions,
) -> Result<Vec<Vec<f32>>, AlignmentError> {
    let channel = audio
        .channels
        .first()
        .ok_or_else(|| AlignmentError::invalid_input("audio has no channels"))?;
    if channel.is_empty() {
        return Err(AlignmentError::invalid_input("audio is empty"));
    }
    if audio.sample_rate_hz == 0 {
        return Err(AlignmentError::invalid_input("audio sample rate is zero"));
    }
    if options.cepstral_coefficient_count == 0
        || options.cepstral_coefficient_count > options.mel_filterbank_count
    {
        return Err(AlignmentError::invalid_input(format!(
            "cepstral coefficient count {} must be in 1..={}",
            options.cepstral_coefficient_count, options.mel_filterbank_count
        )));
    }

    let sample_rate = audio.sample_rate_hz as f64;
    let window_len = ((options.window_duration * sample_rate).round() as usize).max(1);
    let hop_len = ((options.hop_duration * sample_rate).round() as usize).max(1);
    let fft_len = options
        .fft_order
        .max(window_len.next_power_of_two())
        .max(2);
    let bin_count = fft_len / 2 + 1;

    let window = hamming_window(window_len);
    let filterbank = mel_filterbank(
        options.mel_filterbank_count,
        bin_count,
        fft_len,
        sample_rate,
        options.low_frequency_hz,
        options.high_frequency_hz.min(sample_rate / 2.0),
    );
    let dct = dct_matrix(options.cepstral_coefficient_count, options.mel_filterbank_count);

    let emphasized = pre_emphasize(channel, options.pre_emphasis as f32);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_len);

    let frame_count = emphasized.len().div_ceil(hop_len);
    let mut frames = Vec::with_capacity(frame_count);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_len];
    let mut power = vec![0.0f32; bin_count];
    let mut log_mel = vec![0.0f32; options.mel_filterbank_count];

    for frame_index in 0..frame_count {
        let start = frame_index * hop_len;
        for (k, slot) in buffer.iter_mut().enumerate() {
            let sample = if k < window_len {
                emphasized.get(start + k).copied().unwrap_or(0.0) * window[k]
            } else {
                0.0
            };
            *slot = Complex::new(sample, 0.0);
        }
        fft.process(&mut buffer);

        for (bin, value) in power.iter_mut().enumerate() {
            *value = buffer[bin].norm_sqr() / fft_len as f32;
        }

        for (filter, out) in filterbank.iter().zip(log_mel.iter_mut()) {
            let energy: f32 = filter
                .iter()
                .zip(power.iter())
                .map(|(&weight, &p)| weight * p)
                .sum();
            *out = energy.max(LOG_ENERGY_FLOOR).ln();
        }

        let mut coefficients = vec![0.0f32; options.cepstral_coefficient_count];
        for (k, coefficient) in coefficients.iter_mut().enumerate() {
            *coefficient = dct[k]
                .iter()
                .zip(log_mel.iter())
                .map(|(&basis, &value)| basis * value)
                .sum();
        }
        if options.zero_first_coefficient {
            coefficients[0] = 0.0;
        }
        frames.push(coefficients);
    }

    Ok(frames)
}

fn pre_emphasize(samples: &[f32], factor: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    out.push(samples[0]);
    for n in 1..samples.len() {
        out.push(samples[n] - factor * samples[n - 1]);
    }
    out
}

fn hamming_window(len: usize) -> Vec<f32> {
    if len == 1 {
        return vec![1.0];
    }
    (0..len)
        .map(|n| {
            let phase = 2.0 * std::f64::consts::PI * n as f64 / (len - 1) as f64;
            (0.54 - 0.46 * phase.cos()) as f32
        })
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank as a dense `filter_count x bin_count` matrix.
fn mel_filterbank(
    filter_count: usize,
    bin_count: usize,
    fft_len: usize,
    sample_rate: f64,
    low_frequency_hz: f64,
    high_frequency_hz: f64,
) -> Vec<Vec<f32>> {
    let low_mel = hz_to_mel(low_frequency_hz);
    let high_mel = hz_to_mel(high_frequency_hz.max(low_frequency_hz + 1.0));
    let edges: Vec<f64> = (0..filter_count + 2)
        .map(|m| mel_to_hz(low_mel + (high_mel - low_mel) * m as f64 / (filter_count + 1) as f64))
        .collect();
    let bin_hz = sample_rate / fft_len as f64;

    (0..filter_count)
        .map(|m| {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            (0..bin_count)
                .map(|bin| {
                    let hz = bin as f64 * bin_hz;
                    let weight = if hz <= center {
                        (hz - left) / (center - left).max(f64::EPSILON)
                    } else {
                        (right - hz) / (right - center).max(f64::EPSILON)
                    };
                    weight.clamp(0.0, 1.0) as f32
                })
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II basis, `coefficient_count x input_count`.
fn dct_matrix(coefficient_count: usize, input_count: usize) -> Vec<Vec<f32>> {
    let n = input_count as f64;
    (0..coefficient_count)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            (0..input_count)
                .map(|i| {
                    let angle = std::f64::consts::PI * k as f64 * (i as f64 + 0.5) / n;
                    (scale * angle.cos()) as f32
                })
                .collect()
        })
        .collect()
}
