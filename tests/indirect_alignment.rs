mod helpers;

use dtw_align_rs::{
    align_phone_timelines, align_using_dtw_with_recognition, AlignmentError, Granularity,
    PhoneAlignmentMethod, RawAudio, SpeechSynthesizer, SynthesisOptions, SynthesisResult,
    TimelineEntry,
};
use helpers::{
    assert_time_close, assert_timeline_invariants, phone, tone_sequence_audio, word,
};

const WORD_FREQUENCIES: [f64; 3] = [400.0, 1000.0, 1600.0];
const WORD_DURATION_SECONDS: f64 = 0.5;

/// Synthesizer that renders each fragment as one constant-frequency tone
/// segment, with a single phone spanning the word.
struct ToneSynthesizer;

impl SpeechSynthesizer for ToneSynthesizer {
    fn synthesize_fragments(
        &self,
        fragments: &[String],
        _options: &SynthesisOptions,
    ) -> Result<SynthesisResult, AlignmentError> {
        let frequencies: Vec<f64> = (0..fragments.len())
            .map(|index| WORD_FREQUENCIES[index % WORD_FREQUENCIES.len()])
            .collect();
        let raw_audio = tone_sequence_audio(&frequencies, WORD_DURATION_SECONDS);
        let timeline = fragments
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let start_time = index as f64 * WORD_DURATION_SECONDS;
                let end_time = (index + 1) as f64 * WORD_DURATION_SECONDS;
                word(text, start_time, end_time)
                    .with_children(vec![phone(text, start_time, end_time)])
            })
            .collect();
        Ok(SynthesisResult {
            raw_audio,
            timeline,
            voice_name: "tone".to_string(),
        })
    }
}

/// Synthesizer that must not be reached.
struct UnreachableSynthesizer;

impl SpeechSynthesizer for UnreachableSynthesizer {
    fn synthesize_fragments(
        &self,
        _fragments: &[String],
        _options: &SynthesisOptions,
    ) -> Result<SynthesisResult, AlignmentError> {
        Err(AlignmentError::InvalidInput {
            message: "synthesizer should not be called".to_string(),
        })
    }
}

fn three_word_setup() -> (RawAudio, RawAudio, Vec<TimelineEntry>, Vec<TimelineEntry>) {
    let audio = tone_sequence_audio(&WORD_FREQUENCIES, WORD_DURATION_SECONDS);
    let timeline = vec![
        word("red", 0.0, 0.5),
        word("green", 0.5, 1.0),
        word("blue", 1.0, 1.5),
    ];
    (audio.clone(), audio, timeline.clone(), timeline)
}

#[test]
fn empty_recognition_falls_back_to_linear_rescale() {
    // 4 s source, 2 s reference: every timestamp scales by exactly 2.
    let source = tone_sequence_audio(&[500.0, 900.0, 1300.0, 1700.0], 1.0);
    let reference = tone_sequence_audio(&[500.0, 900.0, 1300.0, 1700.0], 0.5);
    let timeline = [word("x", 0.0, 1.0), word("y", 1.0, 2.0)];

    let aligned = align_using_dtw_with_recognition(
        &source,
        &reference,
        &timeline,
        &[],
        &[Granularity::Medium],
        &[4.0],
        &UnreachableSynthesizer,
        &SynthesisOptions::default(),
        PhoneAlignmentMethod::Interpolation,
    )
    .expect("fallback");

    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].start_time, 0.0);
    assert_eq!(aligned[0].end_time, 2.0);
    assert_eq!(aligned[1].start_time, 2.0);
    assert_eq!(aligned[1].end_time, 4.0);
}

#[test]
fn matching_recognition_recovers_the_reference_timeline() {
    let (source, reference, reference_timeline, recognition_timeline) = three_word_setup();

    let aligned = align_using_dtw_with_recognition(
        &source,
        &reference,
        &reference_timeline,
        &recognition_timeline,
        &[Granularity::Medium],
        &[2.0],
        &ToneSynthesizer,
        &SynthesisOptions::default(),
        PhoneAlignmentMethod::Interpolation,
    )
    .expect("align");

    assert_eq!(aligned.len(), 3);
    assert_timeline_invariants(&aligned);
    for (index, entry) in aligned.iter().enumerate() {
        let expected_start = index as f64 * WORD_DURATION_SECONDS;
        assert_time_close(entry.start_time, expected_start, 0.03, "word start");
        assert_time_close(
            entry.end_time,
            expected_start + WORD_DURATION_SECONDS,
            0.03,
            "word end",
        );
    }
}

#[test]
fn dtw_phone_method_matches_interpolation_on_identical_audio() {
    let (source, reference, reference_timeline, recognition_timeline) = three_word_setup();

    let aligned = align_using_dtw_with_recognition(
        &source,
        &reference,
        &reference_timeline,
        &recognition_timeline,
        &[Granularity::Medium],
        &[2.0],
        &ToneSynthesizer,
        &SynthesisOptions::default(),
        PhoneAlignmentMethod::Dtw,
    )
    .expect("align");

    assert_eq!(aligned.len(), 3);
    assert_timeline_invariants(&aligned);
    for (index, entry) in aligned.iter().enumerate() {
        let expected_start = index as f64 * WORD_DURATION_SECONDS;
        assert_time_close(entry.start_time, expected_start, 0.03, "word start");
        assert_time_close(
            entry.end_time,
            expected_start + WORD_DURATION_SECONDS,
            0.03,
            "word end",
        );
    }
}

#[test]
fn phone_sub_alignment_places_monotone_positive_phones() {
    // One word, three phones, each rendered as its own tone segment.
    let audio = tone_sequence_audio(&[500.0, 1400.0, 2600.0], 0.3);
    let word_timeline = vec![word("cat", 0.0, 0.9)];
    let reference_timeline = vec![word("cat", 0.0, 0.9).with_children(vec![
        phone("k", 0.0, 0.3),
        phone("ae", 0.3, 0.6),
        phone("t", 0.6, 0.9),
    ])];

    let aligned = align_phone_timelines(&audio, &word_timeline, &audio, &reference_timeline, 60.0)
        .expect("align");

    assert_eq!(aligned.len(), 1);
    assert_timeline_invariants(&aligned);
    let phones = &aligned[0].timeline;
    assert_eq!(phones.len(), 3);
    for pair in phones.windows(2) {
        assert!(pair[1].start_time >= pair[0].start_time, "phones must be monotone");
    }
    for entry in phones {
        assert!(
            entry.end_time > entry.start_time,
            "phone '{}' has no duration",
            entry.text
        );
        assert!(entry.start_time >= 0.0 && entry.end_time <= 0.9 + 1e-9);
    }
    assert_time_close(phones[0].start_time, 0.0, 0.05, "k.start");
    assert_time_close(phones[1].start_time, 0.3, 0.05, "ae.start");
    assert_time_close(phones[2].start_time, 0.6, 0.05, "t.start");
}
