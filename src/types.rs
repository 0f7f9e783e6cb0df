use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AlignmentError;

/// Multi-channel PCM recording held in memory.
///
/// Samples are 32-bit floats in [-1, 1]; all channels have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate_hz: u32,
}

impl RawAudio {
    pub fn mono(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate_hz,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.sample_count() as f64 / self.sample_rate_hz as f64
    }
}

/// Category tag of a timeline entry.
///
/// Known tags round-trip through their lowercase names; anything else is
/// preserved verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimelineEntryKind {
    Segment,
    Sentence,
    Word,
    Token,
    Phone,
    Custom(String),
}

impl TimelineEntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Segment => "segment",
            Self::Sentence => "sentence",
            Self::Word => "word",
            Self::Token => "token",
            Self::Phone => "phone",
            Self::Custom(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "segment" => Self::Segment,
            "sentence" => Self::Sentence,
            "word" => Self::Word,
            "token" => Self::Token,
            "phone" => Self::Phone,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for TimelineEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TimelineEntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimelineEntryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// A labeled half-open interval `[start_time, end_time)` in seconds, with an
/// optional nested child timeline.
///
/// Invariants (producers in this crate preserve them): `start_time <=
/// end_time`, siblings sorted by `start_time`, children bounded by the parent
/// interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(rename = "type")]
    pub kind: TimelineEntryKind,
    pub text: String,
    #[serde(rename = "startTime")]
    pub start_time: f64,
    #[serde(rename = "endTime")]
    pub end_time: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineEntry>,
}

impl TimelineEntry {
    pub fn new(
        kind: TimelineEntryKind,
        text: impl Into<String>,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            start_time,
            end_time,
            timeline: Vec::new(),
        }
    }

    pub fn with_children(mut self, timeline: Vec<TimelineEntry>) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Flattens an arbitrarily nested timeline to a word-level one.
///
/// Word entries are emitted in traversal order; each keeps only its phone
/// descendants as children (clause/token nesting inside a word is dropped).
pub fn flatten_to_word_timeline(timeline: &[TimelineEntry]) -> Vec<TimelineEntry> {
    let mut words = Vec::new();
    collect_words(timeline, &mut words);
    words
}

fn collect_words(timeline: &[TimelineEntry], out: &mut Vec<TimelineEntry>) {
    for entry in timeline {
        if entry.kind == TimelineEntryKind::Word {
            let mut phones = Vec::new();
            collect_phones(&entry.timeline, &mut phones);
            out.push(TimelineEntry {
                kind: TimelineEntryKind::Word,
                text: entry.text.clone(),
                start_time: entry.start_time,
                end_time: entry.end_time,
                timeline: phones,
            });
        } else {
            collect_words(&entry.timeline, out);
        }
    }
}

fn collect_phones(timeline: &[TimelineEntry], out: &mut Vec<TimelineEntry>) {
    for entry in timeline {
        if entry.kind == TimelineEntryKind::Phone {
            out.push(TimelineEntry {
                kind: TimelineEntryKind::Phone,
                text: entry.text.clone(),
                start_time: entry.start_time,
                end_time: entry.end_time,
                timeline: Vec::new(),
            });
        } else {
            collect_phones(&entry.timeline, out);
        }
    }
}

pub fn load_timeline(path: &Path) -> Result<Vec<TimelineEntry>, AlignmentError> {
    let data =
        std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read timeline JSON", e))?;
    serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse timeline JSON", e))
}

pub fn save_timeline(path: &Path, timeline: &[TimelineEntry]) -> Result<(), AlignmentError> {
    let data = serde_json::to_string_pretty(timeline)
        .map_err(|e| AlignmentError::json("serialize timeline JSON", e))?;
    std::fs::write(path, data).map_err(|e| AlignmentError::io("write timeline JSON", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_audio_duration() {
        let audio = RawAudio::mono(vec![0.0; 32_000], 16_000);
        assert_eq!(audio.sample_count(), 32_000);
        assert!((audio.duration_seconds() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn kind_tag_round_trip() {
        for tag in ["segment", "sentence", "word", "token", "phone"] {
            assert_eq!(TimelineEntryKind::from_tag(tag).as_str(), tag);
        }
        let custom = TimelineEntryKind::from_tag("clause");
        assert_eq!(custom, TimelineEntryKind::Custom("clause".to_string()));
        assert_eq!(custom.as_str(), "clause");
    }

    #[test]
    fn timeline_entry_json_field_names() {
        let entry = TimelineEntry::new(TimelineEntryKind::Word, "hello", 0.5, 1.25);
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["type"], "word");
        assert_eq!(json["text"], "hello");
        assert_eq!(json["startTime"], 0.5);
        assert_eq!(json["endTime"], 1.25);
        assert!(json.get("timeline").is_none());

        let parsed: TimelineEntry = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, entry);
    }

    #[test]
    fn timeline_json_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("timeline.json");
        let timeline = vec![
            TimelineEntry::new(TimelineEntryKind::Word, "hi", 0.0, 1.0).with_children(vec![
                TimelineEntry::new(TimelineEntryKind::Phone, "h", 0.0, 0.5),
            ]),
        ];
        save_timeline(&path, &timeline).expect("save");
        let loaded = load_timeline(&path).expect("load");
        assert_eq!(loaded, timeline);
    }

    #[test]
    fn flatten_extracts_words_with_phone_children() {
        let timeline = vec![TimelineEntry::new(
            TimelineEntryKind::Segment,
            "the cat",
            0.0,
            1.0,
        )
        .with_children(vec![
            TimelineEntry::new(TimelineEntryKind::Word, "the", 0.0, 0.4).with_children(vec![
                TimelineEntry::new(TimelineEntryKind::Custom("clause".into()), "", 0.0, 0.4)
                    .with_children(vec![TimelineEntry::new(
                        TimelineEntryKind::Phone,
                        "dh",
                        0.0,
                        0.2,
                    )]),
            ]),
            TimelineEntry::new(TimelineEntryKind::Word, "cat", 0.4, 1.0),
        ])];

        let words = flatten_to_word_timeline(&timeline);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "the");
        assert_eq!(words[0].timeline.len(), 1);
        assert_eq!(words[0].timeline[0].text, "dh");
        assert_eq!(words[1].text, "cat");
        assert!(words[1].timeline.is_empty());
    }
}
