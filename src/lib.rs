pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod mfcc;
pub mod pipeline;
pub mod types;

pub use alignment::dtw::{
    align_mfcc_dtw, align_mfcc_dtw_with_cost, estimate_banded_matrix_bytes, euclidean_distance,
};
pub use alignment::indirect::{align_using_dtw_with_recognition, interpolate_phone_timelines};
pub use alignment::multipass::align_using_dtw;
pub use alignment::path::{AlignmentPath, CompactedPath, FrameRange, MappedFrameKind};
pub use alignment::phone::align_phone_timelines;
pub use config::{Granularity, MfccOptions, PhoneAlignmentMethod};
pub use error::AlignmentError;
pub use mfcc::compute_mfccs;
pub use pipeline::builder::TimelineAlignerBuilder;
pub use pipeline::reference::{create_alignment_reference, AlignmentReference};
pub use pipeline::runtime::TimelineAligner;
pub use pipeline::traits::{SpeechSynthesizer, SynthesisOptions, SynthesisResult};
pub use types::{
    flatten_to_word_timeline, load_timeline, save_timeline, RawAudio, TimelineEntry,
    TimelineEntryKind,
};
