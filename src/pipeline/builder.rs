use crate::config::{Granularity, PhoneAlignmentMethod};
use crate::error::AlignmentError;
use crate::pipeline::runtime::{TimelineAligner, TimelineAlignerParts};
use crate::pipeline::traits::{SpeechSynthesizer, SynthesisOptions};

/// Default pass schedule: one coarse corridor pass followed by a refinement
/// pass inside a narrow band.
const DEFAULT_GRANULARITIES: [Granularity; 2] = [Granularity::XLow, Granularity::Medium];
const DEFAULT_WINDOW_DURATIONS: [f64; 2] = [120.0, 4.0];

pub struct TimelineAlignerBuilder {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    granularities: Vec<Granularity>,
    window_durations: Vec<f64>,
    phone_alignment_method: PhoneAlignmentMethod,
    synthesis_options: SynthesisOptions,
}

impl Default for TimelineAlignerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineAlignerBuilder {
    pub fn new() -> Self {
        Self {
            synthesizer: None,
            granularities: DEFAULT_GRANULARITIES.to_vec(),
            window_durations: DEFAULT_WINDOW_DURATIONS.to_vec(),
            phone_alignment_method: PhoneAlignmentMethod::default(),
            synthesis_options: SynthesisOptions::default(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_granularities(mut self, granularities: Vec<Granularity>) -> Self {
        self.granularities = granularities;
        self
    }

    pub fn with_window_durations(mut self, window_durations: Vec<f64>) -> Self {
        self.window_durations = window_durations;
        self
    }

    pub fn with_phone_alignment_method(mut self, method: PhoneAlignmentMethod) -> Self {
        self.phone_alignment_method = method;
        self
    }

    pub fn with_synthesis_options(mut self, options: SynthesisOptions) -> Self {
        self.synthesis_options = options;
        self
    }

    pub fn build(self) -> Result<TimelineAligner, AlignmentError> {
        if self.granularities.is_empty() {
            return Err(AlignmentError::invalid_input(
                "at least one alignment pass is required",
            ));
        }
        if self.granularities.len() != self.window_durations.len() {
            return Err(AlignmentError::invalid_input(format!(
                "granularity count {} does not match window duration count {}",
                self.granularities.len(),
                self.window_durations.len()
            )));
        }
        if let Some(&bad) = self.window_durations.iter().find(|&&w| !(w > 0.0)) {
            return Err(AlignmentError::invalid_input(format!(
                "window durations must be positive, got {bad}"
            )));
        }

        Ok(TimelineAligner::from_parts(TimelineAlignerParts {
            synthesizer: self.synthesizer,
            granularities: self.granularities,
            window_durations: self.window_durations,
            phone_alignment_method: self.phone_alignment_method,
            synthesis_options: self.synthesis_options,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_a_two_pass_schedule() {
        let aligner = TimelineAlignerBuilder::new().build().expect("build");
        assert_eq!(
            aligner.granularities(),
            &[Granularity::XLow, Granularity::Medium]
        );
        assert_eq!(aligner.window_durations(), &[120.0, 4.0]);
    }

    #[test]
    fn mismatched_pass_lists_fail_fast() {
        let result = TimelineAlignerBuilder::new()
            .with_granularities(vec![Granularity::Low])
            .with_window_durations(vec![10.0, 1.0])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn empty_pass_list_fails_fast() {
        let result = TimelineAlignerBuilder::new()
            .with_granularities(Vec::new())
            .with_window_durations(Vec::new())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn nonpositive_window_fails_fast() {
        let result = TimelineAlignerBuilder::new()
            .with_granularities(vec![Granularity::Low])
            .with_window_durations(vec![-1.0])
            .build();
        assert!(result.is_err());
    }
}
