use crate::{
    config::RecognizerConfig,
    pipeline::{AlgorithmicStrategy, NeuralStrategy, Recognizer},
    traits::{RecognitionStrategy, SegmentationModel, TextRecognizer},
};

enum PendingStrategy {
    Ready(Box<dyn RecognitionStrategy>),
    /// Built once the final config is known
    Model(Box<dyn SegmentationModel>),
}

/// Builder for creating recognizers with a fluent API. The algorithmic
/// strategy is always appended last as the fallback.
pub struct RecognizerBuilder {
    strategies: Vec<PendingStrategy>,
    text_recognizer: Option<Box<dyn TextRecognizer>>,
    config: RecognizerConfig,
}

impl RecognizerBuilder {
    /// Create a new recognizer builder
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            text_recognizer: None,
            config: RecognizerConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: RecognizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Caller-provided scale, used when the text carries none
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.config.scale = Some(scale);
        self
    }

    /// Add a strategy tried before the algorithmic fallback
    pub fn add_strategy<S>(mut self, strategy: S) -> Self
    where
        S: RecognitionStrategy + 'static,
    {
        self.strategies.push(PendingStrategy::Ready(Box::new(strategy)));
        self
    }

    /// Add a neural segmentation strategy backed by `model`
    pub fn with_segmentation_model<M>(mut self, model: M) -> Self
    where
        M: SegmentationModel + 'static,
    {
        self.strategies.push(PendingStrategy::Model(Box::new(model)));
        self
    }

    /// Set the text source used when a document carries no text
    pub fn with_text_recognizer<T>(mut self, recognizer: T) -> Self
    where
        T: TextRecognizer + 'static,
    {
        self.text_recognizer = Some(Box::new(recognizer));
        self
    }

    pub fn build(self) -> Recognizer {
        let config = self.config;
        let mut strategies: Vec<Box<dyn RecognitionStrategy>> = self
            .strategies
            .into_iter()
            .map(|pending| match pending {
                PendingStrategy::Ready(strategy) => strategy,
                PendingStrategy::Model(model) => {
                    Box::new(NeuralStrategy::new(model, &config)) as Box<dyn RecognitionStrategy>
                }
            })
            .collect();
        strategies.push(Box::new(AlgorithmicStrategy::from_config(&config)));

        Recognizer::new(strategies, self.text_recognizer, config)
    }

    /// Build an algorithmic-only recognizer
    pub fn build_algorithmic(config: RecognizerConfig) -> Recognizer {
        Self::new().with_config(config).build()
    }
}

impl Default for RecognizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
