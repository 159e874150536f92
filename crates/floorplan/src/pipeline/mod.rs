pub mod builder;
pub mod result;
pub mod strategy;

pub use builder::RecognizerBuilder;
pub use result::{RecognitionOutcome, RecognitionResult, RecognitionStats, RecognizedPlan};
pub use strategy::{AlgorithmicStrategy, NeuralStrategy};

use image::GrayImage;
use rayon::prelude::*;

use crate::{
    config::{RecognizerConfig, resolve_scale},
    error::{PlanError, Result},
    metadata::{match_rooms_with_geometry, parse_metadata},
    traits::{RecognitionStrategy, TextRecognizer},
};

/// One plan to recognise: the raster plus any text already extracted from
/// it (PDF text layer, OCR run by the caller).
#[derive(Debug, Clone)]
pub struct PlanDocument {
    pub image: GrayImage,
    pub text: Option<String>,
}

impl PlanDocument {
    pub fn new(image: GrayImage) -> Self {
        Self { image, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Runs recognition strategies in order until one yields walls and rooms,
/// then reconciles the geometry with the document text.
pub struct Recognizer {
    strategies: Vec<Box<dyn RecognitionStrategy>>,
    text_recognizer: Option<Box<dyn TextRecognizer>>,
    config: RecognizerConfig,
}

impl Recognizer {
    /// Create a new recognizer builder
    pub fn builder() -> RecognizerBuilder {
        RecognizerBuilder::new()
    }

    pub fn new(
        strategies: Vec<Box<dyn RecognitionStrategy>>,
        text_recognizer: Option<Box<dyn TextRecognizer>>,
        config: RecognizerConfig,
    ) -> Self {
        Self {
            strategies,
            text_recognizer,
            config,
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// The single public entry point. Never fails: errors become
    /// [`RecognitionOutcome::Failure`].
    pub fn recognize(&self, document: &PlanDocument) -> RecognitionOutcome {
        match self.analyze(document) {
            Ok(plan) => RecognitionOutcome::Success(plan.to_result()),
            Err(e) => {
                tracing::warn!(error = %e, "plan recognition failed");
                RecognitionOutcome::Failure { error: e.to_string() }
            }
        }
    }

    /// Recognises independent documents in parallel.
    pub fn recognize_batch(&self, documents: &[PlanDocument]) -> Vec<RecognitionOutcome> {
        documents.par_iter().map(|document| self.recognize(document)).collect()
    }

    /// Full recognition keeping the geometry, for callers that need more
    /// than the text record (GeoJSON export, inspection).
    pub fn analyze(&self, document: &PlanDocument) -> Result<RecognizedPlan> {
        let text = self.document_text(document);
        let metadata = parse_metadata(&text);
        let scale = resolve_scale(metadata.scale, self.config.scale);
        tracing::info!(scale, ocr_rooms = metadata.rooms.len(), "recognizing plan");

        let mut last_error = PlanError::NoRoomsFound;
        for strategy in &self.strategies {
            let method = strategy.method();
            match strategy.recognize(&document.image, scale) {
                Ok(geometry) if !geometry.is_empty() => {
                    let mut geometry = geometry;
                    let report = match_rooms_with_geometry(&metadata.rooms, &mut geometry.rooms);
                    tracing::info!(
                        %method,
                        rooms = geometry.rooms.len(),
                        walls = geometry.walls.len(),
                        matched = report.matched.len(),
                        "plan recognized"
                    );
                    return Ok(RecognizedPlan {
                        geometry,
                        metadata,
                        scale,
                        method,
                        unmatched: report.unmatched,
                    });
                }
                Ok(_) => {
                    tracing::warn!(%method, "strategy returned no walls or rooms, falling back");
                    last_error = PlanError::EmptyGeometry(method.to_string());
                }
                Err(e) => {
                    tracing::warn!(%method, error = %e, "strategy failed, falling back");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn document_text(&self, document: &PlanDocument) -> String {
        if let Some(text) = &document.text {
            return text.clone();
        }
        let Some(recognizer) = &self.text_recognizer else {
            return String::new();
        };
        recognizer.recognize_text(&document.image).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "text recognition failed, continuing without metadata");
            String::new()
        })
    }

    /// Get information about the recognizer configuration
    pub fn info(&self) -> String {
        let methods = self.strategies.iter().map(|s| s.method().to_string()).collect::<Vec<_>>();
        format!(
            "Recognizer: strategies [{}], text recognizer: {}",
            methods.join(", "),
            if self.text_recognizer.is_some() { "yes" } else { "no" }
        )
    }
}
