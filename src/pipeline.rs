//! Model artifact loading.
//!
//! The artifact is a JSON manifest listing the fitted pipeline's steps in
//! order. Every step before the last is a [`Transformer`]; the last step is
//! the [`Classifier`]. A bare `.onnx` file is accepted as a pipeline with a
//! classifier and no transformers.
//!
//! ```json
//! {
//!   "steps": [
//!     { "name": "outliers", "kind": "OutlierHandler", "method": "zscore", "threshold": 3 },
//!     { "name": "model", "kind": "OnnxClassifier", "path": "model.onnx" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{LoadError, PredictError};
use crate::models::{BookingInquiry, RawLabel};
use crate::onnx::OnnxClassifier;

pub trait Transformer: Send + Sync {
    fn transform(&self, inquiry: BookingInquiry) -> BookingInquiry;
}

pub trait Classifier: Send + Sync {
    fn predict(&self, inquiry: &BookingInquiry) -> Result<RawLabel, PredictError>;
}

/// Outlier-handling stage of the fitted pipeline. It was fitted as a
/// pass-through, so `transform` returns its input untouched; the parameters
/// are kept so a manifest naming this step still loads.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierHandler {
    pub method: String,
    pub threshold: f64,
}

impl Default for OutlierHandler {
    fn default() -> Self {
        Self {
            method: default_method(),
            threshold: default_threshold(),
        }
    }
}

impl Transformer for OutlierHandler {
    fn transform(&self, inquiry: BookingInquiry) -> BookingInquiry {
        inquiry
    }
}

fn default_method() -> String {
    "zscore".to_string()
}

fn default_threshold() -> f64 {
    3.0
}

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Deserialize)]
pub struct StepSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
pub enum StepKind {
    OutlierHandler {
        #[serde(default = "default_method")]
        method: String,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    OnnxClassifier {
        path: PathBuf,
    },
}

impl StepKind {
    fn is_classifier(&self) -> bool {
        matches!(self, StepKind::OnnxClassifier { .. })
    }
}

impl Manifest {
    pub fn validate(&self) -> Result<(), LoadError> {
        let Some(last) = self.steps.last() else {
            return Err(LoadError::Pipeline("no steps".into()));
        };
        if !last.kind.is_classifier() {
            return Err(LoadError::Pipeline(format!(
                "final step '{}' is not a classifier",
                last.name
            )));
        }
        if let Some(step) = self.steps[..self.steps.len() - 1]
            .iter()
            .find(|s| s.kind.is_classifier())
        {
            return Err(LoadError::Pipeline(format!(
                "classifier '{}' must be the final step",
                step.name
            )));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name.as_str()) {
                return Err(LoadError::Pipeline(format!(
                    "duplicate step name '{}'",
                    step.name
                )));
            }
        }
        Ok(())
    }
}

/// The loaded, immutable inference pipeline.
pub struct Pipeline {
    transformers: Vec<(String, Box<dyn Transformer>)>,
    classifier: (String, Box<dyn Classifier>),
}

impl Pipeline {
    pub fn new(
        transformers: Vec<(String, Box<dyn Transformer>)>,
        classifier_name: impl Into<String>,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            transformers,
            classifier: (classifier_name.into(), classifier),
        }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if path.extension().is_some_and(|ext| ext == "onnx") {
            let classifier = OnnxClassifier::load(path)?;
            return Ok(Self::new(Vec::new(), "classifier", Box::new(classifier)));
        }

        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|source| LoadError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_manifest(manifest, base)
    }

    /// Builds the pipeline described by `manifest`; relative classifier paths
    /// are resolved against `base`.
    pub fn from_manifest(manifest: Manifest, base: &Path) -> Result<Self, LoadError> {
        manifest.validate()?;

        let mut transformers: Vec<(String, Box<dyn Transformer>)> = Vec::new();
        let mut classifier = None;
        for step in manifest.steps {
            match step.kind {
                StepKind::OutlierHandler { method, threshold } => {
                    debug!(step = %step.name, %method, threshold, "outlier handler step");
                    let handler: Box<dyn Transformer> =
                        Box::new(OutlierHandler { method, threshold });
                    transformers.push((step.name, handler));
                }
                StepKind::OnnxClassifier { path } => {
                    let model = OnnxClassifier::load(&base.join(path))?;
                    classifier = Some((step.name, Box::new(model) as Box<dyn Classifier>));
                }
            }
        }

        // validate() guarantees the final step is a classifier
        let (name, classifier) =
            classifier.ok_or_else(|| LoadError::Pipeline("no classifier".into()))?;
        let pipeline = Self::new(transformers, name, classifier);
        info!(steps = ?pipeline.step_names(), "pipeline loaded");
        Ok(pipeline)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.transformers
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(std::iter::once(self.classifier.0.as_str()))
            .collect()
    }

    pub fn predict(&self, inquiry: BookingInquiry) -> Result<RawLabel, PredictError> {
        let inquiry = self
            .transformers
            .iter()
            .fold(inquiry, |acc, (_, step)| step.transform(acc));
        self.classifier.1.predict(&inquiry)
    }
}
