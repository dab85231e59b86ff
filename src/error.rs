use std::path::PathBuf;

use thiserror::Error;

use crate::models::ColumnKind;

/// Failure turning a submitted form into a booking inquiry.
#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("could not decode form body: {0}")]
    Body(#[from] serde_urlencoded::de::Error),

    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("invalid integer for {field}: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid number for {field}: '{value}'")]
    InvalidFloat { field: &'static str, value: String },
}

/// Failure while running the loaded pipeline on one inquiry.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("column '{column}' cannot be fed as {expected}")]
    ColumnType { column: String, expected: String },

    #[error("model produced no output")]
    EmptyOutput,

    #[error("unsupported output type {0}")]
    OutputType(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failure loading the model artifact at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed pipeline manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid pipeline: {0}")]
    Pipeline(String),

    #[error("model input '{0}' is not a booking column")]
    UnknownInput(String),

    #[error("model input '{column}' expects {datum}, which a {kind} column cannot supply")]
    InputType {
        column: String,
        datum: String,
        kind: ColumnKind,
    },

    #[error("onnx model {path}: {message}")]
    Onnx { path: PathBuf, message: String },
}

/// Anything that can go wrong while answering a form submission. The handler
/// renders these inline rather than as an error status.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Inquiry(#[from] InquiryError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("prediction aborted unexpectedly")]
    Aborted,
}
