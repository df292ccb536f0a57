use ndarray::Array3;
use thiserror::Error;

pub mod onnx;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read class list: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid class list: {0}")]
    ClassList(String),
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),
    #[error("model execution failed: {0}")]
    Model(#[from] ort::Error),
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// What the model hands back for one image: a single label.
pub struct Prediction {
    pub label: String,
}

/// Boundary to the image classifier. Input is a decoded (height, width, 3) RGB
/// pixel array. Implementations must be safe for concurrent use by in-flight
/// requests; the handler invokes this exactly once per request.
pub trait ImageClassifier: Send + Sync {
    fn predict(&self, image: &Array3<u8>) -> Result<Prediction, ClassifierError>;
}
