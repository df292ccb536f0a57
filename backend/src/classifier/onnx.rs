use std::fs;
use std::sync::Mutex;

use image::RgbImage;
use image::imageops::{self, FilterType};
use log::info;
use ndarray::{Array3, Array4};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Value;

use super::{ClassifierError, ImageClassifier, Prediction};

const INPUT_SIZE: u32 = 224;

/// ONNX-backed classifier. The session and class list are loaded once at
/// startup and shared by all requests; the exported model is expected to take
/// a single NCHW float input named "input" and emit one score per class.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    labels: Vec<String>,
}

impl OnnxClassifier {
    pub fn new(model_path: &str, class_list_path: &str) -> Result<Self, ClassifierError> {
        let labels: Vec<String> = fs::read_to_string(class_list_path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if labels.is_empty() {
            return Err(ClassifierError::ClassList(format!(
                "{} contains no labels",
                class_list_path
            )));
        }

        let session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path)?;

        info!(
            "Loaded model from {} with {} classes",
            model_path,
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, image: &Array3<u8>) -> Result<Prediction, ClassifierError> {
        let input = preprocess(image, INPUT_SIZE)?;

        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs!["input" => Value::from_array(input)?])?;
        let scores = outputs[0].try_extract_array::<f32>()?;

        if scores.len() != self.labels.len() {
            return Err(ClassifierError::Output(format!(
                "model produced {} scores for {} classes",
                scores.len(),
                self.labels.len()
            )));
        }

        let (best, _) = scores
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| ClassifierError::Output("model produced no scores".to_string()))?;

        Ok(Prediction {
            label: self.labels[best].clone(),
        })
    }
}

/// Scales a decoded (height, width, 3) array to the model input size and lays
/// it out as a [0, 1]-normalized NCHW float tensor.
fn preprocess(image: &Array3<u8>, size: u32) -> Result<Array4<f32>, ClassifierError> {
    let (height, width, channels) = image.dim();
    if channels != 3 {
        return Err(ClassifierError::Preprocessing(format!(
            "expected 3 channels, got {}",
            channels
        )));
    }

    let raw: Vec<u8> = image.iter().copied().collect();
    let buffer = RgbImage::from_raw(width as u32, height as u32, raw).ok_or_else(|| {
        ClassifierError::Preprocessing("pixel buffer does not match image dimensions".to_string())
    })?;
    let resized = imageops::resize(&buffer, size, size, FilterType::Triangle);

    let mut input = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            input[[0, channel, y as usize, x as usize]] = pixel.0[channel] as f32 / 255.0;
        }
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_produces_normalized_nchw_tensor() {
        let image = Array3::from_shape_fn((4, 6, 3), |(y, x, c)| (y * 18 + x * 3 + c) as u8);
        let input = preprocess(&image, 2).unwrap();
        assert_eq!(input.dim(), (1, 3, 2, 2));
        assert!(input.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn preprocess_rejects_mismatched_channel_count() {
        let image = Array3::<u8>::zeros((4, 4, 4));
        assert!(preprocess(&image, 2).is_err());
    }
}
