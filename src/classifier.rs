use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::Array2;
use tract_onnx::prelude::*;

use crate::error::{InvocationError, ModelLoadError};
use crate::models::{PredictionRequest, PredictionResult, Quality, FEATURE_COLUMNS};

pub const N_FEATURES: usize = FEATURE_COLUMNS.len();

/// Largest tolerated gap between the two class probabilities and 1.0.
const PROBABILITY_SUM_TOLERANCE: f32 = 1e-3;

/// Raw answer of the model service for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    pub label: i64,
    /// Class-0 (not good) and class-1 (good) probabilities.
    pub probabilities: [f32; 2],
}

pub trait WineClassifier: Send + Sync {
    fn classify(&self, features: &[f32; N_FEATURES]) -> Result<ModelOutput, InvocationError>;
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Binary classifier exported to ONNX without a zip-map on its probability
/// output: output 0 is the int64 label, output 1 the `[1, 2]` probabilities.
pub struct OnnxClassifier {
    plan: OnnxPlan,
    path: PathBuf,
}

impl OnnxClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref().to_path_buf();
        let load_error = |e: TractError| ModelLoadError {
            path: path.clone(),
            reason: format!("{e:#}"),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(&path)
            .map_err(load_error)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, N_FEATURES)),
            )
            .map_err(load_error)?
            .into_optimized()
            .map_err(load_error)?
            .into_runnable()
            .map_err(load_error)?;

        info!("Loaded model {}", path.display());
        Ok(Self { plan, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WineClassifier for OnnxClassifier {
    fn classify(&self, features: &[f32; N_FEATURES]) -> Result<ModelOutput, InvocationError> {
        let row = Array2::from_shape_vec((1, N_FEATURES), features.to_vec())
            .map_err(|e| InvocationError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(row.into_tensor().into()))
            .map_err(|e| InvocationError::Inference(format!("{e:#}")))?;

        decode_outputs(&outputs[..])
    }
}

/// Reads the label and class probabilities out of the plan's outputs.
fn decode_outputs<T>(outputs: &[T]) -> Result<ModelOutput, InvocationError>
where
    T: std::ops::Deref<Target = Tensor>,
{
    let [label, probabilities, ..] = outputs else {
        return Err(InvocationError::Output(format!(
            "expected label and probability outputs, got {} output(s)",
            outputs.len()
        )));
    };

    let label = label
        .to_array_view::<i64>()
        .map_err(|e| InvocationError::Output(format!("label: {e}")))?
        .iter()
        .next()
        .copied()
        .ok_or_else(|| InvocationError::Output("label output is empty".to_string()))?;

    if probabilities.shape() != [1, 2] {
        return Err(InvocationError::Output(format!(
            "expected probabilities of shape [1, 2], got {:?}",
            probabilities.shape()
        )));
    }
    let view = probabilities
        .to_array_view::<f32>()
        .map_err(|e| InvocationError::Output(format!("probabilities: {e}")))?;
    let mut values = view.iter().copied();
    let (Some(not_good), Some(good)) = (values.next(), values.next()) else {
        return Err(InvocationError::Output("probability output is empty".to_string()));
    };

    Ok(ModelOutput {
        label,
        probabilities: [not_good, good],
    })
}

/// Runs one prediction. The label comes straight from the model; no
/// thresholding happens here.
pub fn predict<C: WineClassifier + ?Sized>(
    classifier: &C,
    request: &PredictionRequest,
) -> Result<PredictionResult, InvocationError> {
    let output = classifier.classify(&request.features())?;
    debug!("Model output for {:?}: {:?}", request, output);
    interpret(output)
}

/// Checks the binary-classifier contract and reads the class-1 probability.
pub fn interpret(output: ModelOutput) -> Result<PredictionResult, InvocationError> {
    let quality = Quality::from_label(output.label).ok_or_else(|| {
        InvocationError::Contract(format!("label {} is not 0 or 1", output.label))
    })?;

    let [not_good, good] = output.probabilities;
    if !(0.0..=1.0).contains(&not_good) || !(0.0..=1.0).contains(&good) {
        return Err(InvocationError::Contract(format!(
            "probabilities {:?} outside [0, 1]",
            output.probabilities
        )));
    }
    if (not_good + good - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(InvocationError::Contract(format!(
            "probabilities {:?} do not sum to 1",
            output.probabilities
        )));
    }

    Ok(PredictionResult {
        quality,
        probability_good: good,
    })
}
