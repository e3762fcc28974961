use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collector::{SliderSpec, SLIDERS};

/// Column names expected by the model, in input order.
pub const FEATURE_COLUMNS: [&str; 6] = [
    "type_white",
    "alcohol",
    "residual sugar",
    "pH",
    "volatile acidity",
    "sulphates",
];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WineColor {
    #[default]
    Red,
    White,
}

impl WineColor {
    pub fn type_white(self) -> f32 {
        match self {
            WineColor::Red => 0.0,
            WineColor::White => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WineColor::Red => "Red",
            WineColor::White => "White",
        }
    }
}

/// One wine sample as read off the form.
///
/// Only built by the input collector, so every numeric field already sits
/// inside its slider range.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct PredictionRequest {
    color: WineColor,
    alcohol: f32,
    residual_sugar: f32,
    ph: f32,
    volatile_acidity: f32,
    sulphates: f32,
}

impl PredictionRequest {
    pub(crate) fn new(
        color: WineColor,
        alcohol: f32,
        residual_sugar: f32,
        ph: f32,
        volatile_acidity: f32,
        sulphates: f32,
    ) -> Self {
        PredictionRequest {
            color,
            alcohol,
            residual_sugar,
            ph,
            volatile_acidity,
            sulphates,
        }
    }

    pub fn color(&self) -> WineColor {
        self.color
    }

    pub fn alcohol(&self) -> f32 {
        self.alcohol
    }

    pub fn residual_sugar(&self) -> f32 {
        self.residual_sugar
    }

    pub fn ph(&self) -> f32 {
        self.ph
    }

    pub fn volatile_acidity(&self) -> f32 {
        self.volatile_acidity
    }

    pub fn sulphates(&self) -> f32 {
        self.sulphates
    }

    /// Model input row, ordered as [`FEATURE_COLUMNS`].
    pub fn features(&self) -> [f32; 6] {
        [
            self.color.type_white(),
            self.alcohol,
            self.residual_sugar,
            self.ph,
            self.volatile_acidity,
            self.sulphates,
        ]
    }
}

#[cfg(test)]
impl PredictionRequest {
    pub(crate) fn with_color(self, color: WineColor) -> Self {
        PredictionRequest { color, ..self }
    }
}

impl Default for PredictionRequest {
    fn default() -> Self {
        let [alcohol, sugar, ph, acidity, sulphates] = SLIDERS.map(|s: SliderSpec| s.default);
        PredictionRequest::new(WineColor::Red, alcohol, sugar, ph, acidity, sulphates)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Good,
    NotGood,
}

impl Quality {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            1 => Some(Quality::Good),
            0 => Some(Quality::NotGood),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub quality: Quality,
    pub probability_good: f32,
}

impl PredictionResult {
    pub fn probability_not_good(&self) -> f32 {
        1.0 - self.probability_good
    }

    /// Probability of the predicted label.
    pub fn confidence(&self) -> f32 {
        match self.quality {
            Quality::Good => self.probability_good,
            Quality::NotGood => self.probability_not_good(),
        }
    }

    pub fn headline(&self) -> String {
        let percent = self.confidence() * 100.0;
        match self.quality {
            Quality::Good => format!("GOOD (probability: {percent:.1}%)"),
            Quality::NotGood => format!("NOT GOOD (probability: {percent:.1}%)"),
        }
    }

    pub fn message(&self) -> &'static str {
        match self.quality {
            Quality::Good => "This wine has a high chance of being approved by experts!",
            Quality::NotGood => "Better leave it on the shelf...",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub request: PredictionRequest,
    pub quality: Quality,
    pub probability_good: f32,
    pub probability_not_good: f32,
    pub verdict: String,
}

impl PredictionResponse {
    pub fn new(request: PredictionRequest, result: &PredictionResult) -> Self {
        PredictionResponse {
            request_id: Uuid::new_v4(),
            request,
            quality: result.quality,
            probability_good: result.probability_good,
            probability_not_good: result.probability_not_good(),
            verdict: result.headline(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeatureInfo {
    pub column: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub model_path: String,
    pub features: Vec<FeatureInfo>,
}

impl ModelInfo {
    pub fn new(model_path: impl Into<String>) -> Self {
        let mut features = vec![FeatureInfo {
            column: FEATURE_COLUMNS[0],
            label: "Wine type (0 = red, 1 = white)",
            min: 0.0,
            max: 1.0,
            step: 1.0,
            default: WineColor::default().type_white(),
        }];
        features.extend(SLIDERS.iter().map(|s| FeatureInfo {
            column: s.column,
            label: s.label,
            min: s.min,
            max: s.max,
            step: s.step,
            default: s.default,
        }));

        ModelInfo {
            model_path: model_path.into(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_matches_widget_defaults() {
        let request = PredictionRequest::default();
        assert_eq!(request.color(), WineColor::Red);
        assert_eq!(request.features(), [0.0, 12.5, 2.5, 3.4, 0.5, 0.8]);
    }

    #[test]
    fn white_sets_type_indicator() {
        let request = PredictionRequest::default().with_color(WineColor::White);
        assert_eq!(request.features()[0], 1.0);
    }

    #[test]
    fn probabilities_are_complementary() {
        let result = PredictionResult {
            quality: Quality::NotGood,
            probability_good: 0.37,
        };
        assert!((result.probability_good + result.probability_not_good() - 1.0).abs() < 1e-6);
        assert!((result.confidence() - 0.63).abs() < 1e-6);
    }

    #[test]
    fn headline_reports_probability_of_predicted_label() {
        let good = PredictionResult {
            quality: Quality::Good,
            probability_good: 0.87,
        };
        assert_eq!(good.headline(), "GOOD (probability: 87.0%)");

        let bad = PredictionResult {
            quality: Quality::NotGood,
            probability_good: 0.25,
        };
        assert_eq!(bad.headline(), "NOT GOOD (probability: 75.0%)");
    }

    #[test]
    fn only_binary_labels_map_to_quality() {
        assert_eq!(Quality::from_label(1), Some(Quality::Good));
        assert_eq!(Quality::from_label(0), Some(Quality::NotGood));
        assert_eq!(Quality::from_label(2), None);
    }

    #[test]
    fn model_info_lists_all_columns_in_order() {
        let info = ModelInfo::new("model.onnx");
        let columns: Vec<_> = info.features.iter().map(|f| f.column).collect();
        assert_eq!(columns, FEATURE_COLUMNS);
    }
}
