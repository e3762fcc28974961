//! Turns submitted form values into a [`PredictionRequest`].
//!
//! The page only offers a red/white radio and bounded sliders, so there is
//! nothing to reject here: whatever arrives is pinned to what those widgets
//! could have produced.

use serde::Deserialize;

use crate::models::{PredictionRequest, WineColor};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    /// Form field name.
    pub name: &'static str,
    /// Model column name.
    pub column: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
    /// Decimal places of `step`.
    pub decimals: i32,
}

pub const ALCOHOL: SliderSpec = SliderSpec {
    name: "alcohol",
    column: "alcohol",
    label: "Alcohol (% ABV)",
    min: 5.0,
    max: 15.0,
    step: 0.1,
    default: 12.5,
    decimals: 1,
};

pub const RESIDUAL_SUGAR: SliderSpec = SliderSpec {
    name: "residual_sugar",
    column: "residual sugar",
    label: "Residual sugar (g/dm³)",
    min: 0.0,
    max: 20.0,
    step: 0.1,
    default: 2.5,
    decimals: 1,
};

pub const PH: SliderSpec = SliderSpec {
    name: "ph",
    column: "pH",
    label: "pH (acidity)",
    min: 2.8,
    max: 4.0,
    step: 0.1,
    default: 3.4,
    decimals: 1,
};

pub const VOLATILE_ACIDITY: SliderSpec = SliderSpec {
    name: "volatile_acidity",
    column: "volatile acidity",
    label: "Volatile acidity (g/dm³)",
    min: 0.1,
    max: 1.0,
    step: 0.01,
    default: 0.5,
    decimals: 2,
};

pub const SULPHATES: SliderSpec = SliderSpec {
    name: "sulphates",
    column: "sulphates",
    label: "Sulphates (g/dm³)",
    min: 0.3,
    max: 1.5,
    step: 0.1,
    default: 0.8,
    decimals: 1,
};

/// The five numeric sliders, in model column order.
pub const SLIDERS: [SliderSpec; 5] = [ALCOHOL, RESIDUAL_SUGAR, PH, VOLATILE_ACIDITY, SULPHATES];

impl SliderSpec {
    /// The value a slider would show if dragged towards `value`.
    pub fn constrain(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }

        let min = f64::from(self.min);
        let step = f64::from(self.step);
        let clamped = f64::from(value).clamp(min, f64::from(self.max));

        let steps = ((clamped - min) / step).round();
        let scale = 10f64.powi(self.decimals);
        let snapped = ((min + steps * step) * scale).round() / scale;

        (snapped as f32).clamp(self.min, self.max)
    }

    fn read(&self, value: Option<f32>) -> f32 {
        value.map_or(self.default, |v| self.constrain(v))
    }
}

/// Raw values as submitted by the page or the JSON API.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FormInput {
    pub color: Option<WineColor>,
    pub alcohol: Option<f32>,
    pub residual_sugar: Option<f32>,
    pub ph: Option<f32>,
    pub volatile_acidity: Option<f32>,
    pub sulphates: Option<f32>,
}

impl FormInput {
    /// Current record for the submitted controls. Missing fields take their
    /// widget default.
    pub fn collect(&self) -> PredictionRequest {
        PredictionRequest::new(
            self.color.unwrap_or_default(),
            ALCOHOL.read(self.alcohol),
            RESIDUAL_SUGAR.read(self.residual_sugar),
            PH.read(self.ph),
            VOLATILE_ACIDITY.read(self.volatile_acidity),
            SULPHATES.read(self.sulphates),
        )
    }
}
