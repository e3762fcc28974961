//! The single HTML page: label details form plus the verdict, if any.

use crate::collector::{SliderSpec, SLIDERS};
use crate::models::{PredictionRequest, PredictionResult, Quality, WineColor};

const ABOUT: &str = "<section>\n\
<h2>Why use machine learning to pick a wine?</h2>\n\
<p>Not every wine with a pretty label is good. The model predicts whether a wine is good \
(expert score above 6.5) or not (6.5 or below) from chemical properties found on the label.</p>\n\
<p>It was trained on red and white wines described by 12 chemical variables (acidity, residual \
sugar, pH and so on) and scored by experts from 0 to 10.</p>\n\
</section>\n\
<section>\n\
<h2>How it works</h2>\n\
<ul>\n\
<li>The wine type becomes <code>type_white</code> (0 for red, 1 for white).</li>\n\
<li>Numeric features are standardised to mean 0 and standard deviation 1.</li>\n\
<li>Scores are turned into a binary target: 1 above 6.5, 0 otherwise.</li>\n\
<li>An Extra Trees classifier was chosen for its accuracy (88.8%) and AUC (0.92), \
its resistance to overfitting and its speed at prediction time.</li>\n\
</ul>\n\
</section>\n";

const FOOTER: &str = "<hr>\n<p>Real data, a passion for wine and a bit of Rust.</p>\n";

pub enum Outcome<'a> {
    Empty,
    Verdict(&'a PredictionResult),
    Failed(&'a str),
}

pub fn render(request: &PredictionRequest, outcome: Outcome<'_>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Digital Sommelier</title>\n</head>\n<body>\n\
         <h1>Digital Sommelier</h1>\n\
         <p><em>A guide to avoid the traps in the wine cellar.</em></p>\n",
    );
    html.push_str(ABOUT);
    html.push_str(
        "<h2>Try it yourself</h2>\n\
         <p>Fill in the label details and find out whether the wine is good or a total disaster.</p>\n",
    );

    html.push_str("<form method=\"post\" action=\"/predict\">\n<fieldset>\n<legend>Wine type</legend>\n");
    for color in [WineColor::Red, WineColor::White] {
        let value = match color {
            WineColor::Red => "red",
            WineColor::White => "white",
        };
        let checked = if request.color() == color { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"radio\" name=\"color\" value=\"{value}\"{checked}> {}</label>\n",
            color.label()
        ));
    }
    html.push_str("</fieldset>\n");

    let values = [
        request.alcohol(),
        request.residual_sugar(),
        request.ph(),
        request.volatile_acidity(),
        request.sulphates(),
    ];
    for (slider, value) in SLIDERS.iter().zip(values) {
        slider_html(&mut html, slider, value);
    }

    html.push_str("<button type=\"submit\">Check quality</button>\n</form>\n");

    match outcome {
        Outcome::Empty => {}
        Outcome::Verdict(result) => {
            let class = match result.quality {
                Quality::Good => "success",
                Quality::NotGood => "error",
            };
            html.push_str(&format!(
                "<div class=\"{class}\"><strong>{}</strong><p>{}</p></div>\n",
                result.headline(),
                result.message()
            ));
        }
        Outcome::Failed(message) => {
            html.push_str(&format!("<div class=\"error\">{}</div>\n", escape(message)));
        }
    }

    html.push_str(FOOTER);
    html.push_str("</body>\n</html>\n");
    html
}

fn slider_html(html: &mut String, slider: &SliderSpec, value: f32) {
    let precision = slider.decimals as usize;
    html.push_str(&format!(
        "<label>{label} <input type=\"range\" name=\"{name}\" min=\"{min:.p$}\" max=\"{max:.p$}\" \
         step=\"{step:.p$}\" value=\"{value:.p$}\" oninput=\"this.nextElementSibling.value = this.value\">\
         <output>{value:.p$}</output></label><br>\n",
        label = slider.label,
        name = slider.name,
        min = slider.min,
        max = slider.max,
        step = slider.step,
        value = value,
        p = precision,
    ));
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
