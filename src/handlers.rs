use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

use crate::classifier::{self, WineClassifier};
use crate::collector::FormInput;
use crate::error::InvocationError;
use crate::models::{ModelInfo, PredictionRequest, PredictionResponse, PredictionResult};
use crate::page::{self, Outcome};

/// Read-only state shared by every worker.
pub struct AppState<C> {
    pub classifier: Arc<C>,
    pub model_path: String,
}

pub fn routes<C: WineClassifier + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/predict").route(web::post().to(predict_page::<C>)))
        .service(web::resource("/api/predict").route(web::post().to(predict_json::<C>)))
        .service(web::resource("/api/model-info").route(web::get().to(model_info::<C>)))
        .service(web::resource("/api/health").route(web::get().to(health)));
}

async fn run_prediction<C: WineClassifier + 'static>(
    state: &AppState<C>,
    request: PredictionRequest,
) -> Result<PredictionResult, InvocationError> {
    let model = Arc::clone(&state.classifier);
    web::block(move || classifier::predict(model.as_ref(), &request))
        .await
        .map_err(|e| InvocationError::Blocking(e.to_string()))?
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub async fn index() -> impl Responder {
    html(page::render(&PredictionRequest::default(), Outcome::Empty))
}

pub async fn predict_page<C: WineClassifier + 'static>(
    state: web::Data<AppState<C>>,
    form: web::Form<FormInput>,
) -> HttpResponse {
    let request = form.collect();

    match run_prediction(&state, request).await {
        Ok(result) => {
            info!(
                "Page prediction: {:?} (probability good {:.3})",
                result.quality, result.probability_good
            );
            html(page::render(&request, Outcome::Verdict(&result)))
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::html())
                .body(page::render(&request, Outcome::Failed(&e.to_string())))
        }
    }
}

pub async fn predict_json<C: WineClassifier + 'static>(
    state: web::Data<AppState<C>>,
    input: web::Json<FormInput>,
) -> Result<HttpResponse, InvocationError> {
    let request = input.collect();

    let result = run_prediction(&state, request).await.map_err(|e| {
        error!("Prediction failed: {}", e);
        e
    })?;

    let response = PredictionResponse::new(request, &result);
    info!(
        "Prediction {}: {:?} (probability good {:.3})",
        response.request_id, response.quality, response.probability_good
    );
    Ok(HttpResponse::Ok().json(response))
}

pub async fn model_info<C: WineClassifier + 'static>(
    state: web::Data<AppState<C>>,
) -> impl Responder {
    HttpResponse::Ok().json(ModelInfo::new(state.model_path.clone()))
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    use super::*;
    use crate::classifier::tests::LogisticClassifier;
    use crate::classifier::ModelOutput;

    struct BrokenClassifier;

    impl WineClassifier for BrokenClassifier {
        fn classify(&self, _: &[f32; 6]) -> Result<ModelOutput, InvocationError> {
            Err(InvocationError::Inference("input shape mismatch".to_string()))
        }
    }

    fn state<C>(classifier: C) -> web::Data<AppState<C>> {
        web::Data::new(AppState {
            classifier: Arc::new(classifier),
            model_path: "test.onnx".to_string(),
        })
    }

    #[actix_rt::test]
    async fn index_serves_the_form() {
        let app = test::init_service(
            App::new()
                .app_data(state(LogisticClassifier))
                .configure(routes::<LogisticClassifier>),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).expect("utf8");
        assert!(body.contains("Check quality"));
        assert!(body.contains("name=\"sulphates\""));
    }

    #[actix_rt::test]
    async fn form_submission_renders_verdict() {
        let app = test::init_service(
            App::new()
                .app_data(state(LogisticClassifier))
                .configure(routes::<LogisticClassifier>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_form([
                ("color", "white"),
                ("alcohol", "13.0"),
                ("residual_sugar", "2.0"),
                ("ph", "3.2"),
                ("volatile_acidity", "0.3"),
                ("sulphates", "0.7"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).expect("utf8");
        assert!(body.contains("<div class=\"success\"><strong>GOOD (probability: "));
        assert!(!body.contains("NOT GOOD"));
        assert!(body.contains("value=\"white\" checked"));
    }

    #[actix_rt::test]
    async fn json_prediction_is_deterministic() {
        let app = test::init_service(
            App::new()
                .app_data(state(LogisticClassifier))
                .configure(routes::<LogisticClassifier>),
        )
        .await;

        let mut seen = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/predict")
                .set_json(json!({}))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            let good = body["probability_good"].as_f64().expect("probability");
            let not_good = body["probability_not_good"].as_f64().expect("probability");
            assert!((0.0..=1.0).contains(&good));
            assert!((good + not_good - 1.0).abs() < 1e-6);
            assert_eq!(body["request"]["alcohol"], json!(12.5));
            seen.push((body["quality"].clone(), body["verdict"].clone()));
        }
        assert_eq!(seen[0], seen[1]);
    }

    #[actix_rt::test]
    async fn out_of_range_json_is_pinned_to_slider_bounds() {
        let app = test::init_service(
            App::new()
                .app_data(state(LogisticClassifier))
                .configure(routes::<LogisticClassifier>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "alcohol": 99.0, "residual_sugar": -1.0 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["request"]["alcohol"], json!(15.0));
        assert_eq!(body["request"]["residual_sugar"], json!(0.0));
    }

    #[actix_rt::test]
    async fn invocation_failure_is_reported() {
        let app = test::init_service(
            App::new()
                .app_data(state(BrokenClassifier))
                .configure(routes::<BrokenClassifier>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("input shape mismatch"));

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_form([("color", "red")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).expect("utf8");
        assert!(body.contains("input shape mismatch"));
    }

    #[actix_rt::test]
    async fn model_info_and_health() {
        let app = test::init_service(
            App::new()
                .app_data(state(LogisticClassifier))
                .configure(routes::<LogisticClassifier>),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/model-info").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["model_path"], "test.onnx");
        assert_eq!(body["features"].as_array().expect("features").len(), 6);
        assert_eq!(body["features"][3]["column"], "pH");

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
