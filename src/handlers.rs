use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

use crate::error::{InquiryError, SubmitError};
use crate::models::{BookingInquiry, RawLabel, Verdict};
use crate::page::{self, Outcome};
use crate::pipeline::Pipeline;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(index))
            .route(web::post().to(submit)),
    );
}

pub async fn index() -> HttpResponse {
    html(page::render(None))
}

/// Runs the submitted form through the pipeline. Whatever happens, the answer
/// is the form page with a result block; failures are shown inline.
pub async fn submit(pipeline: web::Data<Pipeline>, body: web::Bytes) -> HttpResponse {
    let pipeline = pipeline.into_inner();

    // inference is CPU bound, keep it off the async workers
    let outcome = match web::block(move || evaluate(&pipeline, &body)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // a panic inside the model lands here
            warn!(error = %e, "prediction worker did not complete");
            Outcome::Failure(SubmitError::Aborted.to_string())
        }
    };

    html(page::render(Some(&outcome)))
}

fn evaluate(pipeline: &Pipeline, body: &[u8]) -> Outcome {
    match classify(pipeline, body) {
        Ok(raw) => {
            info!(%raw, "raw model prediction");
            Outcome::Prediction(Verdict::from_raw(&raw))
        }
        Err(e) => {
            warn!(error = %e, "booking prediction failed");
            Outcome::Failure(e.to_string())
        }
    }
}

fn classify(pipeline: &Pipeline, body: &[u8]) -> Result<RawLabel, SubmitError> {
    let form: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(InquiryError::from)?;
    let inquiry = BookingInquiry::from_form(&form)?;
    Ok(pipeline.predict(inquiry)?)
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}
