//! Survey routes.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::ApiError;
use crate::services::survey::{self, Audience, SurveyReceipt, SurveySubmission};
use crate::site::{SurveyCta, survey_ctas};
use crate::state::AppState;

/// `GET /api/surveys`: both survey calls to action.
pub async fn list_surveys(State(state): State<AppState>) -> Json<Vec<SurveyCta>> {
    Json(survey_ctas(&state.config))
}

/// `POST /api/surveys/{audience}`: validate and log a submission.
pub async fn submit_survey(
    Path(audience): Path<String>,
    payload: Result<Json<SurveySubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<SurveyReceipt>), ApiError> {
    let audience: Audience = audience
        .parse()
        .map_err(|_| ApiError::NotFound(format!("survey `{audience}`")))?;
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let response = body.validate().map_err(ApiError::Validation)?;
    let receipt = survey::record(audience, &response);
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}
