use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::access::AccessPolicy;
use super::domain::AttemptView;
use super::service::{AdmissionService, AdmissionServiceError};
use super::store::{SessionId, SessionStore};
use super::validation::ScoreForm;

pub const SESSION_COOKIE: &str = "admission_session";

#[derive(Debug, Clone, Deserialize)]
pub struct StudentSignIn {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherSignIn {
    #[serde(default)]
    pub code: String,
}

/// Router builder exposing the student and teacher endpoints.
pub fn admission_router<S, P>(service: Arc<AdmissionService<S, P>>) -> Router
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    Router::new()
        .route(
            "/api/v1/students/session",
            post(student_session_handler::<S, P>).delete(sign_out_handler::<S, P>),
        )
        .route("/api/v1/students/menu", get(menu_handler::<S, P>))
        .route(
            "/api/v1/students/registration",
            post(registration_handler::<S, P>),
        )
        .route(
            "/api/v1/students/simulations",
            get(history_handler::<S, P>).post(simulation_handler::<S, P>),
        )
        .route("/api/v1/teachers/session", post(teacher_session_handler::<S, P>))
        .route("/api/v1/applicants", get(applicants_handler::<S, P>))
        .route("/api/v1/applicants/export", get(export_handler::<S, P>))
        .with_state(service)
}

pub(crate) async fn student_session_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
    Json(request): Json<StudentSignIn>,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    match service.start_session(session_from_headers(&headers), &request.name) {
        Ok(ticket) => with_session_cookie(
            ticket.session_id,
            (StatusCode::OK, Json(json!({ "name": ticket.identity }))),
        ),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sign_out_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    if let Some(session) = session_from_headers(&headers) {
        if let Err(err) = service.sign_out(&session) {
            return error_response(err);
        }
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

pub(crate) async fn menu_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    let Some(session) = session_from_headers(&headers) else {
        return error_response(AdmissionServiceError::NotSignedIn);
    };

    match service.menu(&session) {
        Ok(menu) => (StatusCode::OK, Json(menu)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn registration_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
    Json(form): Json<ScoreForm>,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    let Some(session) = session_from_headers(&headers) else {
        return error_response(AdmissionServiceError::NotSignedIn);
    };

    match service.register(&session, &form) {
        Ok(outcome) => {
            let status = if outcome.newly_registered {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            let payload = json!({
                "applicant": outcome.record.view(),
                "newly_registered": outcome.newly_registered,
            });
            (status, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn simulation_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
    Json(form): Json<ScoreForm>,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    let Some(session) = session_from_headers(&headers) else {
        return error_response(AdmissionServiceError::NotSignedIn);
    };

    match service.simulate(&session, &form) {
        Ok(outcome) => {
            let history: Vec<AttemptView> = outcome.history.iter().map(|a| a.view()).collect();
            let payload = json!({
                "verdict": outcome.verdict().label(),
                "average": outcome.attempt.average,
                "history": history,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    let Some(session) = session_from_headers(&headers) else {
        return error_response(AdmissionServiceError::NotSignedIn);
    };

    match service.history(&session) {
        Ok(history) => {
            let history: Vec<AttemptView> = history.iter().map(|a| a.view()).collect();
            (StatusCode::OK, Json(json!({ "history": history }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn teacher_session_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
    Json(request): Json<TeacherSignIn>,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    match service.teacher_sign_in(session_from_headers(&headers), &request.code) {
        Ok(session_id) => with_session_cookie(
            session_id,
            (StatusCode::OK, Json(json!({ "role": "teacher" }))),
        ),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn applicants_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    let Some(session) = session_from_headers(&headers) else {
        return error_response(AdmissionServiceError::Forbidden);
    };

    match service.applicants(&session) {
        Ok(records) => {
            let applicants: Vec<_> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, Json(json!({ "applicants": applicants }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<S, P>(
    State(service): State<Arc<AdmissionService<S, P>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    P: AccessPolicy + 'static,
{
    let Some(session) = session_from_headers(&headers) else {
        return error_response(AdmissionServiceError::Forbidden);
    };

    match service.export_applicants_csv(&session) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Pull the session id out of the `Cookie` header(s). Unparseable ids count as absent.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

fn with_session_cookie(session: SessionId, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    let cookie = format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

pub(crate) fn error_response(err: AdmissionServiceError) -> Response {
    let status = match &err {
        AdmissionServiceError::EmptyName(_) | AdmissionServiceError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AdmissionServiceError::NotSignedIn | AdmissionServiceError::Unauthorized => {
            StatusCode::UNAUTHORIZED
        }
        AdmissionServiceError::Forbidden => StatusCode::FORBIDDEN,
        AdmissionServiceError::Store(_) | AdmissionServiceError::Export(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &err {
        AdmissionServiceError::Validation(validation) => json!({
            "error": err.to_string(),
            "field": validation.field().map(|field| field.key()),
        }),
        _ => json!({ "error": err.to_string() }),
    };
    (status, Json(payload)).into_response()
}
