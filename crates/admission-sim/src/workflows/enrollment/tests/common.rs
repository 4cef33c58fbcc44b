use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::workflows::enrollment::access::SharedCodePolicy;
use crate::workflows::enrollment::domain::ApplicantName;
use crate::workflows::enrollment::registry::SessionState;
use crate::workflows::enrollment::service::AdmissionService;
use crate::workflows::enrollment::store::{
    InMemorySessionStore, SessionId, SessionStore, StoreError,
};
use crate::workflows::enrollment::validation::ScoreForm;

pub(super) const TEACHER_CODE: &str = "gr";

pub(super) type MemoryService = AdmissionService<InMemorySessionStore, SharedCodePolicy>;

pub(super) fn name(raw: &str) -> ApplicantName {
    ApplicantName::parse(raw).expect("valid name")
}

pub(super) fn build_service() -> (MemoryService, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::default());
    let policy = Arc::new(SharedCodePolicy::new(TEACHER_CODE));
    (AdmissionService::new(store.clone(), policy), store)
}

pub(super) fn passing_form() -> ScoreForm {
    ScoreForm::new("80", "70", "70", "60")
}

pub(super) fn borderline_form() -> ScoreForm {
    ScoreForm::new("80", "70", "60", "50")
}

pub(super) fn stored_state(store: &InMemorySessionStore, session: &SessionId) -> SessionState {
    store
        .load(session)
        .expect("store readable")
        .expect("session stored")
}

/// Store that refuses every operation.
pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn load(&self, _id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn save(&self, _id: SessionId, _state: SessionState) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Value,
) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serializable body"),
        ))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str, cookie: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(axum::body::Body::empty())
        .expect("request builds")
}

/// `name=value` pair from the response's `Set-Cookie` header.
pub(super) fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .expect("session cookie set")
        .to_string()
}

pub(super) async fn read_body(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (
        status,
        String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let (_, body) = read_body(response).await;
    serde_json::from_str(&body).expect("json body")
}
