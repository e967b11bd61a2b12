use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_types::{Education, User};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::crypto::FieldCipher;
use crate::error::{ApiError, SubmitError};
use crate::json::Pretty;
use crate::pipeline::Submission;
use crate::state::AppState;

pub const WELCOME: &str = "Welcome to the server side of my resume";

pub fn router(state: AppState) -> Router {
    let port = state.port;
    let not_found = move || async move {
        (
            StatusCode::NOT_FOUND,
            format!("404 - Resource Not Found at {port}"),
        )
    };

    let assets = ServeDir::new(state.assets_dir.join("personalResumeImages"))
        .call_fallback_on_method_not_allowed(true)
        .fallback(
            ServeDir::new(state.assets_dir.join("slotScholarsImages"))
                .call_fallback_on_method_not_allowed(true)
                .fallback(not_found.into_service()),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { WELCOME }))
        .route("/livez", get(|| async { "OK" }))
        .route("/readyz", get(readyz))
        .route("/Owner", get(owner))
        .route("/Links/{user_id}", get(links))
        .route("/Skills/{user_id}", get(skills))
        .route("/Projects/{user_id}", get(projects))
        .route("/Education/{education_id}", get(education))
        .route("/SendNewMessage", post(send_new_message))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn readyz(State(state): State<AppState>) -> Response {
    for (name, database) in &state.databases {
        if let Err(e) = database.ping().await {
            tracing::warn!(database = name, "readiness check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response();
        }
    }
    "OK".into_response()
}

async fn owner(State(state): State<AppState>) -> Result<Pretty<Vec<User>>, ApiError> {
    let owners = state
        .store
        .find_users_by_name(&state.owner_name)
        .await
        .map_err(|e| ApiError::store("Error getting the owner of this webpage", e))?;

    if owners.is_empty() {
        return Err(ApiError::NotFound("Owner not found"));
    }

    Ok(Pretty(
        owners
            .into_iter()
            .map(|user| seal_contact_email(&state.cipher, user))
            .collect(),
    ))
}

/// Makes sure the contact email leaves the server encrypted, whether or not
/// the stored row already was.
fn seal_contact_email(cipher: &FieldCipher, mut user: User) -> User {
    if let Some(email) = user.contact.email.take() {
        let sealed = if cipher.decrypt(&email).is_ok() {
            email
        } else {
            cipher.encrypt(&email)
        };
        user.contact.email = Some(sealed);
    }
    user
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Links,
    Skills,
    Projects,
}

impl Section {
    fn label(self) -> &'static str {
        match self {
            Section::Links => "links",
            Section::Skills => "skills",
            Section::Projects => "projects",
        }
    }

    fn ids(self, user: &User) -> &[Uuid] {
        match self {
            Section::Links => &user.links,
            Section::Skills => &user.skills,
            Section::Projects => &user.projects,
        }
    }
}

async fn links(state: State<AppState>, user_id: Path<String>) -> Result<Response, ApiError> {
    user_section(state, user_id, Section::Links).await
}

async fn skills(state: State<AppState>, user_id: Path<String>) -> Result<Response, ApiError> {
    user_section(state, user_id, Section::Skills).await
}

async fn projects(state: State<AppState>, user_id: Path<String>) -> Result<Response, ApiError> {
    user_section(state, user_id, Section::Projects).await
}

/// Resolves one of the id arrays on a user. Unknown users and empty arrays
/// both give `[]`.
async fn user_section(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    section: Section,
) -> Result<Response, ApiError> {
    let user_id = Uuid::parse_str(&user_id).map_err(|_| ApiError::BadRequest("Invalid user ID"))?;
    let store_error = |e: sqlx::Error| {
        ApiError::store(format!("Error retrieving {} for the user", section.label()), e)
    };

    let user = state.store.find_user(user_id).await.map_err(store_error)?;
    let ids = match &user {
        Some(user) if !section.ids(user).is_empty() => section.ids(user),
        _ => return Ok(Pretty(json!([])).into_response()),
    };

    let response = match section {
        Section::Links => {
            Pretty(state.store.find_links(ids).await.map_err(store_error)?).into_response()
        }
        Section::Skills => {
            Pretty(state.store.find_skills(ids).await.map_err(store_error)?).into_response()
        }
        Section::Projects => {
            Pretty(state.store.find_projects(ids).await.map_err(store_error)?).into_response()
        }
    };
    Ok(response)
}

async fn education(
    State(state): State<AppState>,
    Path(education_id): Path<String>,
) -> Result<Pretty<Education>, ApiError> {
    let education_id =
        Uuid::parse_str(&education_id).map_err(|_| ApiError::BadRequest("Invalid education ID"))?;

    state
        .store
        .find_education(education_id)
        .await
        .map_err(|e| ApiError::store("Error getting the education", e))?
        .map(Pretty)
        .ok_or(ApiError::NotFound("Education not found"))
}

async fn send_new_message(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Pretty<Value>, SubmitError> {
    let Json(submission) = payload.map_err(|e| {
        tracing::debug!("Rejected message body: {e}");
        SubmitError::InvalidBody
    })?;

    state.intake.submit(&submission).await?;

    Ok(Pretty(json!({ "message": "Message sent successfully." })))
}
