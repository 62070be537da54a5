// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event browsing, creation and signup routes.

use crate::error::{AppError, Result};
use crate::models::Evento;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/eventos", get(list_eventos).post(crear_evento))
        .route("/api/eventos/{id}", get(get_evento))
        .route(
            "/api/eventos/{id}/asistentes/{usuario_id}",
            post(join_evento),
        )
}

// ─── Browsing ────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventosQuery {
    /// Filter by category tag
    categoria: Option<String>,
    /// Maximum number of events returned
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    50
}

const MAX_LIMIT: u32 = 100;

/// List upcoming events, optionally filtered by category.
async fn list_eventos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventosQuery>,
) -> Result<Json<Vec<Evento>>> {
    if query.limit == 0 || query.limit > MAX_LIMIT {
        return Err(AppError::BadRequest(format!(
            "Invalid 'limit' parameter: must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let eventos = state
        .db
        .list_eventos(query.categoria.as_deref(), query.limit)
        .await?;

    Ok(Json(eventos))
}

/// Get one event.
async fn get_evento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Evento>> {
    let evento = state
        .db
        .get_evento(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evento {} not found", id)))?;

    Ok(Json(evento))
}

// ─── Creation ────────────────────────────────────────────────

/// Event creation payload.
#[derive(Deserialize, Validate)]
pub struct NuevoEvento {
    #[validate(length(min = 1, max = 200))]
    pub titulo: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub descripcion: String,
    #[validate(length(min = 1, max = 50))]
    pub categoria: String,
    #[validate(length(min = 1, max = 200))]
    pub lugar: String,
    /// Scheduled date/time, RFC 3339
    pub fecha: String,
    /// Usuario ID of the organizer
    pub organizador: String,
}

/// Create a new event.
async fn crear_evento(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NuevoEvento>,
) -> Result<Json<Evento>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if chrono::DateTime::parse_from_rfc3339(&payload.fecha).is_err() {
        return Err(AppError::BadRequest(
            "Invalid 'fecha': must be RFC3339 datetime".to_string(),
        ));
    }

    if state.db.get_usuario(&payload.organizador).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Usuario {} not found",
            payload.organizador
        )));
    }

    let evento = Evento {
        evento_id: generar_evento_id(),
        titulo: payload.titulo,
        descripcion: payload.descripcion,
        categoria: payload.categoria,
        lugar: payload.lugar,
        fecha: payload.fecha,
        organizador: payload.organizador,
        asistentes: Vec::new(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.db.create_evento(&evento).await?;

    tracing::info!(
        evento_id = %evento.evento_id,
        categoria = %evento.categoria,
        "Evento created"
    );

    Ok(Json(evento))
}

/// Generate a creation-time document ID for an event.
fn generar_evento_id() -> String {
    format!(
        "ev-{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

// ─── Signup ──────────────────────────────────────────────────

/// Response for an event signup.
#[derive(Serialize)]
pub struct JoinResponse {
    pub evento_id: String,
    /// False when the user was already signed up
    pub joined: bool,
}

/// Sign a user up for an event. Idempotent.
async fn join_evento(
    State(state): State<Arc<AppState>>,
    Path((id, usuario_id)): Path<(String, String)>,
) -> Result<Json<JoinResponse>> {
    if state.db.get_usuario(&usuario_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Usuario {} not found",
            usuario_id
        )));
    }

    let joined = state.db.join_evento(&id, &usuario_id).await?;

    Ok(Json(JoinResponse {
        evento_id: id,
        joined,
    }))
}
