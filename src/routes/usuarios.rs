// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration, profile and favorites routes.

use crate::error::{AppError, Result};
use crate::models::Usuario;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/usuarios", post(registrar_usuario))
        .route(
            "/api/usuarios/{id}",
            get(get_usuario).put(actualizar_usuario),
        )
        .route(
            "/api/usuarios/{id}/favoritos/{evento_id}",
            post(toggle_favorito),
        )
}

// ─── Registration ────────────────────────────────────────────

/// Registration form payload.
#[derive(Deserialize, Validate)]
pub struct RegistroUsuario {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100))]
    pub apellidos: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 100))]
    pub ciudad: Option<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub intereses: Vec<String>,
}

/// Register a new user.
///
/// The email doubles as the document ID, so re-registering an existing
/// address is rejected instead of silently overwriting the profile.
async fn registrar_usuario(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegistroUsuario>,
) -> Result<Json<Usuario>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if state.db.get_usuario(&payload.email).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "Usuario {} already registered",
            payload.email
        )));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let usuario = Usuario {
        nombre: payload.nombre,
        apellidos: payload.apellidos,
        email: payload.email,
        ciudad: payload.ciudad,
        intereses: payload.intereses,
        favoritos: Vec::new(),
        created_at: now.clone(),
        last_active: now,
    };

    state.db.upsert_usuario(&usuario).await?;

    tracing::info!(usuario_id = %usuario.email, "Usuario registered");

    Ok(Json(usuario))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get a user profile.
async fn get_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Usuario>> {
    let usuario = state
        .db
        .get_usuario(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Usuario {} not found", id)))?;

    Ok(Json(usuario))
}

/// Profile update payload. Email and favorites are managed elsewhere.
#[derive(Deserialize, Validate)]
pub struct PerfilUpdate {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100))]
    pub apellidos: String,
    #[validate(length(max = 100))]
    pub ciudad: Option<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub intereses: Vec<String>,
}

/// Update a user's profile fields.
///
/// Fetch-modify-write to preserve email, favorites and created_at.
async fn actualizar_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<PerfilUpdate>,
) -> Result<Json<Usuario>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut usuario = state
        .db
        .get_usuario(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Usuario {} not found", id)))?;

    usuario.nombre = payload.nombre;
    usuario.apellidos = payload.apellidos;
    usuario.ciudad = payload.ciudad;
    usuario.intereses = payload.intereses;
    usuario.last_active = chrono::Utc::now().to_rfc3339();

    state.db.upsert_usuario(&usuario).await?;

    Ok(Json(usuario))
}

// ─── Favorites ───────────────────────────────────────────────

/// Response for a favorite toggle.
#[derive(Serialize)]
pub struct FavoritoResponse {
    pub evento_id: String,
    pub favorito: bool,
}

/// Toggle an event in the user's favorites.
async fn toggle_favorito(
    State(state): State<Arc<AppState>>,
    Path((id, evento_id)): Path<(String, String)>,
) -> Result<Json<FavoritoResponse>> {
    // Reject favorites pointing at events that don't exist
    if state.db.get_evento(&evento_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Evento {} not found",
            evento_id
        )));
    }

    let favorito = state.db.toggle_favorito(&id, &evento_id).await?;

    Ok(Json(FavoritoResponse {
        evento_id,
        favorito,
    }))
}
