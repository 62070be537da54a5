// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Usuarios (profile storage, favorites)
//! - Eventos (event storage, signup)
//! - Raw collection listing/streaming for the export tool

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Evento, Usuario};
use firestore::{FirestoreListCollectionIdsParams, FirestoreListingSupport, FirestoreResult};
use futures_util::stream::BoxStream;
use gcloud_sdk::google::firestore::v1::Document;

// Page size for the export tool's document listing. Keeps memory bounded
// while staying well under Firestore's per-request limits.
const EXPORT_PAGE_SIZE: usize = 300;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Usuario Operations ──────────────────────────────────────

    /// Get a user profile by its ID (email).
    pub async fn get_usuario(&self, usuario_id: &str) -> Result<Option<Usuario>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USUARIOS)
            .obj()
            .one(usuario_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_usuario(&self, usuario: &Usuario) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USUARIOS)
            .document_id(&usuario.email)
            .object(usuario)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Toggle an event in a user's favorites list.
    ///
    /// Uses a transaction so concurrent toggles don't lose updates.
    /// Returns `true` if the event is now a favorite, `false` if it was removed.
    pub async fn toggle_favorito(
        &self,
        usuario_id: &str,
        evento_id: &str,
    ) -> Result<bool, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let usuario: Option<Usuario> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USUARIOS)
            .obj()
            .one(usuario_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(mut usuario) = usuario else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Usuario {} not found",
                usuario_id
            )));
        };

        let ahora_favorito = if let Some(pos) =
            usuario.favoritos.iter().position(|f| f == evento_id)
        {
            usuario.favoritos.remove(pos);
            false
        } else {
            usuario.favoritos.push(evento_id.to_string());
            true
        };
        usuario.last_active = chrono::Utc::now().to_rfc3339();

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USUARIOS)
            .document_id(usuario_id)
            .object(&usuario)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add favorito to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(usuario_id, evento_id, ahora_favorito, "Favorito toggled");

        Ok(ahora_favorito)
    }

    // ─── Evento Operations ───────────────────────────────────────

    /// Get an event by its document ID.
    pub async fn get_evento(&self, evento_id: &str) -> Result<Option<Evento>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTOS)
            .obj()
            .one(evento_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new event. Fails if the document already exists.
    pub async fn create_evento(&self, evento: &Evento) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::EVENTOS)
            .document_id(&evento.evento_id)
            .object(evento)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List events ordered by date, optionally filtered by category.
    pub async fn list_eventos(
        &self,
        categoria: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Evento>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EVENTOS);

        let query = if let Some(categoria) = categoria {
            let categoria = categoria.to_string();
            query.filter(move |q| q.field("categoria").eq(categoria.clone()))
        } else {
            query.filter(|_| None)
        };

        query
            .order_by([("fecha", firestore::FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sign a user up for an event.
    ///
    /// Idempotent: returns `true` if the user was added, `false` if they were
    /// already signed up (no write in that case).
    pub async fn join_evento(&self, evento_id: &str, usuario_id: &str) -> Result<bool, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let evento: Option<Evento> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTOS)
            .obj()
            .one(evento_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(mut evento) = evento else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Evento {} not found",
                evento_id
            )));
        };

        if evento.asistentes.iter().any(|a| a == usuario_id) {
            tracing::debug!(evento_id, usuario_id, "Already signed up (idempotent skip)");
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        evento.asistentes.push(usuario_id.to_string());

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::EVENTOS)
            .document_id(evento_id)
            .object(&evento)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add signup to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            evento_id,
            usuario_id,
            asistentes = evento.asistentes.len(),
            "Usuario signed up for evento"
        );

        Ok(true)
    }

    // ─── Export Support ──────────────────────────────────────────

    /// List the IDs of every top-level collection in the database.
    pub async fn list_collection_ids(&self) -> Result<Vec<String>, AppError> {
        let client = self.get_client()?;

        let mut ids = Vec::new();
        let mut params = FirestoreListCollectionIdsParams::new();
        loop {
            let page = client
                .list_collection_ids(params.clone())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            ids.extend(page.collection_ids);
            match page.page_token {
                Some(token) if !token.is_empty() => params = params.with_page_token(token),
                _ => break,
            }
        }

        Ok(ids)
    }

    /// Stream every raw document in a collection.
    ///
    /// Pagination happens inside the stream, so callers never hold more than
    /// one page of documents in memory.
    pub async fn stream_collection_docs(
        &self,
        collection_id: &str,
    ) -> Result<BoxStream<'_, FirestoreResult<Document>>, AppError> {
        self.get_client()?
            .fluent()
            .list()
            .from(collection_id)
            .page_size(EXPORT_PAGE_SIZE)
            .stream_all_with_errors()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
