// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Planazo: event signup backend.
//!
//! This crate provides the HTTP API for user registration, event creation
//! and signup, plus a one-shot utility that exports every Firestore
//! collection to local JSON snapshots.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod routes;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
