// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot export of every Firestore collection to local JSON snapshots.
//!
//! Writes one `<collection>.json` per collection into the current working
//! directory, overwriting any previous snapshot. No flags: configuration
//! comes from the environment, the service account key from
//! `GOOGLE_APPLICATION_CREDENTIALS` (default `serviceAccountKey.json`).
//! Exit status is non-zero on any failure.

use planazo::config::Config;
use planazo::db::FirestoreDb;
use planazo::export::{credentials, Exporter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;

    // Against the emulator no key file exists; otherwise a bad key file
    // must fail before any network call.
    let project_id = if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
        config.gcp_project_id.clone()
    } else {
        let key = credentials::load_service_account(&config.credentials_path)?;
        std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", &config.credentials_path);
        tracing::info!(
            project = %key.project_id,
            account = %key.client_email,
            "Credentials loaded"
        );
        key.project_id
    };

    let db = FirestoreDb::new(&project_id).await?;

    let exporter = Exporter::new(db, std::env::current_dir()?);
    exporter.export_all().await?;

    Ok(())
}

/// Human-readable logging for the CLI (the API server logs JSON instead).
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
