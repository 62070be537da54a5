// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot export of every collection in the database to local JSON
//! snapshot files.
//!
//! Collections are processed one at a time; each one is streamed into
//! `<collection>.json` (pretty-printed array of documents, each with an
//! injected `id` field) via a temp file that is renamed into place, so a
//! snapshot file is never left partially written.
//!
//! Failure policy: the first collection that fails to export aborts the
//! remaining run. The tool is an occasional backup utility, so a clean
//! failure the operator can re-run beats a mix of fresh and stale
//! snapshots.

pub mod convert;
pub mod credentials;
pub mod source;

pub use source::{DocumentSource, SourceDocument};

use futures_util::StreamExt;
use serde::ser::{SerializeSeq, Serializer as _};
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Errors produced by an export run.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The service account key file is missing or unparsable.
    /// Surfaced before any network call.
    #[error("Failed to load credentials: {0}")]
    Credential(String),

    /// Enumerating collections failed. No snapshot files were written.
    #[error("Failed to enumerate collections: {0}")]
    Discovery(String),

    /// Retrieval, serialization or write failed for one collection.
    /// Collections after this one are not attempted.
    #[error("Export of collection '{collection}' failed: {reason}")]
    Collection { collection: String, reason: String },
}

/// Record count for one exported collection.
#[derive(Debug, Clone)]
pub struct CollectionExport {
    pub collection_id: String,
    pub records: usize,
}

/// Summary of a successful export run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub collections: Vec<CollectionExport>,
}

impl ExportSummary {
    pub fn total_collections(&self) -> usize {
        self.collections.len()
    }

    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.records).sum()
    }
}

/// Exports every collection of a [`DocumentSource`] to an output directory.
pub struct Exporter<S> {
    source: S,
    output_dir: PathBuf,
}

impl<S: DocumentSource> Exporter<S> {
    pub fn new(source: S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
        }
    }

    /// Export every collection, sequentially, one snapshot file each.
    ///
    /// Existing snapshot files are overwritten. The completion log line is
    /// emitted only after the last collection's file write has finished.
    pub async fn export_all(&self) -> Result<ExportSummary, ExportError> {
        let collection_ids = self
            .source
            .list_collections()
            .await
            .map_err(|e| ExportError::Discovery(e.to_string()))?;

        let mut summary = ExportSummary::default();
        for collection_id in collection_ids {
            tracing::info!(collection = %collection_id, "exportando colección");
            let records = self.export_collection(&collection_id).await?;
            tracing::info!(collection = %collection_id, records, "colección exportada");
            summary.collections.push(CollectionExport {
                collection_id,
                records,
            });
        }

        tracing::info!(
            collections = summary.total_collections(),
            records = summary.total_records(),
            "exportación completa"
        );

        Ok(summary)
    }

    /// Export one collection through a temp file renamed into place.
    async fn export_collection(&self, collection_id: &str) -> Result<usize, ExportError> {
        let final_path = self.output_dir.join(format!("{}.json", collection_id));
        let tmp_path = self.output_dir.join(format!("{}.json.tmp", collection_id));

        match self.write_snapshot(collection_id, &tmp_path).await {
            Ok(records) => {
                std::fs::rename(&tmp_path, &final_path)
                    .map_err(|e| collection_error(collection_id, e))?;
                Ok(records)
            }
            Err(e) => {
                let _ = std::fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }

    /// Stream a collection's documents into `path` as a pretty-printed
    /// JSON array, one record at a time.
    async fn write_snapshot(&self, collection_id: &str, path: &Path) -> Result<usize, ExportError> {
        let mut stream = self
            .source
            .stream_documents(collection_id)
            .await
            .map_err(|e| collection_error(collection_id, e))?;

        let file = std::fs::File::create(path).map_err(|e| collection_error(collection_id, e))?;
        let mut ser = serde_json::Serializer::pretty(std::io::BufWriter::new(file));
        let mut seq = (&mut ser)
            .serialize_seq(None)
            .map_err(|e| collection_error(collection_id, e))?;

        let mut records = 0usize;
        while let Some(doc) = stream.next().await {
            let doc = doc.map_err(|e| collection_error(collection_id, e))?;
            seq.serialize_element(&export_record(doc))
                .map_err(|e| collection_error(collection_id, e))?;
            records += 1;
        }
        seq.end()
            .map_err(|e| collection_error(collection_id, e))?;

        ser.into_inner()
            .flush()
            .map_err(|e| collection_error(collection_id, e))?;

        Ok(records)
    }
}

fn collection_error(collection_id: &str, reason: impl ToString) -> ExportError {
    ExportError::Collection {
        collection: collection_id.to_string(),
        reason: reason.to_string(),
    }
}

/// Merge a document's fields with its ID into one flat export record.
///
/// The injected `id` wins over a field literally named `id`.
fn export_record(doc: SourceDocument) -> serde_json::Map<String, serde_json::Value> {
    let SourceDocument { id, mut fields } = doc;
    fields.insert("id".to_string(), serde_json::Value::String(id));
    fields
}
