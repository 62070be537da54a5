// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exporter behavior tests against in-memory document sources.
//!
//! These pin down the snapshot format, the id-injection semantics and the
//! fail-fast policy: the first collection that fails aborts the rest of
//! the run.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use planazo::export::{DocumentSource, ExportError, Exporter, SourceDocument};
use serde_json::json;
use std::sync::Mutex;

fn doc(id: &str, fields: serde_json::Value) -> SourceDocument {
    match fields {
        serde_json::Value::Object(map) => SourceDocument {
            id: id.to_string(),
            fields: map,
        },
        _ => panic!("test document fields must be an object"),
    }
}

/// In-memory document source with scriptable failures.
struct MemorySource {
    collections: Vec<(String, Vec<SourceDocument>)>,
    fail_discovery: bool,
    /// Collection whose document stream errors after its documents
    fail_streaming: Option<String>,
    /// Collections whose documents were requested, in order
    streamed: Mutex<Vec<String>>,
}

impl MemorySource {
    fn new(collections: Vec<(&str, Vec<SourceDocument>)>) -> Self {
        Self {
            collections: collections
                .into_iter()
                .map(|(name, docs)| (name.to_string(), docs))
                .collect(),
            fail_discovery: false,
            fail_streaming: None,
            streamed: Mutex::new(Vec::new()),
        }
    }

    fn failing_discovery() -> Self {
        let mut source = Self::new(vec![]);
        source.fail_discovery = true;
        source
    }

    fn streamed(&self) -> Vec<String> {
        self.streamed.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn list_collections(&self) -> anyhow::Result<Vec<String>> {
        if self.fail_discovery {
            anyhow::bail!("simulated network error");
        }
        Ok(self.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn stream_documents<'a>(
        &'a self,
        collection_id: &str,
    ) -> anyhow::Result<BoxStream<'a, anyhow::Result<SourceDocument>>> {
        self.streamed.lock().unwrap().push(collection_id.to_string());

        let docs = self
            .collections
            .iter()
            .find(|(name, _)| name == collection_id)
            .map(|(_, docs)| docs.clone())
            .unwrap_or_default();

        let mut items: Vec<anyhow::Result<SourceDocument>> = docs.into_iter().map(Ok).collect();
        if self.fail_streaming.as_deref() == Some(collection_id) {
            items.push(Err(anyhow::anyhow!("simulated retrieval failure")));
        }

        Ok(stream::iter(items).boxed())
    }
}

fn usuarios_eventos_source() -> MemorySource {
    MemorySource::new(vec![
        (
            "usuarios",
            vec![
                doc(
                    "ana@example.com",
                    json!({"nombre": "Ana", "apellidos": "García", "intereses": ["musica"]}),
                ),
                doc(
                    "luis@example.com",
                    json!({"nombre": "Luis", "apellidos": "Pérez", "ciudad": "Madrid"}),
                ),
            ],
        ),
        ("eventos", vec![]),
    ])
}

fn read_snapshot(dir: &tempfile::TempDir, collection: &str) -> Vec<serde_json::Value> {
    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", collection)))
        .expect("snapshot file should exist");
    serde_json::from_str(&raw).expect("snapshot should be a JSON array")
}

// ─── Snapshot contents ───────────────────────────────────────

#[tokio::test]
async fn test_usuarios_and_empty_eventos_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(usuarios_eventos_source(), dir.path());

    let summary = exporter.export_all().await.unwrap();

    assert_eq!(summary.total_collections(), 2);
    assert_eq!(summary.collections[0].collection_id, "usuarios");
    assert_eq!(summary.collections[0].records, 2);
    assert_eq!(summary.collections[1].collection_id, "eventos");
    assert_eq!(summary.collections[1].records, 0);

    let usuarios = read_snapshot(&dir, "usuarios");
    assert_eq!(usuarios.len(), 2);
    for record in &usuarios {
        assert!(record.get("id").is_some(), "every record carries an id");
    }

    let eventos = read_snapshot(&dir, "eventos");
    assert!(eventos.is_empty());
}

#[tokio::test]
async fn test_record_preserves_all_document_fields() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(usuarios_eventos_source(), dir.path());
    exporter.export_all().await.unwrap();

    let usuarios = read_snapshot(&dir, "usuarios");
    let ana = usuarios
        .iter()
        .find(|r| r["id"] == json!("ana@example.com"))
        .expect("ana should be exported");

    assert_eq!(ana["nombre"], json!("Ana"));
    assert_eq!(ana["apellidos"], json!("García"));
    assert_eq!(ana["intereses"], json!(["musica"]));
}

#[tokio::test]
async fn test_injected_id_overwrites_document_id_field() {
    let source = MemorySource::new(vec![(
        "usuarios",
        vec![doc("doc-7", json!({"id": "stale-value", "nombre": "Eva"}))],
    )]);
    let dir = tempfile::tempdir().unwrap();
    Exporter::new(source, dir.path()).export_all().await.unwrap();

    let usuarios = read_snapshot(&dir, "usuarios");
    assert_eq!(usuarios.len(), 1);
    assert_eq!(usuarios[0]["id"], json!("doc-7"));
    assert_eq!(usuarios[0]["nombre"], json!("Eva"));
}

#[tokio::test]
async fn test_snapshot_is_pretty_printed() {
    let dir = tempfile::tempdir().unwrap();
    Exporter::new(usuarios_eventos_source(), dir.path())
        .export_all()
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("usuarios.json")).unwrap();
    assert!(raw.starts_with("[\n  {\n    \""), "two-space indentation: {raw:?}");
}

// ─── Idempotence ─────────────────────────────────────────────

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(usuarios_eventos_source(), dir.path());

    exporter.export_all().await.unwrap();
    let first = std::fs::read(dir.path().join("usuarios.json")).unwrap();

    exporter.export_all().await.unwrap();
    let second = std::fs::read(dir.path().join("usuarios.json")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rerun_after_change_leaves_other_collections_identical() {
    let dir = tempfile::tempdir().unwrap();

    Exporter::new(usuarios_eventos_source(), dir.path())
        .export_all()
        .await
        .unwrap();
    let eventos_before = std::fs::read(dir.path().join("eventos.json")).unwrap();
    let usuarios_before = std::fs::read(dir.path().join("usuarios.json")).unwrap();

    // Same database except one more usuario
    let mut changed = usuarios_eventos_source();
    changed.collections[0]
        .1
        .push(doc("eva@example.com", json!({"nombre": "Eva"})));
    Exporter::new(changed, dir.path()).export_all().await.unwrap();

    let eventos_after = std::fs::read(dir.path().join("eventos.json")).unwrap();
    let usuarios_after = std::fs::read(dir.path().join("usuarios.json")).unwrap();

    assert_eq!(eventos_before, eventos_after);
    assert_ne!(usuarios_before, usuarios_after);
    assert_eq!(read_snapshot(&dir, "usuarios").len(), 3);
}

// ─── Failure policy ──────────────────────────────────────────

#[tokio::test]
async fn test_discovery_failure_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = Exporter::new(MemorySource::failing_discovery(), dir.path())
        .export_all()
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Discovery(_)));
    assert_eq!(
        std::fs::read_dir(dir.path()).unwrap().count(),
        0,
        "no snapshot files on discovery failure"
    );
}

#[tokio::test]
async fn test_write_failure_aborts_remaining_collections() {
    // Using a plain file as the output directory makes every write fail.
    let not_a_dir = tempfile::NamedTempFile::new().unwrap();
    let source = usuarios_eventos_source();

    let err = Exporter::new(&source, not_a_dir.path())
        .export_all()
        .await
        .unwrap_err();

    match err {
        ExportError::Collection { collection, .. } => assert_eq!(collection, "usuarios"),
        other => panic!("expected Collection error, got {other:?}"),
    }
    // "eventos" comes after "usuarios" and must never be attempted
    assert_eq!(source.streamed(), vec!["usuarios".to_string()]);
}

#[tokio::test]
async fn test_midstream_retrieval_failure_leaves_no_snapshot() {
    let mut source = usuarios_eventos_source();
    source.fail_streaming = Some("usuarios".to_string());
    let dir = tempfile::tempdir().unwrap();

    let err = Exporter::new(source, dir.path()).export_all().await.unwrap_err();

    assert!(matches!(
        err,
        ExportError::Collection { ref collection, .. } if collection == "usuarios"
    ));
    assert!(!dir.path().join("usuarios.json").exists());
    assert!(!dir.path().join("usuarios.json.tmp").exists());
    assert!(!dir.path().join("eventos.json").exists());
}

// ─── Streaming ───────────────────────────────────────────────

/// Source that generates documents lazily, never holding the collection
/// in memory.
struct LargeSource {
    count: usize,
}

#[async_trait]
impl DocumentSource for LargeSource {
    async fn list_collections(&self) -> anyhow::Result<Vec<String>> {
        Ok(vec!["grande".to_string()])
    }

    async fn stream_documents<'a>(
        &'a self,
        _collection_id: &str,
    ) -> anyhow::Result<BoxStream<'a, anyhow::Result<SourceDocument>>> {
        Ok(stream::iter(0..self.count)
            .map(|i| Ok(doc(&format!("doc-{i}"), json!({"n": i}))))
            .boxed())
    }
}

#[tokio::test]
async fn test_large_collection_is_streamed() {
    let dir = tempfile::tempdir().unwrap();
    let summary = Exporter::new(LargeSource { count: 10_000 }, dir.path())
        .export_all()
        .await
        .unwrap();

    assert_eq!(summary.total_records(), 10_000);
    assert_eq!(read_snapshot(&dir, "grande").len(), 10_000);
}

#[tokio::test]
async fn test_empty_database_exports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let summary = Exporter::new(MemorySource::new(vec![]), dir.path())
        .export_all()
        .await
        .unwrap();

    assert_eq!(summary.total_collections(), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
