// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Source seam between the exporter and the document store.
//!
//! The exporter only needs to enumerate collections and stream documents,
//! so it consumes this trait instead of a concrete client. Tests drive it
//! with in-memory sources.

use crate::db::FirestoreDb;
use crate::export::convert;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

/// One schema-less document pulled from a source collection.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Document ID, unique within its collection.
    pub id: String,
    /// Field mapping, already converted to plain JSON.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Minimal interface the exporter needs from a document store.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Enumerate all top-level collection IDs.
    async fn list_collections(&self) -> anyhow::Result<Vec<String>>;

    /// Stream every document in a collection, as of call time.
    async fn stream_documents<'a>(
        &'a self,
        collection_id: &str,
    ) -> anyhow::Result<BoxStream<'a, anyhow::Result<SourceDocument>>>;
}

#[async_trait]
impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    async fn list_collections(&self) -> anyhow::Result<Vec<String>> {
        (**self).list_collections().await
    }

    async fn stream_documents<'a>(
        &'a self,
        collection_id: &str,
    ) -> anyhow::Result<BoxStream<'a, anyhow::Result<SourceDocument>>> {
        (**self).stream_documents(collection_id).await
    }
}

#[async_trait]
impl DocumentSource for FirestoreDb {
    async fn list_collections(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.list_collection_ids().await?)
    }

    async fn stream_documents<'a>(
        &'a self,
        collection_id: &str,
    ) -> anyhow::Result<BoxStream<'a, anyhow::Result<SourceDocument>>> {
        let stream = self.stream_collection_docs(collection_id).await?;

        Ok(stream
            .map(|doc| {
                let doc = doc?;
                Ok(convert::document_to_source(doc))
            })
            .boxed())
    }
}
