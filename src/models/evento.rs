//! Event model for storage and API.

use serde::{Deserialize, Serialize};

/// Event stored in the `eventos` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evento {
    /// Document ID (generated at creation)
    pub evento_id: String,
    /// Event title
    pub titulo: String,
    /// Free-form description
    pub descripcion: String,
    /// Category tag ("deporte", "musica", ...)
    pub categoria: String,
    /// Venue or meeting point
    pub lugar: String,
    /// Scheduled date/time (ISO 8601)
    pub fecha: String,
    /// Usuario ID of the organizer
    pub organizador: String,
    /// Usuario IDs signed up for the event
    #[serde(default)]
    pub asistentes: Vec<String>,
    /// When the event was created (ISO 8601)
    pub created_at: String,
}
