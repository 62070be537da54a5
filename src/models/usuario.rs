//! User profile model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in the `usuarios` collection.
///
/// The document ID is the user's email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    /// First name
    pub nombre: String,
    /// Last name(s)
    pub apellidos: String,
    /// Email address (also used as document ID)
    pub email: String,
    /// Home city (may be None if not shared)
    pub ciudad: Option<String>,
    /// Interest tags used to suggest events
    #[serde(default)]
    pub intereses: Vec<String>,
    /// Evento document IDs marked as favorites
    #[serde(default)]
    pub favoritos: Vec<String>,
    /// When the user registered (ISO 8601)
    pub created_at: String,
    /// Last profile update timestamp (ISO 8601)
    pub last_active: String,
}
