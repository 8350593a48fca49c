//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod campaign_model;
pub mod draft_model;
pub mod email_log_model;
pub mod email_model;
pub mod template_model;

/// Formato fijo (milisegundos + `Z`) para que el orden lexicográfico en SQLite
/// coincida con el orden temporal.
pub fn db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    db_timestamp(Utc::now())
}
