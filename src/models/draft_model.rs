use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::campaign_model::Recipient;

/// Una fila de la tabla de destinatarios: columna -> valor
pub type DraftRow = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub content: String,
    pub variables: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<DraftRow>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDraftRequest {
    pub name: String,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<DraftRow>,
}

impl DraftRecord {
    /// Convierte las filas en destinatarios. La dirección sale de la columna
    /// `email`, luego `Email`, luego la primera columna del header.
    /// Filas sin dirección se descartan.
    pub fn recipients(&self) -> Vec<Recipient> {
        let mut recipients = Vec::with_capacity(self.rows.len());

        for (idx, row) in self.rows.iter().enumerate() {
            let address = row
                .get("email")
                .or_else(|| row.get("Email"))
                .or_else(|| self.headers.first().and_then(|h| row.get(h)))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty());

            match address {
                Some(email) => recipients.push(Recipient {
                    email: email.to_string(),
                    variables: row.clone(),
                }),
                None => log::warn!(
                    "(recipients) Draft id={} fila {} sin dirección de email, se omite",
                    self.id,
                    idx
                ),
            }
        }

        recipients
    }
}
