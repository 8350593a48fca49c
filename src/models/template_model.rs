use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub content: String,
    pub variables: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub subject: String,
    pub content: String,
    /// Si viene vacío se deduce de los placeholders del subject/content
    #[serde(default)]
    pub variables: Vec<String>,
}
