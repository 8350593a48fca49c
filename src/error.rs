//! error.rs
//! Errores que abortan una ejecución completa de campaña (no los de un
//! destinatario individual, que quedan en el `SendResultSummary`).

use thiserror::Error;

use crate::models::campaign_model::CampaignStatus;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Campaign {0} not found")]
    CampaignNotFound(String),

    #[error("Template {0} not found")]
    TemplateNotFound(String),

    #[error("Draft {0} not found")]
    DraftNotFound(i64),

    #[error("Mail transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Campaign {0} has no content: no template resolved and no subject/body given")]
    EmptyContent(String),

    #[error("Campaign {campaign_id} cannot go from '{from}' to '{to}'")]
    InvalidStatusTransition {
        campaign_id: String,
        from: CampaignStatus,
        to: CampaignStatus,
    },
}
