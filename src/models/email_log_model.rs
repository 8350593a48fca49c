use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Error,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Error => "error",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datos para registrar un intento de envío. No guarda el motivo del fallo.
#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub campaign_id: Option<String>,
    pub recipient_email: String,
    pub status: DeliveryStatus,
    pub opened: bool,
    pub clicked: bool,
    pub bounced: bool,
    pub pixel_id: Option<String>,
}

impl NewDelivery {
    pub fn new(campaign_id: Option<&str>, recipient_email: &str, status: DeliveryStatus) -> Self {
        NewDelivery {
            campaign_id: campaign_id.map(str::to_string),
            recipient_email: recipient_email.to_string(),
            status,
            opened: false,
            clicked: false,
            bounced: false,
            pixel_id: None,
        }
    }

    pub fn with_pixel(mut self, pixel_id: Option<String>) -> Self {
        self.pixel_id = pixel_id;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecord {
    pub id: i64,
    pub campaign_id: Option<String>,
    pub recipient_email: String,
    pub status: String, // "sent", "error"
    pub opened: bool,
    pub clicked: bool,
    pub bounced: bool,
    pub pixel_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackingStats {
    pub total_sent: i64,
    pub total_opened: i64,
    pub total_clicked: i64,
    pub total_bounced: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackClickRequest {
    pub campaign_id: String,
    pub recipient_email: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub emails: i64,
    pub opens: i64,
    pub clicks: i64,
    pub bounces: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopCampaign {
    pub id: String,
    pub name: String,
    pub open_rate: f64,
    pub click_rate: f64,
    pub recipients: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsOverview {
    pub total_emails: i64,
    pub total_campaigns: i64,
    pub total_subscribers: i64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub bounce_rate: f64,
    pub monthly_stats: Vec<MonthlyStat>,
    pub top_campaigns: Vec<TopCampaign>,
}
