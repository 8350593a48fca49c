//! config/app_config.rs
//! Configuración global: base de datos, servidor HTTP, scheduler y SMTP.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_DATABASE_URL: &str = "sqlite:data/campaigns.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_SCHEDULER_INTERVAL_SECS: u64 = 60;
const DEFAULT_SEND_PACING_MS: u64 = 100;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_FROM: &str = "no-reply@example.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Cada cuánto despierta el scheduler (segundos)
    pub scheduler_interval_secs: u64,
    /// Pausa entre envíos consecutivos de una misma campaña
    pub send_pacing_ms: u64,
    /// Si existe, se agrega un pixel de apertura a cada correo
    pub tracking_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            scheduler_interval_secs: DEFAULT_SCHEDULER_INTERVAL_SECS,
            send_pacing_ms: DEFAULT_SEND_PACING_MS,
            tracking_base_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la config a partir de una función de búsqueda (útil en tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let port = match non_empty(&lookup, "PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT inválido: {raw}"))?,
            None => defaults.port,
        };
        let scheduler_interval_secs = match non_empty(&lookup, "SCHEDULER_INTERVAL_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SCHEDULER_INTERVAL_SECS inválido: {raw}"))?,
            None => defaults.scheduler_interval_secs,
        };
        let send_pacing_ms = match non_empty(&lookup, "SEND_PACING_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SEND_PACING_MS inválido: {raw}"))?,
            None => defaults.send_pacing_ms,
        };

        Ok(AppConfig {
            database_url: non_empty(&lookup, "DATABASE_URL").unwrap_or(defaults.database_url),
            host: non_empty(&lookup, "HOST").unwrap_or(defaults.host),
            port,
            // Un intervalo de 0 haría girar el loop sin pausa
            scheduler_interval_secs: scheduler_interval_secs.max(1),
            send_pacing_ms,
            tracking_base_url: non_empty(&lookup, "TRACKING_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_secs)
    }

    pub fn send_pacing(&self) -> Duration {
        Duration::from_millis(self.send_pacing_ms)
    }
}

/// Credenciales SMTP. Si falta host/usuario/password no hay transporte utilizable.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl SmtpConfig {
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (host, user, pass) = match (
            non_empty(&lookup, "SMTP_HOST"),
            non_empty(&lookup, "SMTP_USER"),
            non_empty(&lookup, "SMTP_PASS"),
        ) {
            (Some(host), Some(user), Some(pass)) => (host, user, pass),
            _ => return Ok(None),
        };

        let port = match non_empty(&lookup, "SMTP_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SMTP_PORT inválido: {raw}"))?,
            None => DEFAULT_SMTP_PORT,
        };

        let from = non_empty(&lookup, "SMTP_FROM").unwrap_or_else(|| {
            if user.contains('@') {
                user.clone()
            } else {
                DEFAULT_SMTP_FROM.to_string()
            }
        });

        Ok(Some(SmtpConfig {
            host,
            port,
            user,
            pass,
            from,
        }))
    }

    /// 465 => TLS implícito, cualquier otro puerto => STARTTLS
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
