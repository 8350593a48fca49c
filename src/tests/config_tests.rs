//! Pruebas de lectura de configuración (sin tocar el entorno del proceso).

use std::collections::HashMap;
use std::time::Duration;

use crate::config::app_config::{AppConfig, SmtpConfig};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn app_config_defaults() {
    let config = AppConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config.database_url, "sqlite:data/campaigns.db");
    assert_eq!(config.port, 4000);
    assert_eq!(config.scheduler_interval(), Duration::from_secs(60));
    assert_eq!(config.send_pacing(), Duration::from_millis(100));
    assert!(config.tracking_base_url.is_none());
}

#[test]
fn app_config_overrides() {
    let config = AppConfig::from_lookup(lookup(&[
        ("DATABASE_URL", "sqlite::memory:"),
        ("PORT", "8080"),
        ("SCHEDULER_INTERVAL_SECS", "0"),
        ("SEND_PACING_MS", "0"),
        ("TRACKING_BASE_URL", "https://t.example.com/"),
    ]))
    .unwrap();

    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.port, 8080);
    // Nunca menos de un segundo
    assert_eq!(config.scheduler_interval_secs, 1);
    assert!(config.send_pacing().is_zero());
    assert_eq!(
        config.tracking_base_url.as_deref(),
        Some("https://t.example.com")
    );
}

#[test]
fn app_config_rejects_bad_port() {
    assert!(AppConfig::from_lookup(lookup(&[("PORT", "abc")])).is_err());
}

#[test]
fn smtp_config_missing_credentials_is_none() {
    let config = SmtpConfig::from_lookup(lookup(&[("SMTP_HOST", "smtp.example.com")])).unwrap();
    assert!(config.is_none());

    let blank = SmtpConfig::from_lookup(lookup(&[
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_USER", "user@example.com"),
        ("SMTP_PASS", "   "),
    ]))
    .unwrap();
    assert!(blank.is_none());
}

#[test]
fn smtp_config_defaults_and_from_address() {
    let config = SmtpConfig::from_lookup(lookup(&[
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_USER", "user@example.com"),
        ("SMTP_PASS", "secret"),
    ]))
    .unwrap()
    .unwrap();

    assert_eq!(config.port, 587);
    assert_eq!(config.from, "user@example.com");
    assert!(!config.implicit_tls());

    let config = SmtpConfig::from_lookup(lookup(&[
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_PORT", "465"),
        ("SMTP_USER", "apikey"),
        ("SMTP_PASS", "secret"),
    ]))
    .unwrap()
    .unwrap();
    assert!(config.implicit_tls());
    assert_eq!(config.from, "no-reply@example.com");

    let config = SmtpConfig::from_lookup(lookup(&[
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_USER", "apikey"),
        ("SMTP_PASS", "secret"),
        ("SMTP_FROM", "Campañas <news@example.com>"),
    ]))
    .unwrap()
    .unwrap();
    assert_eq!(config.from, "Campañas <news@example.com>");
}
