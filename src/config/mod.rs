//! config/mod.rs
//! Configuración de la aplicación leída desde variables de entorno (.env).

pub mod app_config;
