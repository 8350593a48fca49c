//! tests/mod.rs
//! Pruebas unitarias del servicio de campañas.

mod support;

mod config_tests;
mod handler_tests;
