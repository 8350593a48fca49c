//! services/template_renderer.rs
//! Sustitución literal de `{{variable}}` en subject/body. Sin I/O.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub subject: String,
    pub body: String,
}

/// Reemplaza todas las ocurrencias de `{{key}}` por su valor. Los placeholders
/// sin clave en `variables` quedan tal cual. Sensible a mayúsculas.
pub fn render(subject: &str, body: &str, variables: &BTreeMap<String, String>) -> RenderedContent {
    RenderedContent {
        subject: substitute(subject, variables),
        body: substitute(body, variables),
    }
}

fn substitute(text: &str, variables: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    // Una sola pasada: los valores insertados nunca se vuelven a expandir
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        match variables.get(&after[..end]) {
            Some(value) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Agrega el pixel de apertura al final del HTML
pub fn append_tracking_pixel(body: &str, base_url: &str, pixel_id: &str) -> String {
    format!(
        "{body}<img src=\"{base_url}/api/v1/track/pixel/{pixel_id}\" width=\"1\" height=\"1\" alt=\"\" style=\"display:none\" />"
    )
}

/// Lista los nombres de `{{...}}` en orden de aparición, sin duplicados.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let inner = &after[..end];
        // `{{a {{b}}` => solo cuenta `b`
        let name = match inner.rfind("{{") {
            Some(pos) => &inner[pos + 2..],
            None => inner,
        };
        let name = name.trim();
        if !name.is_empty() && !name.contains('}') && !found.iter().any(|v| v == name) {
            found.push(name.to_string());
        }
        rest = &after[end + 2..];
    }

    found
}
