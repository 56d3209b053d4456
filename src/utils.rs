const BOT_USER_AGENT: &str = concat!("runpod-vision.rs/", env!("CARGO_PKG_VERSION"));

pub enum UserAgent {
    Bot,
}

impl UserAgent {
    pub fn value(&self) -> String {
        match self {
            UserAgent::Bot => BOT_USER_AGENT,
        }
        .to_string()
    }
}

/// Key names and encoded lengths of a JSON object, for diagnostics
pub(crate) fn summarize_payload(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("{}=<{} chars>", key, s.len()),
                serde_json::Value::Null => format!("{}=null", key),
                other => format!("{}={}", key, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
