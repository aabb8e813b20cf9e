use super::{Config, ProviderKind};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SKILLSCOUT_EMBEDDING_PROVIDER") {
            if let Ok(kind) = serde_json::from_value::<ProviderKind>(serde_json::Value::String(
                v.trim().to_lowercase(),
            )) {
                self.embedding.provider = kind;
            } else {
                tracing::warn!("ignoring invalid SKILLSCOUT_EMBEDDING_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SKILLSCOUT_EMBEDDING_BASE_URL") {
            self.embedding.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("SKILLSCOUT_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("SKILLSCOUT_OPENAI_API_KEY") {
            self.embedding.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("SKILLSCOUT_DEFAULT_TOP_K") {
            if let Ok(k) = v.parse::<usize>() {
                self.server.default_top_k = k;
            } else {
                tracing::warn!("ignoring invalid SKILLSCOUT_DEFAULT_TOP_K value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SKILLSCOUT_MAX_CONTENT_CHARS") {
            if let Ok(n) = v.parse::<usize>() {
                self.skills.max_content_chars = Some(n);
            } else {
                tracing::warn!("ignoring invalid SKILLSCOUT_MAX_CONTENT_CHARS value: {v}");
            }
        }
    }
}
