use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration of one LLM provider that took part in a validation session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider family, e.g. `"openai"` or `"ollama"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Whether provider credentials are bound into the commitment.
///
/// `Bind` hashes `api_key` verbatim, so a proof is tied to the exact
/// credentials used. `Redact` leaves it out of the hashed form; the key is
/// still available to whoever invokes the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretPolicy {
    #[default]
    Bind,
    Redact,
}

impl ProviderConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            base_url: None,
            model: None,
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The JSON form that enters the commitment.
    ///
    /// `type`, `base_url` and `model` are always present (`null` when
    /// unset). `api_key` appears only when it is non-empty and the policy
    /// binds secrets.
    pub fn hashed_form(&self, policy: SecretPolicy) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.kind.clone()));
        map.insert("base_url".into(), opt_string(&self.base_url));
        map.insert("model".into(), opt_string(&self.model));
        if policy == SecretPolicy::Bind {
            if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
                map.insert("api_key".into(), Value::String(key.to_string()));
            }
        }
        Value::Object(map)
    }

    /// Hashed form of an ordered provider list.
    pub fn hashed_list(providers: &[ProviderConfig], policy: SecretPolicy) -> Value {
        Value::Array(providers.iter().map(|p| p.hashed_form(policy)).collect())
    }
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hashed_form_keeps_unset_fields_as_null() {
        let p = ProviderConfig::new("ollama");
        assert_eq!(
            p.hashed_form(SecretPolicy::Bind),
            json!({"type": "ollama", "base_url": null, "model": null})
        );
    }

    #[test]
    fn api_key_bound_only_when_non_empty() {
        let p = ProviderConfig::new("openai").with_api_key("sk-test");
        assert_eq!(p.hashed_form(SecretPolicy::Bind)["api_key"], json!("sk-test"));

        let empty = ProviderConfig::new("openai").with_api_key("");
        assert!(empty.hashed_form(SecretPolicy::Bind).get("api_key").is_none());
    }

    #[test]
    fn redact_policy_drops_api_key() {
        let p = ProviderConfig::new("openai")
            .with_model("gpt-4o-mini")
            .with_api_key("sk-test");
        let form = p.hashed_form(SecretPolicy::Redact);
        assert!(form.get("api_key").is_none());
        assert_eq!(form["model"], json!("gpt-4o-mini"));
    }

    #[test]
    fn deserializes_wire_shape() {
        let p: ProviderConfig =
            serde_json::from_value(json!({"type": "openai", "model": "m"})).unwrap();
        assert_eq!(p.kind, "openai");
        assert_eq!(p.model.as_deref(), Some("m"));
        assert!(p.base_url.is_none());
        assert!(p.api_key.is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let p = ProviderConfig::new("openai").with_api_key("sk-secret");
        let rendered = format!("{p:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn secret_policy_serde_names() {
        assert_eq!(serde_json::to_string(&SecretPolicy::Redact).unwrap(), "\"redact\"");
        assert_eq!(SecretPolicy::default(), SecretPolicy::Bind);
    }
}
