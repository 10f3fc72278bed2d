//! Provider identity, configuration and request policy.

use crate::ImageContent;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use vllm_error::ValidationError;

/// Upstream provider families.
///
/// Declaration order is registry order: when no provider can be inferred
/// for a model, the earliest registered variant is used.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI chat completions API and compatibles
    OpenAI,
    /// Alibaba Dashscope multimodal generation API
    Dashscope,
}

impl ProviderType {
    /// Lowercase registry name, e.g. `"openai"`.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Infers the provider from a model name prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use vllm_core::ProviderType;
    ///
    /// assert_eq!(ProviderType::infer_from_model("gpt-4o"), Some(ProviderType::OpenAI));
    /// assert_eq!(ProviderType::infer_from_model("qwen-vl-plus"), Some(ProviderType::Dashscope));
    /// assert_eq!(ProviderType::infer_from_model("llava"), None);
    /// ```
    pub fn infer_from_model(model: &str) -> Option<Self> {
        if model.starts_with("gpt") {
            Some(Self::OpenAI)
        } else if model.starts_with("qwen") {
            Some(Self::Dashscope)
        } else {
            None
        }
    }

    /// Model used when the configuration names none.
    pub fn builtin_default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o",
            Self::Dashscope => "qwen-vl-plus",
        }
    }

    /// Models accepted when the configuration lists none.
    pub fn builtin_supported_models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-4-vision-preview"],
            Self::Dashscope => &[
                "qwen-vl-plus",
                "qwen-vl-max",
                "qwen-vl-chat",
                "qwen2-vl-7b-instruct",
                "qwen2-vl-72b-instruct",
            ],
        }
    }

    /// Base URL used when the configuration names none.
    pub fn builtin_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Dashscope => "https://dashscope.aliyuncs.com/api/v1",
        }
    }
}

/// Per-provider limits checked before a request is sent.
///
/// The defaults mirror published upstream limits but are only policy; they
/// can be overridden per provider in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ImagePolicy {
    /// Maximum number of images in one request
    max_images: usize,
    /// Accepted image MIME types
    allowed_mime_types: Vec<String>,
}

impl ImagePolicy {
    /// Creates a policy from explicit limits.
    pub fn new(max_images: usize, allowed_mime_types: Vec<String>) -> Self {
        Self {
            max_images,
            allowed_mime_types,
        }
    }

    /// Default limits for a provider family.
    pub fn for_provider(provider: ProviderType) -> Self {
        let (max_images, mimes): (usize, &[&str]) = match provider {
            ProviderType::OpenAI => (
                5,
                &["image/jpeg", "image/png", "image/gif", "image/webp"][..],
            ),
            ProviderType::Dashscope => (
                10,
                &["image/jpeg", "image/png", "image/gif", "image/webp", "image/bmp"][..],
            ),
        };
        Self::new(max_images, mimes.iter().map(|m| m.to_string()).collect())
    }

    /// Checks image count and declared MIME types.
    pub fn check(&self, images: &[ImageContent]) -> Result<(), ValidationError> {
        if images.len() > self.max_images {
            return Err(ValidationError::new(format!(
                "{} images exceeds the limit of {}",
                images.len(),
                self.max_images
            )));
        }

        for image in images {
            let mime = image.mime_type().as_deref().unwrap_or_default();
            if !self.allowed_mime_types.iter().any(|m| m == mime) {
                return Err(ValidationError::new(format!(
                    "image MIME type '{}' is not accepted",
                    mime
                )));
            }
        }

        Ok(())
    }
}

/// Configuration of one provider.
///
/// Unset optional fields fall back to the provider family's built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider family
    pub provider_type: ProviderType,
    /// API key; an empty key keeps the provider out of the registry
    #[serde(default)]
    pub api_key: String,
    /// Custom base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model alias to upstream model name
    #[serde(default)]
    pub model_mapping: HashMap<String, String>,
    /// Default model to advertise
    #[serde(default)]
    pub default_model: Option<String>,
    /// Accepted models, as a list or a comma-separated string
    #[serde(default, deserialize_with = "deserialize_model_list")]
    pub supported_models: Option<Vec<String>>,
    /// Maximum tokens advertised for this provider
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Default temperature advertised for this provider
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// HTTP timeout for upstream calls
    #[serde(default = "default_timeout", alias = "timeout")]
    pub timeout_seconds: u64,
    /// Override of the image count ceiling
    #[serde(default)]
    pub max_images: Option<usize>,
    /// Override of the image MIME allow-list
    #[serde(default)]
    pub allowed_image_types: Option<Vec<String>>,
    /// Extra provider settings
    #[serde(default, alias = "extra_config")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout() -> u64 {
    60
}

impl ProviderConfig {
    /// Creates a configuration with built-in defaults.
    pub fn new(provider_type: ProviderType, api_key: impl Into<String>) -> Self {
        Self {
            provider_type,
            api_key: api_key.into(),
            base_url: None,
            model_mapping: HashMap::new(),
            default_model: None,
            supported_models: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            max_images: None,
            allowed_image_types: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the provider has credentials and may be registered.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Configured default model or the built-in one.
    pub fn resolved_default_model(&self) -> String {
        self.default_model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider_type.builtin_default_model().to_string())
    }

    /// Configured model list or the built-in one.
    pub fn resolved_supported_models(&self) -> Vec<String> {
        match &self.supported_models {
            Some(models) if !models.is_empty() => models.clone(),
            _ => self
                .provider_type
                .builtin_supported_models()
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Configured base URL or the built-in one, without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(self.provider_type.builtin_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Provider defaults with any configured overrides applied.
    pub fn image_policy(&self) -> ImagePolicy {
        let defaults = ImagePolicy::for_provider(self.provider_type);
        ImagePolicy::new(
            self.max_images.unwrap_or(defaults.max_images),
            self.allowed_image_types
                .clone()
                .unwrap_or(defaults.allowed_mime_types),
        )
    }
}

/// Splits a comma-separated model list, trimming blanks.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn deserialize_model_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ModelList {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Option::<ModelList>::deserialize(deserializer)? {
        Some(ModelList::List(models)) => Some(
            models
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        ),
        Some(ModelList::Csv(raw)) => Some(parse_model_list(&raw)),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_provider_type_names() {
        assert_eq!(ProviderType::OpenAI.to_string(), "openai");
        assert_eq!(ProviderType::Dashscope.to_string(), "dashscope");
        assert_eq!(ProviderType::from_str("openai").unwrap(), ProviderType::OpenAI);
        assert!(ProviderType::from_str("OpenAI").is_err());
        assert!(ProviderType::from_str("anthropic").is_err());
    }

    #[test]
    fn test_registry_order_follows_declaration() {
        assert!(ProviderType::OpenAI < ProviderType::Dashscope);
    }

    #[test]
    fn test_policy_overrides() {
        let mut config = ProviderConfig::new(ProviderType::OpenAI, "k");
        assert_eq!(*config.image_policy().max_images(), 5);
        config.max_images = Some(2);
        assert_eq!(*config.image_policy().max_images(), 2);
        assert_eq!(config.image_policy().allowed_mime_types().len(), 4);
    }

    #[test]
    fn test_policy_rejects_unknown_mime() {
        let policy = ImagePolicy::for_provider(ProviderType::OpenAI);
        let bmp = ImageContent::from_url("https://x/y.bmp", "image/bmp");
        assert!(policy.check(std::slice::from_ref(&bmp)).is_err());
        assert!(ImagePolicy::for_provider(ProviderType::Dashscope).check(&[bmp]).is_ok());
    }

    #[test]
    fn test_policy_rejects_missing_mime() {
        let policy = ImagePolicy::for_provider(ProviderType::Dashscope);
        let image = ImageContent::from_path("/tmp/blob.unknownext");
        assert!(policy.check(&[image]).is_err());
    }

    #[test]
    fn test_supported_models_from_csv() {
        let json = r#"{
            "provider_type": "dashscope",
            "api_key": "sk",
            "supported_models": "qwen-vl-plus, qwen-vl-max ,"
        }"#;
        let config: ProviderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.resolved_supported_models(),
            vec!["qwen-vl-plus".to_string(), "qwen-vl-max".to_string()]
        );
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_builtin_fallbacks() {
        let config = ProviderConfig::new(ProviderType::Dashscope, "");
        assert!(!config.has_credentials());
        assert_eq!(config.resolved_default_model(), "qwen-vl-plus");
        assert_eq!(
            config.resolved_base_url(),
            "https://dashscope.aliyuncs.com/api/v1"
        );
        assert_eq!(config.resolved_supported_models().len(), 5);
    }
}
