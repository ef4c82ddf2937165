// File: src/settings.rs
//
// Loads the filter configuration from an option store, one key at a time.

use std::sync::Arc;

use serde_json::{Number, Value};
use tracing::{info, warn};
use url::Url;

use feedhush_ai::provider::DEFAULT_API_BASE;
use feedhush_ai::{CompletionApi, OpenAIProvider, ProviderConfig};
use feedhush_common::error::Error;
use feedhush_common::traits::OptionStore;

use crate::config::{FilterConfig, DEFAULT_HIDE_THRESHOLD, DEFAULT_MODEL};

pub const OPTION_API_URL: &str = "apiUrl";
pub const OPTION_API_KEY: &str = "apiKey";
pub const OPTION_MODEL: &str = "model";
pub const OPTION_PROMPT_TEMPLATE: &str = "prompt_template";
pub const OPTION_PROMPT_INSTRUCTIONS: &str = "prompt_instructions";
pub const OPTION_HIDE_THRESHOLD: &str = "hide_threshold";

/// Stringified form of a key that was never stored.
pub const UNDEFINED: &str = "undefined";

/// Read one option and return its string form.
///
/// Missing keys come back as the literal `"undefined"` rather than an error;
/// callers have to treat that value as "not configured".
pub async fn get_option_value(store: &dyn OptionStore, name: &str) -> Result<String, Error> {
    let value = store.get_option(name).await?;
    Ok(stringify_option(value.as_ref()))
}

/// Render a stored value the way script storage stringifies it.
///
/// Floats with a magnitude of 1e21 or more keep the JSON exponent form
/// rather than the script's `1e+21` spelling.
pub fn stringify_option(value: Option<&Value>) -> String {
    match value {
        None => UNDEFINED.to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => stringify_number(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify_option(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

fn stringify_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        // -0 prints as 0, and integral floats drop their fraction.
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() < 1e21 && f.abs() >= 1e-6 => f.to_string(),
        _ => n.to_string(),
    }
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == UNDEFINED || value == "null"
}

/// Show only the first and last four characters of a credential.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// Parse the stored threshold, falling back to the default when it is not a
/// number in `[0, 1]`.
pub fn parse_hide_threshold(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => value,
        Ok(value) => {
            warn!(
                "Hide threshold {} is outside [0, 1]; using {}",
                value, DEFAULT_HIDE_THRESHOLD
            );
            DEFAULT_HIDE_THRESHOLD
        }
        Err(_) => {
            warn!(
                "Hide threshold '{}' is not a number; using {}",
                raw, DEFAULT_HIDE_THRESHOLD
            );
            DEFAULT_HIDE_THRESHOLD
        }
    }
}

/// Load the filter configuration, building the remote client with `connect`.
///
/// Any storage failure aborts loading and is returned to the caller.
pub async fn load_filter_config<F>(store: &dyn OptionStore, connect: F) -> Result<FilterConfig, Error>
where
    F: FnOnce(ProviderConfig) -> Arc<dyn CompletionApi>,
{
    let api_url = get_option_value(store, OPTION_API_URL).await?;
    let api_base = if is_unset(&api_url) {
        DEFAULT_API_BASE.to_string()
    } else {
        let trimmed = api_url.trim().trim_end_matches('/').to_string();
        Url::parse(&trimmed)?;
        trimmed
    };
    info!("Using API URL: {}", api_base);

    let api_key = get_option_value(store, OPTION_API_KEY).await?;
    info!("Using API Key: {}", mask_secret(&api_key));

    let model_option = get_option_value(store, OPTION_MODEL).await?;
    let model = if is_unset(&model_option) {
        DEFAULT_MODEL.to_string()
    } else {
        model_option.trim().to_string()
    };
    info!("Using model: {}", model);

    let prompt_template = get_option_value(store, OPTION_PROMPT_TEMPLATE).await?;
    info!("Using prompt template: {}", prompt_template);

    let prompt_instructions = get_option_value(store, OPTION_PROMPT_INSTRUCTIONS).await?;
    info!("Using prompt instructions: {}", prompt_instructions);

    let hide_threshold_str = get_option_value(store, OPTION_HIDE_THRESHOLD).await?;
    info!("Got hide threshold str: {}", hide_threshold_str);
    let hide_threshold = parse_hide_threshold(&hide_threshold_str);
    info!("Using hide threshold: {}", hide_threshold);

    let client = connect(ProviderConfig {
        api_base: Some(api_base),
        api_key,
        default_model: model.clone(),
    });

    Ok(FilterConfig {
        client,
        model,
        prompt_template,
        prompt_instructions,
        hide_threshold,
    })
}

/// Load the filter configuration with an OpenAI-compatible client.
pub async fn load_openai_filter_config(store: &dyn OptionStore) -> Result<FilterConfig, Error> {
    load_filter_config(store, |provider_config| {
        Arc::new(OpenAIProvider::new(provider_config)) as Arc<dyn CompletionApi>
    })
    .await
}
