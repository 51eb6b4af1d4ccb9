use std::env;
use std::fs;
use std::path::Path;

use lumopack_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use super::{CommandResult, EXIT_INVALID_INPUT};

pub fn run() -> CommandResult {
    match render() {
        Ok(lines) => CommandResult::success("config", lines),
        Err(message) => {
            CommandResult::failure("config", "config_validation", message, EXIT_INVALID_INPUT)
        }
    }
}

pub fn render() -> Result<String, String> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| format!("config validation failed: {error}"))?;

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let fields: [(&str, String, &[&str]); 10] = [
        ("llm.provider", config.llm.provider.as_str().to_string(), &["LUMOPACK_LLM_PROVIDER"]),
        ("llm.model", config.llm.model.clone(), &["LUMOPACK_LLM_MODEL"]),
        (
            "llm.base_url",
            config.llm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["LUMOPACK_LLM_BASE_URL"],
        ),
        ("llm.api_key", llm_api_key.to_string(), &["LUMOPACK_LLM_API_KEY"]),
        ("llm.timeout_secs", config.llm.timeout_secs.to_string(), &["LUMOPACK_LLM_TIMEOUT_SECS"]),
        ("llm.max_retries", config.llm.max_retries.to_string(), &["LUMOPACK_LLM_MAX_RETRIES"]),
        (
            "conversation.quotation_step",
            config.conversation.quotation_step.to_string(),
            &["LUMOPACK_CONVERSATION_QUOTATION_STEP"],
        ),
        (
            "conversation.minimum_order_quantity",
            config.conversation.minimum_order_quantity.to_string(),
            &["LUMOPACK_CONVERSATION_MINIMUM_ORDER_QUANTITY"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["LUMOPACK_LOGGING_LEVEL", "LUMOPACK_LOG_LEVEL"],
        ),
        (
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["LUMOPACK_LOGGING_FORMAT", "LUMOPACK_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        lines.push(render_line(key, &value, source(key, env_keys)));
    }

    Ok(lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_are_found_in_file_document() {
        let doc: toml::Value = "[llm]\nmodel = \"x\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.base_url"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn file_source_names_the_file() {
        let doc: toml::Value = "[logging]\nlevel = \"warn\"\n".parse().expect("toml");
        let source = field_source(
            "logging.level",
            &["LUMOPACK_TEST_NEVER_SET"],
            Some(&doc),
            Some(std::path::Path::new("lumopack.toml")),
        );
        assert_eq!(source, "file (lumopack.toml)");
        assert_eq!(field_source("llm.model", &[], Some(&doc), None), "default");
    }
}
