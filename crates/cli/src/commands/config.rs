use std::env;
use std::fs;
use std::path::Path;

use cartlens_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

/// Key path, rendered value, and the env vars that override it.
type ConfigEntry = (&'static str, String, &'static [&'static str]);

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in entries(&config) {
        lines.push(render_line(
            key_path,
            &value,
            field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn entries(config: &AppConfig) -> Vec<ConfigEntry> {
    vec![
        entry("database.url", config.database.url.clone(), &["CARTLENS_DATABASE_URL"]),
        entry(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["CARTLENS_DATABASE_MAX_CONNECTIONS"],
        ),
        entry(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["CARTLENS_DATABASE_TIMEOUT_SECS"],
        ),
        entry(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["CARTLENS_SERVER_BIND_ADDRESS"],
        ),
        entry("server.port", config.server.port.to_string(), &["CARTLENS_SERVER_PORT"]),
        entry(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["CARTLENS_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        entry(
            "report.currency_suffix",
            config.report.currency_suffix.clone(),
            &["CARTLENS_REPORT_CURRENCY_SUFFIX"],
        ),
        entry(
            "report.chart_width",
            config.report.chart_width.to_string(),
            &["CARTLENS_REPORT_CHART_WIDTH"],
        ),
        entry(
            "report.chart_height",
            config.report.chart_height.to_string(),
            &["CARTLENS_REPORT_CHART_HEIGHT"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["CARTLENS_LOGGING_LEVEL", "CARTLENS_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["CARTLENS_LOGGING_FORMAT", "CARTLENS_LOG_FORMAT"],
        ),
    ]
}

fn entry(key_path: &'static str, value: String, env_keys: &'static [&'static str]) -> ConfigEntry {
    (key_path, value, env_keys)
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
    use std::path::Path;

    use super::{contains_path, entries, field_source, render_line};
    use cartlens_core::config::AppConfig;
    use toml::Value;

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: Value = "[report]\ncurrency_suffix = \"EUR\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "report.currency_suffix"));
        assert!(!contains_path(&doc, "report.chart_width"));
        assert!(!contains_path(&doc, "server.port"));
    }

    #[test]
    fn file_source_wins_over_default_when_key_is_present() {
        let doc: Value = "[server]\nport = 9090\n".parse().expect("toml");
        let source = field_source(
            "server.port",
            &["CARTLENS_TEST_UNSET_PORT_KEY"],
            Some(&doc),
            Some(Path::new("cartlens.toml")),
        );
        assert_eq!(source, "file (cartlens.toml)");

        let source = field_source(
            "server.bind_address",
            &["CARTLENS_TEST_UNSET_BIND_KEY"],
            Some(&doc),
            None,
        );
        assert_eq!(source, "default");
    }

    #[test]
    fn every_config_section_is_listed() {
        let config = AppConfig::default();
        let keys: Vec<&str> = entries(&config).iter().map(|(key, _, _)| *key).collect();
        for section in ["database.", "server.", "report.", "logging."] {
            assert!(keys.iter().any(|key| key.starts_with(section)), "missing {section}");
        }
        assert_eq!(
            render_line("report.currency_suffix", "RUB", "default".to_string()),
            "- report.currency_suffix = RUB (source: default)"
        );
    }
}
