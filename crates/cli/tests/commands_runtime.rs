use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use cartlens_cli::commands::{doctor, migrate, report, seed};
use cartlens_core::ReportKind;
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("CARTLENS_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("CARTLENS_DATABASE_URL", "postgres://localhost/orders")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir.path().join("orders.db"));

    with_env(&[("CARTLENS_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["status"], "ok");
        assert_eq!(
            first_payload["message"],
            "demo orders loaded: 3 categories, 5 services, 12 order lines"
        );

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        assert_eq!(first_payload["message"], parse_payload(&second.output)["message"]);
    });
}

#[test]
fn report_writes_both_charts_for_seeded_orders() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir.path().join("orders.db"));

    with_env(&[("CARTLENS_DATABASE_URL", url.as_str())], || {
        assert_eq!(seed::run().exit_code, 0, "seed should succeed");

        for kind in ReportKind::ALL {
            let output = dir.path().join(format!("{kind}.svg"));
            let result = report::run(kind, Some(output.clone()));
            assert_eq!(result.exit_code, 0, "report {kind} failed: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "report");
            assert_eq!(payload["status"], "ok");

            let svg = std::fs::read_to_string(&output).expect("svg written");
            assert!(svg.contains("<svg"));
            assert!(svg.contains("RUB"));
        }
    });
}

#[test]
fn report_on_empty_orders_prints_the_dialog_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir.path().join("empty.db"));

    with_env(&[("CARTLENS_DATABASE_URL", url.as_str())], || {
        assert_eq!(migrate::run().exit_code, 0, "migrate should succeed");

        let output = dir.path().join("services.svg");
        let result = report::run(ReportKind::Services, Some(output.clone()));
        assert_eq!(result.exit_code, 7);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "no_data");
        assert_eq!(payload["message"], "An error occurred: no order data available");
        assert!(!output.exists(), "no chart is written on failure");
    });
}

#[test]
fn report_without_schema_is_service_unavailable() {
    with_env(&[("CARTLENS_DATABASE_URL", "sqlite::memory:")], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = report::run(ReportKind::Weekly, Some(dir.path().join("weekly.svg")));
        assert_eq!(result.exit_code, 7);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "service_unavailable");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("An error occurred: data source unavailable"), "{message}");
    });
}

#[test]
fn doctor_reports_missing_schema_then_passes_after_migrate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(&dir.path().join("doctor.db"));

    with_env(&[("CARTLENS_DATABASE_URL", url.as_str())], || {
        let before = doctor::run(true);
        assert_eq!(before.exit_code, 1);
        let payload = parse_payload(&before.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][1]["name"], "database_connectivity");
        assert_eq!(payload["checks"][1]["status"], "pass");
        assert_eq!(payload["checks"][2]["name"], "schema_readiness");
        assert_eq!(payload["checks"][2]["status"], "fail");

        assert_eq!(migrate::run().exit_code, 0);

        let after = doctor::run(true);
        assert_eq!(after.exit_code, 0, "{}", after.output);
        assert_eq!(parse_payload(&after.output)["overall_status"], "pass");
    });
}

#[test]
fn doctor_skips_database_checks_when_config_is_invalid() {
    with_env(&[("CARTLENS_REPORT_CHART_WIDTH", "wide")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] database_connectivity"));
        assert!(result.output.contains("- [skip] schema_readiness"));
    });
}

fn database_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CARTLENS_DATABASE_URL",
        "CARTLENS_DATABASE_MAX_CONNECTIONS",
        "CARTLENS_DATABASE_TIMEOUT_SECS",
        "CARTLENS_SERVER_BIND_ADDRESS",
        "CARTLENS_SERVER_PORT",
        "CARTLENS_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "CARTLENS_REPORT_CURRENCY_SUFFIX",
        "CARTLENS_REPORT_CHART_WIDTH",
        "CARTLENS_REPORT_CHART_HEIGHT",
        "CARTLENS_LOGGING_LEVEL",
        "CARTLENS_LOGGING_FORMAT",
        "CARTLENS_LOG_LEVEL",
        "CARTLENS_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
