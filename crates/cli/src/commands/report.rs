use std::fs;
use std::path::{Path, PathBuf};

use cartlens_charts::SvgChartRenderer;
use cartlens_core::{ReportGenerator, ReportKind, ReportShell};
use cartlens_db::{connect_with_config, SqlReportDataSource};
use uuid::Uuid;

use crate::commands::{prepare, CommandResult};

pub fn run(kind: ReportKind, output: Option<PathBuf>) -> CommandResult {
    let (config, runtime) = match prepare("report") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };
    let output = output.unwrap_or_else(|| default_output_path(kind));
    let correlation_id = Uuid::new_v4().to_string();

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let generator = ReportGenerator::new(
            SqlReportDataSource::new(pool.clone()),
            SvgChartRenderer::new(),
            config.report.chart_settings(),
        );
        let mut shell = ReportShell::new();
        let outcome = shell
            .trigger(&generator, kind, &correlation_id)
            .await
            .map_err(|dialog| (dialog.error_class, dialog.message, 7u8));

        pool.close().await;
        outcome
    });

    let chart = match result {
        Ok(chart) => chart,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("report", error_class, message, exit_code);
        }
    };

    if let Err(error) = write_chart(&output, &chart.body) {
        return CommandResult::failure(
            "report",
            "output_write",
            format!("failed to write `{}`: {error}", output.display()),
            8,
        );
    }

    CommandResult::success(
        "report",
        format!("wrote \"{}\" ({}) to {}", chart.title, chart.media_type, output.display()),
    )
}

pub fn default_output_path(kind: ReportKind) -> PathBuf {
    PathBuf::from(format!("{kind}_report.svg"))
}

fn write_chart(path: &Path, body: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{default_output_path, write_chart};
    use cartlens_core::ReportKind;

    #[test]
    fn default_output_is_named_after_the_report() {
        assert_eq!(default_output_path(ReportKind::Services), PathBuf::from("services_report.svg"));
        assert_eq!(default_output_path(ReportKind::Weekly), PathBuf::from("weekly_report.svg"));
    }

    #[test]
    fn write_chart_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("charts").join("weekly.svg");

        write_chart(&path, "<svg/>").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "<svg/>");
    }
}
