pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use cartlens_core::ReportKind;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cartlens",
    about = "cartlens order report CLI",
    long_about = "Apply migrations, load demo orders, build service and weekly order charts, and inspect runtime readiness.",
    after_help = "Examples:\n  cartlens seed\n  cartlens report weekly --output weekly.svg\n  cartlens doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo orders and verify they are present")]
    Seed,
    #[command(about = "Build one order chart and write it as SVG")]
    Report {
        #[arg(value_parser = parse_report_kind, help = "Which chart to build: services or weekly")]
        kind: ReportKind,
        #[arg(long, help = "Where to write the SVG (defaults to <kind>_report.svg)")]
        output: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, DB connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn parse_report_kind(raw: &str) -> Result<ReportKind, String> {
    raw.parse()
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Report { kind, output } => commands::report::run(kind, output),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};
    use cartlens_core::ReportKind;

    #[test]
    fn report_subcommand_accepts_both_kinds() {
        let cli = Cli::try_parse_from(["cartlens", "report", "weekly", "--output", "out.svg"])
            .expect("weekly parses");
        match cli.command {
            Command::Report { kind, output } => {
                assert_eq!(kind, ReportKind::Weekly);
                assert_eq!(output.as_deref(), Some(std::path::Path::new("out.svg")));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["cartlens", "report", "services"]).expect("services parses");
        assert!(matches!(
            cli.command,
            Command::Report { kind: ReportKind::Services, output: None }
        ));
    }

    #[test]
    fn report_subcommand_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["cartlens", "report", "monthly"]).is_err());
    }
}
