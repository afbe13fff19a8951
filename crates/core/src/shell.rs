//! Window-level state for the two report triggers and the modal error dialog.

use serde::Serialize;
use tracing::{error, info};

use crate::catalog::ReportDataSource;
use crate::chart::{ChartSink, RenderedChart};
use crate::errors::{ApplicationError, InterfaceError};
use crate::reports::{ReportGenerator, ReportKind};

pub const WINDOW_TITLE: &str = "Order reports";
pub const ERROR_DIALOG_TITLE: &str = "Error";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
    pub error_class: &'static str,
    pub correlation_id: String,
}

impl ErrorDialog {
    pub fn from_error(error: &ApplicationError, correlation_id: &str) -> Self {
        let interface = error.clone().into_interface(correlation_id);
        Self {
            title: ERROR_DIALOG_TITLE.to_string(),
            message: format!("An error occurred: {error}"),
            error_class: error_class(&interface),
            correlation_id: correlation_id.to_string(),
        }
    }
}

pub fn error_class(error: &InterfaceError) -> &'static str {
    match error {
        InterfaceError::NoData { .. } => "no_data",
        InterfaceError::ServiceUnavailable { .. } => "service_unavailable",
        InterfaceError::Internal { .. } => "internal",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ShellState {
    #[default]
    Idle,
    Generating { report: ReportKind },
    ErrorShown { dialog: ErrorDialog },
}

#[derive(Debug, Default)]
pub struct ReportShell {
    state: ShellState,
}

impl ReportShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn dialog(&self) -> Option<&ErrorDialog> {
        match &self.state {
            ShellState::ErrorShown { dialog } => Some(dialog),
            _ => None,
        }
    }

    /// Closes the open dialog, if any. Returns whether one was open.
    pub fn dismiss(&mut self) -> bool {
        let was_open = matches!(self.state, ShellState::ErrorShown { .. });
        if was_open {
            info!(event_name = "shell.dialog.dismissed", "error dialog dismissed");
        }
        self.state = ShellState::Idle;
        was_open
    }

    /// Runs one report. Failures open the error dialog instead of propagating.
    pub async fn trigger<D, R>(
        &mut self,
        generator: &ReportGenerator<D, R>,
        kind: ReportKind,
        correlation_id: &str,
    ) -> Result<RenderedChart, ErrorDialog>
    where
        D: ReportDataSource,
        R: ChartSink,
    {
        self.dismiss();
        let generating = GeneratingGuard::enter(&mut self.state, kind);

        match generator.generate(kind).await {
            Ok(chart) => {
                generating.settle(ShellState::Idle);
                Ok(chart)
            }
            Err(err) => {
                let dialog = ErrorDialog::from_error(&err, correlation_id);
                error!(
                    event_name = "shell.report.failed",
                    report_kind = %kind,
                    correlation_id,
                    error_class = dialog.error_class,
                    "{}",
                    dialog.message
                );
                generating.settle(ShellState::ErrorShown { dialog: dialog.clone() });
                Err(dialog)
            }
        }
    }
}

/// Holds the shell in `Generating` for one trigger. Dropping it before `settle`,
/// e.g. when the awaiting future is cancelled, puts the shell back to `Idle`.
struct GeneratingGuard<'a> {
    state: &'a mut ShellState,
}

impl<'a> GeneratingGuard<'a> {
    fn enter(state: &'a mut ShellState, report: ReportKind) -> Self {
        *state = ShellState::Generating { report };
        Self { state }
    }

    fn settle(self, next: ShellState) {
        *self.state = next;
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        if let ShellState::Generating { report } = *self.state {
            info!(
                event_name = "shell.report.abandoned",
                report_kind = %report,
                "report cancelled before it finished"
            );
            *self.state = ShellState::Idle;
        }
    }
}
