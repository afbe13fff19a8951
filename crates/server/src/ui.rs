//! Report window routes.
//!
//! - `GET  /`                        the "Order reports" window
//! - `GET  /api/v1/reports/services` service chart (SVG) or error dialog (JSON)
//! - `GET  /api/v1/reports/weekly`   weekly chart (SVG) or error dialog (JSON)
//! - `POST /api/v1/dialog/dismiss`   close the error dialog
//! - `GET  /api/v1/shell`            current shell state

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cartlens_charts::SvgChartRenderer;
use cartlens_core::shell::WINDOW_TITLE;
use cartlens_core::{ErrorDialog, ReportGenerator, ReportKind, ReportShell, ShellState};
use cartlens_db::SqlReportDataSource;
use serde::Serialize;
use tera::{Context, Tera};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const DISMISS_ENDPOINT: &str = "/api/v1/dialog/dismiss";
pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub type SqlReportGenerator = ReportGenerator<SqlReportDataSource, SvgChartRenderer>;

#[derive(Clone)]
pub struct UiState {
    generator: Arc<SqlReportGenerator>,
    shell: Arc<Mutex<ReportShell>>,
    templates: Arc<Tera>,
}

impl UiState {
    pub fn new(generator: SqlReportGenerator, templates: Tera) -> Self {
        Self {
            generator: Arc::new(generator),
            shell: Arc::new(Mutex::new(ReportShell::new())),
            templates: Arc::new(templates),
        }
    }
}

#[derive(Debug, Serialize)]
struct ButtonView {
    kind: ReportKind,
    label: &'static str,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct ShellView {
    pub window_title: &'static str,
    #[serde(flatten)]
    pub state: ShellState,
}

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub dismissed: bool,
    #[serde(flatten)]
    pub state: ShellState,
}

pub fn init_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(INDEX_TEMPLATE, include_str!("../../../templates/ui/index.html"))?;
    Ok(tera)
}

pub fn router(state: UiState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/v1/reports/services", get(services_report))
        .route("/api/v1/reports/weekly", get(weekly_report))
        .route(DISMISS_ENDPOINT, post(dismiss_dialog))
        .route("/api/v1/shell", get(shell_state))
        .with_state(state)
}

pub fn report_endpoint(kind: ReportKind) -> String {
    format!("/api/v1/reports/{kind}")
}

async fn index_page(
    State(state): State<UiState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let dialog = state.shell.lock().await.dialog().cloned();
    let buttons: Vec<ButtonView> = ReportKind::ALL
        .into_iter()
        .map(|kind| ButtonView {
            kind,
            label: kind.button_label(),
            endpoint: report_endpoint(kind),
        })
        .collect();

    let mut context = Context::new();
    context.insert("window_title", WINDOW_TITLE);
    context.insert("buttons", &buttons);
    context.insert("dialog", &dialog);
    context.insert("dismiss_endpoint", DISMISS_ENDPOINT);

    state.templates.render(INDEX_TEMPLATE, &context).map(Html).map_err(|err| {
        error!(event_name = "ui.index.render_failed", error = %err, "index template failed");
        let page = Html("<h1>Error</h1><p>window unavailable</p>".to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, page)
    })
}

async fn services_report(State(state): State<UiState>) -> Response {
    run_report(&state, ReportKind::Services).await
}

async fn weekly_report(State(state): State<UiState>) -> Response {
    run_report(&state, ReportKind::Weekly).await
}

async fn run_report(state: &UiState, kind: ReportKind) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "ui.report.requested",
        report_kind = %kind,
        correlation_id = %correlation_id,
        "report requested"
    );

    let mut shell = state.shell.lock().await;
    let outcome = shell.trigger(&*state.generator, kind, &correlation_id).await;
    drop(shell);

    let correlation = HeaderValue::from_str(&correlation_id).ok();
    let mut response = match outcome {
        Ok(chart) => {
            ([(header::CONTENT_TYPE, HeaderValue::from_static(chart.media_type))], chart.body)
                .into_response()
        }
        Err(dialog) => (status_for(&dialog), Json(dialog)).into_response(),
    };
    if let Some(value) = correlation {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

pub fn status_for(dialog: &ErrorDialog) -> StatusCode {
    match dialog.error_class {
        "no_data" => StatusCode::UNPROCESSABLE_ENTITY,
        "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn dismiss_dialog(State(state): State<UiState>) -> Json<DismissResponse> {
    let mut shell = state.shell.lock().await;
    let dismissed = shell.dismiss();
    Json(DismissResponse { dismissed, state: shell.state().clone() })
}

async fn shell_state(State(state): State<UiState>) -> Json<ShellView> {
    let shell = state.shell.lock().await;
    Json(ShellView { window_title: WINDOW_TITLE, state: shell.state().clone() })
}
