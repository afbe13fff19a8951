use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no order data available")]
    EmptyInput,
    #[error("order totals overflow")]
    TotalsOverflow,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("nothing to draw: every order line referenced an unknown service")]
    EmptySeries,
    #[error("chart series are misaligned: {labels} labels for {values} values")]
    MisalignedSeries { labels: usize, values: usize },
    #[error("drawing failed: {0}")]
    Drawing(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("data source unavailable: {0}")]
pub struct DataSourceError(pub String);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error("chart rendering failed: {0}")]
    Rendering(#[from] RenderError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("no data: {message}")]
    NoData { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::NoData { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::NoData { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let message = value.to_string();
        match value {
            ApplicationError::Domain(DomainError::EmptyInput)
            | ApplicationError::Rendering(RenderError::EmptySeries) => {
                Self::NoData { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::DataSource(_) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Domain(DomainError::TotalsOverflow)
            | ApplicationError::Rendering(_)
            | ApplicationError::Configuration(_) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{
        ApplicationError, DataSourceError, DomainError, InterfaceError, RenderError,
    };

    #[test]
    fn empty_input_maps_to_no_data_interface_error() {
        let interface = ApplicationError::from(DomainError::EmptyInput).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NoData {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
    }

    #[test]
    fn empty_series_is_reported_like_empty_input() {
        let interface =
            ApplicationError::from(RenderError::EmptySeries).into_interface("req-2");

        assert!(matches!(interface, InterfaceError::NoData { .. }));
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn data_source_error_maps_to_service_unavailable() {
        let interface =
            ApplicationError::from(DataSourceError("database is locked".to_owned()))
                .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn drawing_failure_maps_to_internal() {
        let interface = ApplicationError::from(RenderError::Drawing("io".to_owned()))
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(
            interface.to_string(),
            "internal error: chart rendering failed: drawing failed: io"
        );
    }

    #[test]
    fn totals_overflow_maps_to_internal() {
        let interface =
            ApplicationError::from(DomainError::TotalsOverflow).into_interface("req-5");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.to_string(), "internal error: order totals overflow");
    }

    #[test]
    fn application_error_keeps_the_underlying_message() {
        let error = ApplicationError::from(DomainError::EmptyInput);
        assert_eq!(error.to_string(), "no order data available");
    }
}
