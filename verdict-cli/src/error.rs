use verdict::error::{CatalogError, DriverError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
