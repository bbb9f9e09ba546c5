use thiserror::Error;
use tzr_data::DataError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("failed to render csv export: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write csv export: {0}")]
    Io(#[from] std::io::Error),
}
