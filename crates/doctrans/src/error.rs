#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    /// The input could not be opened or parsed. Nothing was written.
    #[error("Cannot read document: {0}")]
    DocumentRead(String),

    /// The output could not be persisted. No partial file is left behind.
    #[error("Cannot write document: {0}")]
    DocumentWrite(String),
}

impl From<pdf::PdfError> for Error {
    fn from(err: pdf::PdfError) -> Self {
        match err {
            pdf::PdfError::Read(_) | pdf::PdfError::Encrypted => Error::DocumentRead(err.to_string()),
            pdf::PdfError::Write(_) | pdf::PdfError::Io(_) => Error::DocumentWrite(err.to_string()),
            pdf::PdfError::Insertion(_) => Error::Generic(err.to_string()),
        }
    }
}
