use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Export attempted with nothing to export. Surfaced as a warning, not a
    /// failure; no file is written.
    #[error("Nothing to export yet. Ask a question first.")]
    EmptyTranscript,

    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("could not write the export file: {0}")]
    Io(#[from] std::io::Error),
}
