//! PDF export of a conversation transcript
//!
//! Line planning (wrapping, role prefixes, pagination) is pure and lives in
//! [`layout`]; [`pdf`] turns a plan into bytes with printpdf. The two are kept
//! apart so the layout is testable without parsing PDF output.

pub mod error;
pub mod layout;
pub mod pdf;

pub use error::ExportError;
pub use pdf::{export_session, ExportedDocument};
