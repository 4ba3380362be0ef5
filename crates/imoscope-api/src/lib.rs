//! HTTP client for the remote analysis service
//!
//! The service is an opaque oracle: it takes an image plus a prompt and hands
//! back text. This crate owns the wire format, the error mapping, and nothing
//! else; conversation state lives in `imoscope-chat`.

pub mod client;
pub mod request_logger;
pub mod responses;

pub use client::{AnalysisBackend, AnalysisClient};
pub use responses::{AnalyzeResponse, ErrorBody, FollowUpResponse};
