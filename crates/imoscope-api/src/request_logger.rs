//! Env-gated request logging for persistent debugging.
//!
//! Set `IMOSCOPE_DEBUG_LOG` to dump each request/response summary under
//! `logs/`. Logging failures are swallowed; debugging must never break a
//! user-facing request.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::responses::{AnalyzeResponse, FollowUpRequest};

const ENV_FLAG: &str = "IMOSCOPE_DEBUG_LOG";
const LOG_DIR: &str = "logs";

fn enabled() -> bool {
    std::env::var(ENV_FLAG).is_ok()
}

fn log_file() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d");
    PathBuf::from(LOG_DIR).join(format!("imoscope-requests-{}.log", stamp))
}

fn append(entry: &str) {
    if fs::create_dir_all(LOG_DIR).is_err() {
        return;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file());
    if let Ok(mut file) = file {
        let _ = writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            entry
        );
    }
}

pub fn log_analyze_request(url: &str, file_name: &str, byte_len: usize, prompt: &str) {
    if !enabled() {
        return;
    }
    append(&format!(
        "POST {} image={} ({} bytes) prompt={:?}",
        url, file_name, byte_len, prompt
    ));
}

pub fn log_analyze_response(response: &AnalyzeResponse) {
    if !enabled() {
        return;
    }
    append(&format!(
        "analyze ok session={} result_len={}",
        response.session_id,
        response.result.len()
    ));
}

pub fn log_followup_request(url: &str, request: &FollowUpRequest) {
    if !enabled() {
        return;
    }
    append(&format!(
        "POST {} session={} prompt={:?}",
        url, request.session_id, request.prompt
    ));
}

pub fn log_failure(status: u16, message: &str) {
    if !enabled() {
        return;
    }
    append(&format!("request failed status={} error={:?}", status, message));
}
