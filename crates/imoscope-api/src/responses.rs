use serde::{Deserialize, Serialize};

/// Success body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub result: String,
}

/// Success body of `POST /api/followup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub result: String,
}

/// Failure body the service sends with non-success statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Request body of `POST /api/followup`. The initial analyze request is
/// multipart and built inline by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_response_uses_camel_case_session_id() {
        let resp: AnalyzeResponse =
            serde_json::from_str(r#"{"sessionId":"abc","result":"A cat."}"#).unwrap();
        assert_eq!(resp.session_id, "abc");
        assert_eq!(resp.result, "A cat.");
    }

    #[test]
    fn follow_up_request_serializes_camel_case() {
        let req = FollowUpRequest {
            session_id: "abc".to_string(),
            prompt: "what color?".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["prompt"], "what color?");
    }

    #[test]
    fn error_body_parses() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"image too large"}"#).unwrap();
        assert_eq!(body.error, "image too large");
    }
}
