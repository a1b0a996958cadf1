//! Email dispatch route handler.
//!
//! Lets the hosted backend send transactional mail through our relay
//! credentials without holding them itself. Every failure, including a
//! request that does not parse, answers 500 with a JSON `{"error"}` body.

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::services::{DeliveryReceipt, EmailError};
use crate::state::AppState;

/// Body of an email dispatch request.
#[derive(Debug, PartialEq, Eq)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
}

impl SendEmailRequest {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::InvalidRequest` if the body is not a JSON object,
    /// `to` or `subject` is missing or not a string, or `html`/`text` is
    /// present but not a string.
    pub fn from_body(body: &[u8]) -> std::result::Result<Self, EmailError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| EmailError::InvalidRequest(format!("body is not valid JSON: {e}")))?;
        let Value::Object(fields) = value else {
            return Err(EmailError::InvalidRequest(
                "body must be a JSON object".to_string(),
            ));
        };

        let required = |key: &str| match fields.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(EmailError::InvalidRequest(format!("`{key}` must be a string"))),
            None => Err(EmailError::InvalidRequest(format!("`{key}` is required"))),
        };
        let optional = |key: &str| match fields.get(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Null) | None => Ok(None),
            Some(_) => Err(EmailError::InvalidRequest(format!("`{key}` must be a string"))),
        };

        Ok(Self {
            to: required("to")?,
            subject: required("subject")?,
            html: optional("html")?,
            text: optional("text")?,
        })
    }
}

/// Response for an accepted message.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub data: DeliveryReceipt,
}

/// Send an email.
///
/// POST /api/send-email
#[instrument(skip(state, body))]
pub async fn send(State(state): State<AppState>, body: Bytes) -> Result<Json<SendEmailResponse>> {
    let request = SendEmailRequest::from_body(&body)?;

    let data = state
        .email()
        .send(
            &request.to,
            &request.subject,
            request.text.as_deref(),
            request.html.as_deref(),
        )
        .await?;

    Ok(Json(SendEmailResponse {
        success: true,
        data,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies_are_optional() {
        let request = SendEmailRequest::from_body(
            br#"{"to": "diner@lunch.test", "subject": "Your order", "text": "On its way", "html": null}"#,
        )
        .unwrap();

        assert_eq!(request.text.as_deref(), Some("On its way"));
        assert_eq!(request.html, None);
    }

    #[test]
    fn test_missing_recipient_is_invalid() {
        let err = SendEmailRequest::from_body(br#"{"subject": "Hi", "text": "x"}"#).unwrap_err();
        assert!(matches!(err, EmailError::InvalidRequest(ref msg) if msg.contains("`to`")));
    }

    #[test]
    fn test_non_string_fields_are_invalid() {
        let err =
            SendEmailRequest::from_body(br#"{"to": "diner@lunch.test", "subject": 7}"#).unwrap_err();
        assert!(matches!(err, EmailError::InvalidRequest(ref msg) if msg.contains("`subject`")));

        let err = SendEmailRequest::from_body(
            br#"{"to": "diner@lunch.test", "subject": "Hi", "html": ["<p>"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EmailError::InvalidRequest(ref msg) if msg.contains("`html`")));
    }

    #[test]
    fn test_malformed_body_is_invalid() {
        assert!(matches!(
            SendEmailRequest::from_body(b"{\"to\": "),
            Err(EmailError::InvalidRequest(_))
        ));
        assert!(matches!(
            SendEmailRequest::from_body(b"[1, 2]"),
            Err(EmailError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_response_shape() {
        let body = serde_json::to_value(SendEmailResponse {
            success: true,
            data: DeliveryReceipt {
                message_id: "<id@lunch.test>".to_string(),
                response: "250 OK".to_string(),
            },
        })
        .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["message_id"], "<id@lunch.test>");
    }
}
