//! Contact form submission
//!
//! Posts `{name, email, subject, message}` to the contact endpoint. The mail
//! service rejects messages while its sender address is unverified; that case
//! is reported separately so the caller can point to another channel instead
//! of showing a plain failure.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::ContactMessage;

/// Marker in the endpoint's error message for an unverified sender address
const UNVERIFIED_SENDER_MARKER: &str = "not verified";

/// Errors that can occur when submitting the contact form
#[derive(Debug, Error)]
pub enum ContactError {
    /// A required field is blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The email address is not plausible
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The endpoint refused the message
    #[error("Failed to send message (HTTP {status}){}", detail(.message))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Outcome of a submission the endpoint answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The message was accepted for delivery
    Sent,
    /// The mail service cannot deliver until its sender is verified
    SenderUnverified,
}

/// Error body of the contact endpoint
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ContactMessage {
    /// Checks that every field is filled in and the email looks like an address
    pub fn validate(&self) -> Result<(), ContactError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ContactError::MissingField(field));
            }
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(ContactError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// `local@domain.tld`, no whitespace
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// Client for the contact endpoint
#[derive(Debug, Clone)]
pub struct ContactClient {
    http_client: Client,
    endpoint: Url,
}

impl ContactClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http_client: Client, endpoint: Url) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    /// Validates and submits a message
    ///
    /// # Returns
    /// * `Ok(ContactOutcome::Sent)` - The endpoint accepted the message
    /// * `Ok(ContactOutcome::SenderUnverified)` - Rejected because the sender is unverified
    /// * `Err(ContactError)` - Validation, transport, or any other rejection
    pub async fn submit(&self, message: &ContactMessage) -> Result<ContactOutcome, ContactError> {
        message.validate()?;

        debug!("Submitting contact message to {}", self.endpoint);
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(ContactOutcome::Sent);
        }

        // Error bodies are best-effort; a missing or odd body is just a plain rejection
        let body = response.text().await.unwrap_or_default();
        let error_message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        if error_message
            .as_deref()
            .is_some_and(|m| m.contains(UNVERIFIED_SENDER_MARKER))
        {
            warn!("Contact endpoint reports an unverified sender");
            return Ok(ContactOutcome::SenderUnverified);
        }

        Err(ContactError::Rejected {
            status,
            message: error_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "Nice site".to_string(),
        }
    }

    fn endpoint(server: &MockServer) -> Url {
        Url::parse(&format!("{}/api/contact", server.uri())).unwrap()
    }

    #[test]
    fn test_validate_accepts_complete_message() {
        assert!(message().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_field() {
        let msg = ContactMessage {
            subject: "   ".to_string(),
            ..message()
        };
        assert!(matches!(msg.validate(), Err(ContactError::MissingField("subject"))));
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("ab.co"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a@bco"));
        assert!(!is_plausible_email("a@b@c.co"));
        assert!(!is_plausible_email("a b@c.co"));
    }

    #[tokio::test]
    async fn test_submit_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Nice site"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = ContactClient::new(endpoint(&server))
            .submit(&message())
            .await
            .unwrap();

        assert_eq!(outcome, ContactOutcome::Sent);
    }

    #[tokio::test]
    async fn test_unverified_sender_is_soft_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "Email address is not verified. The following identities failed the check"
            })))
            .mount(&server)
            .await;

        let outcome = ContactClient::new(endpoint(&server))
            .submit(&message())
            .await
            .unwrap();

        assert_eq!(outcome, ContactOutcome::SenderUnverified);
    }

    #[tokio::test]
    async fn test_other_rejection_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "message": "Bad request" })),
            )
            .mount(&server)
            .await;

        let err = ContactClient::new(endpoint(&server))
            .submit(&message())
            .await
            .unwrap_err();

        match err {
            ContactError::Rejected { status, message } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(message.as_deref(), Some("Bad request"));
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_message_never_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let msg = ContactMessage {
            email: "nope".to_string(),
            ..message()
        };
        let result = ContactClient::new(endpoint(&server)).submit(&msg).await;

        assert!(matches!(result, Err(ContactError::InvalidEmail(_))));
    }
}
