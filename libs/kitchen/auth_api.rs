//! Staff authentication HTTP API client
//!
//! One-time-password login and password reset. OTP and token validity are
//! decided by the backend; the client only refuses empty inputs.

use crate::config::AuthApiSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AuthApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),
}

impl AuthApiError {
    /// Text suitable for showing to staff
    pub fn user_message(&self) -> String {
        match self {
            AuthApiError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            AuthApiError::Rejected { status, .. } if *status >= 500 => {
                "The server is unavailable, try again shortly".to_string()
            }
            AuthApiError::Rejected { .. } => "The request was rejected".to_string(),
            AuthApiError::MissingField(field) => format!("Please enter your {}", field),
            AuthApiError::RequestFailed(_) | AuthApiError::UnexpectedBody(_) => {
                "Could not reach the server".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthApiError>;

#[derive(Debug, Default, Deserialize)]
struct ApiReply {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyOtpBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody<'a> {
    token: &'a str,
    new_password: &'a str,
}

/// Auth API client
pub struct AuthApiClient {
    base_url: String,
    client: Client,
}

impl AuthApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_settings(settings: &AuthApiSettings) -> Result<Self> {
        Self::new(&settings.base_url, settings.timeout())
    }

    /// Email a one-time password
    pub async fn send_otp(&self, email: &str) -> Result<Option<String>> {
        require("email", email)?;
        self.post("auth/send-otp", &EmailBody { email }).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Option<String>> {
        require("email", email)?;
        require("otp", otp)?;
        self.post("auth/verify-otp", &VerifyOtpBody { email, otp })
            .await
    }

    /// Start the password reset flow for `email`
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        require("email", email)?;
        self.post("auth/forgot-password", &EmailBody { email })
            .await
    }

    pub async fn verify_reset_token(&self, token: &str) -> Result<Option<String>> {
        require("token", token)?;
        self.post("auth/verify-reset-token", &TokenBody { token })
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Option<String>> {
        require("token", token)?;
        require("new password", new_password)?;
        self.post(
            "auth/reset-password",
            &ResetPasswordBody {
                token,
                new_password,
            },
        )
        .await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Option<String>> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let reply = parse_reply(&text);

        if !status.is_success() {
            warn!(%status, "Auth API rejected {}", path);
            return Err(AuthApiError::Rejected {
                status: status.as_u16(),
                message: reply.ok().and_then(|reply| reply.message),
            });
        }

        let reply = reply?;
        info!(%status, "Auth API {} succeeded", path);
        Ok(reply.message)
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AuthApiError::MissingField(field));
    }
    Ok(())
}

/// An empty body is a valid reply without a message
fn parse_reply(text: &str) -> Result<ApiReply> {
    if text.trim().is_empty() {
        return Ok(ApiReply::default());
    }
    serde_json::from_str(text).map_err(|e| AuthApiError::UnexpectedBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply() {
        assert_eq!(
            parse_reply(r#"{"message":"sent"}"#).unwrap().message.as_deref(),
            Some("sent")
        );
        assert!(parse_reply("").unwrap().message.is_none());
        assert!(parse_reply(r#"{"ok":true}"#).unwrap().message.is_none());
        assert!(matches!(
            parse_reply("<html>"),
            Err(AuthApiError::UnexpectedBody(_))
        ));
    }

    #[test]
    fn test_user_message() {
        let rejected = AuthApiError::Rejected {
            status: 400,
            message: Some("Invalid OTP".to_string()),
        };
        assert_eq!(rejected.user_message(), "Invalid OTP");

        let outage = AuthApiError::Rejected {
            status: 503,
            message: None,
        };
        assert!(outage.user_message().contains("unavailable"));
        assert_eq!(
            AuthApiError::MissingField("email").user_message(),
            "Please enter your email"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AuthApiClient::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:3000/api");
    }
}
