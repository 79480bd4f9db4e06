use crate::credentials::TestCredentials;
use crate::csrf::extract_csrf_token;
use anyhow::Context;
use reqwest::header::{REFERER, SET_COOKIE};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("The backend rejected the signup with status {status}.")]
    SignupRejected {
        status: StatusCode,
        body: serde_json::Value,
    },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// What the signup endpoint answered with.
#[derive(Debug, serde::Serialize)]
pub struct SignupReceipt {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Result of the full login flow: page fetch, signin POST, session check.
#[derive(Debug, serde::Serialize)]
pub struct LoginOutcome {
    pub login_status: u16,
    pub csrf_token: Option<String>,
    pub session: SessionSnapshot,
}

/// The session endpoint's JSON body, `{}` or `null` when anonymous.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub expires: Option<String>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(serde::Serialize)]
struct SignupRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(serde::Serialize)]
struct SigninForm<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "csrfToken", skip_serializing_if = "Option::is_none")]
    csrf_token: Option<&'a str>,
}

pub struct ProbeClient {
    base_url: String,
    // Signup and the health preflight go through a bare client; only the
    // login flow shares a cookie jar across its three requests.
    http_client: Client,
    session_client: Client,
}

impl ProbeClient {
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client.")?;
        let session_client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build the session HTTP client.")?;
        Ok(Self {
            base_url,
            http_client,
            session_client,
        })
    }

    /// One round trip to the health endpoint before touching the signup flow,
    /// so an unreachable backend fails with a clear error instead of a
    /// confusing signup one. A non-success status is logged but tolerated.
    #[tracing::instrument(name = "Health preflight", skip(self))]
    pub async fn check_health(&self) -> Result<(), ProbeError> {
        let url = format!("{}/api/health", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to reach the backend's health endpoint.")?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(status = status.as_u16(), "Backend is reachable.");
        } else {
            tracing::warn!(
                status = status.as_u16(),
                "Health endpoint returned a non-success status."
            );
        }
        Ok(())
    }

    #[tracing::instrument(
        name = "Signing up a test user",
        skip(self, credentials),
        fields(username = %credentials.username)
    )]
    pub async fn sign_up(&self, credentials: &TestCredentials) -> Result<SignupReceipt, ProbeError> {
        let url = format!("{}/api/signup", self.base_url);
        let request_body = SignupRequest {
            username: &credentials.username,
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .context("Failed to execute the signup request.")?;
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .context("The signup response body is not valid JSON.")?;
        tracing::info!(
            status = status.as_u16(),
            body = %serde_json::to_string_pretty(&body).unwrap_or_default(),
            "Signup response received."
        );
        if !status.is_success() {
            return Err(ProbeError::SignupRejected { status, body });
        }
        Ok(SignupReceipt {
            status: status.as_u16(),
            body,
        })
    }

    /// Walk the credentials-login flow: fetch the login page, harvest the
    /// CSRF token from its cookies, submit the signin form, then query the
    /// session endpoint to see what the backend thinks of us.
    ///
    /// The signin response's status is recorded, not checked; an
    /// unauthenticated outcome surfaces in the session snapshot instead.
    #[tracing::instrument(name = "Logging in a test user", skip(self, password))]
    pub async fn log_in(
        &self,
        username: &str,
        password: &Secret<String>,
    ) -> Result<LoginOutcome, ProbeError> {
        let login_page_url = format!("{}/login", self.base_url);
        let login_page = self
            .session_client
            .get(&login_page_url)
            .send()
            .await
            .context("Failed to fetch the login page.")?;
        tracing::info!(
            status = login_page.status().as_u16(),
            "Login page fetched."
        );

        let set_cookies: Vec<&str> = login_page
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        let csrf_token = extract_csrf_token(set_cookies);
        match &csrf_token {
            Some(token) => tracing::info!(
                token_length = token.len(),
                "Extracted a CSRF token from the login page cookies."
            ),
            None => tracing::warn!(
                "No CSRF token cookie on the login page; submitting the signin form without one."
            ),
        }

        let signin_url = format!("{}/api/auth/signin/credentials", self.base_url);
        let form = SigninForm {
            username,
            password: password.expose_secret(),
            csrf_token: csrf_token.as_deref(),
        };
        let login_response = self
            .session_client
            .post(&signin_url)
            .header(REFERER, &login_page_url)
            .form(&form)
            .send()
            .await
            .context("Failed to execute the signin request.")?;
        let login_status = login_response.status();
        tracing::info!(
            status = login_status.as_u16(),
            headers = ?login_response.headers(),
            "Signin response received."
        );

        let session = self.fetch_session().await?;
        Ok(LoginOutcome {
            login_status: login_status.as_u16(),
            csrf_token,
            session,
        })
    }

    #[tracing::instrument(name = "Fetching the session state", skip(self))]
    pub async fn fetch_session(&self) -> Result<SessionSnapshot, ProbeError> {
        let url = format!("{}/api/auth/session", self.base_url);
        let response = self
            .session_client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch the session endpoint.")?;
        let body: serde_json::Value = response
            .json()
            .await
            .context("The session response body is not valid JSON.")?;
        tracing::info!(
            session = %serde_json::to_string_pretty(&body).unwrap_or_default(),
            "Session state received."
        );
        if body.is_null() {
            // Some NextAuth versions answer `null` instead of `{}` for an
            // anonymous session.
            return Ok(SessionSnapshot::default());
        }
        serde_json::from_value(body)
            .context("The session response body has an unexpected shape.")
            .map_err(ProbeError::Unexpected)
    }
}
