use crate::configuration::Settings;
use crate::credentials::TestCredentials;
use crate::probe_client::{LoginOutcome, ProbeClient, ProbeError, SignupReceipt};

/// Everything the probe learned in one run, printed by the binary as JSON.
#[derive(Debug, serde::Serialize)]
pub struct ProbeReport {
    pub username: String,
    pub email: String,
    pub signup: SignupReceipt,
    pub login: LoginOutcome,
    pub authenticated: bool,
    pub session_username_matches: bool,
}

/// Generate fresh credentials and drive the whole flow with them.
#[tracing::instrument(
    name = "Running the authentication probe",
    skip(settings),
    fields(base_url = %settings.application.base_url)
)]
pub async fn run(settings: Settings) -> Result<ProbeReport, ProbeError> {
    let credentials = TestCredentials::generate(&settings.probe);
    run_with_credentials(settings, credentials).await
}

/// The fixed signup-then-login sequence. Split out from [`run`] so tests and
/// other environments can pin the credentials instead of generating them.
pub async fn run_with_credentials(
    settings: Settings,
    credentials: TestCredentials,
) -> Result<ProbeReport, ProbeError> {
    tracing::info!(
        username = %credentials.username,
        email = %credentials.email,
        "Generated test credentials."
    );

    let client = ProbeClient::new(
        settings.application.base_url.clone(),
        settings.application.timeout(),
    )?;

    client.check_health().await?;
    let signup = client.sign_up(&credentials).await?;
    let login = client
        .log_in(&credentials.username, &credentials.password)
        .await?;

    let authenticated = login.session.is_authenticated();
    let session_username_matches = login
        .session
        .user
        .as_ref()
        .and_then(|user| user.username.as_deref())
        .map(|session_username| session_username == credentials.username)
        .unwrap_or(false);

    Ok(ProbeReport {
        username: credentials.username,
        email: credentials.email,
        signup,
        login,
        authenticated,
        session_username_matches,
    })
}
