use authprobe::configuration::get_configuration;
use authprobe::probe_client::ProbeError;
use authprobe::telemetry::{get_subscriber, init_subscriber};
use authprobe::workflow;
use std::process::ExitCode;

// Exit codes: 0 on success, 1 when the backend rejected the signup (an
// expected HTTP-level failure), 2 for anything unexpected (network, parse,
// configuration).
const EXIT_SIGNUP_REJECTED: u8 = 1;
const EXIT_UNEXPECTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = get_subscriber("authprobe".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = match get_configuration() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read configuration.");
            return ExitCode::from(EXIT_UNEXPECTED);
        }
    };

    match workflow::run(settings).await {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => tracing::warn!(error = %e, "Failed to render the probe report."),
            }
            println!("Authentication probe completed successfully.");
            ExitCode::SUCCESS
        }
        Err(ProbeError::SignupRejected { status, body }) => {
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Authentication probe failed: the backend rejected the signup."
            );
            ExitCode::from(EXIT_SIGNUP_REJECTED)
        }
        Err(ProbeError::Unexpected(e)) => {
            tracing::error!(error = ?e, "Authentication probe failed unexpectedly.");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}
