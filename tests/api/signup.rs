use crate::helpers::spawn_backend;
use authprobe::probe_client::{ProbeClient, ProbeError};
use claims::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, Request, ResponseTemplate};

struct SignupBodyMatcher;

impl wiremock::Match for SignupBodyMatcher {
    fn matches(&self, request: &Request) -> bool {
        // Check that all the mandatory fields are populated
        // without inspecting the field values
        let result: Result<serde_json::Value, _> = serde_json::from_slice(&request.body);
        if let Ok(body) = result {
            body.get("username").is_some()
                && body.get("email").is_some()
                && body.get("password").is_some()
        } else {
            false
        }
    }
}

#[tokio::test]
async fn signup_sends_a_json_request_with_the_expected_fields() {
    // Arrange
    let backend = spawn_backend().await;
    let credentials = backend.generate_credentials();
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .and(header("Content-Type", "application/json"))
        .and(SignupBodyMatcher)
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "message": "User registered successfully"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    // Act
    let outcome = backend.client().sign_up(&credentials).await;

    // Assert
    let receipt = assert_ok!(outcome);
    assert_eq!(receipt.status, 201);
    assert_eq!(receipt.body["message"], "User registered successfully");
}

#[tokio::test]
async fn a_duplicate_signup_is_rejected_with_the_response_body_attached() {
    // Arrange
    let backend = spawn_backend().await;
    let credentials = backend.generate_credentials();
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": "Username or email already exists"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    // Act
    let outcome = backend.client().sign_up(&credentials).await;

    // Assert
    let error = assert_err!(outcome);
    match error {
        ProbeError::SignupRejected { status, body } => {
            assert_eq!(status.as_u16(), 409);
            assert_eq!(body["error"], "Username or email already exists");
        }
        other => panic!("Expected SignupRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn a_server_error_with_a_json_body_is_a_rejected_signup() {
    // Arrange
    let backend = spawn_backend().await;
    let credentials = backend.generate_credentials();
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Failed to create user"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    // Act
    let outcome = backend.client().sign_up(&credentials).await;

    // Assert
    let error = assert_err!(outcome);
    match error {
        ProbeError::SignupRejected { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("Expected SignupRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn a_non_json_signup_response_is_an_unexpected_failure() {
    // Arrange
    let backend = spawn_backend().await;
    let credentials = backend.generate_credentials();
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&backend.server)
        .await;

    // Act
    let outcome = backend.client().sign_up(&credentials).await;

    // Assert
    let error = assert_err!(outcome);
    match error {
        ProbeError::Unexpected(_) => {}
        other => panic!("Expected Unexpected, got {:?}", other),
    }
}

#[tokio::test]
async fn signup_times_out_if_the_server_takes_too_long() {
    // Arrange
    let backend = spawn_backend().await;
    let credentials = backend.generate_credentials();
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(
            ResponseTemplate::new(201).set_delay(std::time::Duration::from_secs(180)),
        )
        .expect(1)
        .mount(&backend.server)
        .await;
    let client = ProbeClient::new(
        backend.settings.application.base_url.clone(),
        std::time::Duration::from_millis(200),
    )
    .expect("Failed to build the probe client.");

    // Act
    let outcome = client.sign_up(&credentials).await;

    // Assert
    let error = assert_err!(outcome);
    match error {
        ProbeError::Unexpected(_) => {}
        other => panic!("Expected Unexpected, got {:?}", other),
    }
}
