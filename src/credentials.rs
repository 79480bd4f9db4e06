use crate::configuration::ProbeSettings;
use rand::Rng;
use secrecy::Secret;

const USERNAME_SUFFIX_LENGTH: usize = 5;
const USERNAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A throwaway username/email/password triple, generated once per probe run.
#[derive(Clone)]
pub struct TestCredentials {
    pub username: String,
    pub email: String,
    pub password: Secret<String>,
}

impl TestCredentials {
    /// Generate a fresh set of credentials.
    ///
    /// The username is the configured prefix followed by five characters drawn
    /// uniformly from lowercase letters and digits; the email is derived from
    /// it deterministically. Generation cannot fail.
    pub fn generate(settings: &ProbeSettings) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..USERNAME_SUFFIX_LENGTH)
            .map(|_| {
                let index = rng.gen_range(0..USERNAME_CHARSET.len());
                USERNAME_CHARSET[index] as char
            })
            .collect();
        let username = format!("{}{}", settings.username_prefix, suffix);
        let email = format!("{}@{}", username, settings.email_domain);
        Self {
            username,
            email,
            password: settings.password.clone(),
        }
    }
}
