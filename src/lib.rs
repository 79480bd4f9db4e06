pub mod configuration;
pub mod credentials;
pub mod csrf;
pub mod probe_client;
pub mod telemetry;
pub mod workflow;
