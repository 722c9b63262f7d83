//! Remote responder adapters.
//!
//! - [`EchoResponder`]: offline stand-in that repeats the user
//! - [`GeminiResponder`]: Google Gemini over HTTP (feature `gemini`)

mod echo;
#[cfg(feature = "gemini")]
mod gemini;

pub use echo::EchoResponder;
#[cfg(feature = "gemini")]
pub use gemini::{DEFAULT_GEMINI_ENDPOINT, GeminiResponder};

use crate::config::{FileResponderConfig, ResponderKind};
use clinichat_application::{RemoteResponder, ResponderError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the responder selected by `kind` from the `[responder]` section.
pub fn build_responder(
    kind: ResponderKind,
    config: &FileResponderConfig,
) -> Result<Arc<dyn RemoteResponder>, ResponderError> {
    info!("Using {} responder", kind);
    match kind {
        ResponderKind::Echo => Ok(Arc::new(
            EchoResponder::new().with_delay(Duration::from_millis(config.echo_delay_ms)),
        )),
        ResponderKind::Gemini => build_gemini(config),
    }
}

#[cfg(feature = "gemini")]
fn build_gemini(
    config: &FileResponderConfig,
) -> Result<Arc<dyn RemoteResponder>, ResponderError> {
    let mut responder = GeminiResponder::from_env(&config.api_key_env, config.model.clone())?;
    if let Some(endpoint) = &config.endpoint {
        responder = responder.with_endpoint(endpoint.clone());
    }
    if let Some(instruction) = &config.system_instruction {
        responder = responder.with_system_instruction(instruction.clone());
    }
    Ok(Arc::new(responder))
}

#[cfg(not(feature = "gemini"))]
fn build_gemini(
    _config: &FileResponderConfig,
) -> Result<Arc<dyn RemoteResponder>, ResponderError> {
    Err(ResponderError::Configuration(
        "this build does not include the gemini responder (enable the `gemini` feature)"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_echo() {
        let responder = build_responder(ResponderKind::Echo, &FileResponderConfig::default()).unwrap();
        assert_eq!(responder.name(), "echo");
    }

    #[test]
    fn test_build_gemini_without_key_fails() {
        let config = FileResponderConfig {
            api_key_env: "CLINICHAT_TEST_UNSET_API_KEY".to_string(),
            ..Default::default()
        };
        let result = build_responder(ResponderKind::Gemini, &config);
        assert!(matches!(result, Err(ResponderError::Configuration(_))));
    }
}
