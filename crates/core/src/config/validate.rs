use super::{
    types::{Config, DestinationBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Source base URL is set and max_results is within the API range
/// - The HTTP destination has a base URL
/// - Event log capacity and retry attempts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Source validation
    let youtube = &config.source.youtube;
    if youtube.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "source.base_url cannot be empty".to_string(),
        ));
    }
    if !(1..=50).contains(&youtube.max_results) {
        return Err(ConfigError::ValidationError(format!(
            "source.max_results must be between 1 and 50, got {}",
            youtube.max_results
        )));
    }

    // Destination validation
    if config.destination.backend == DestinationBackend::Http {
        let configured = config
            .destination
            .base_url
            .as_ref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false);
        if !configured {
            return Err(ConfigError::ValidationError(
                "destination.base_url is required when backend = \"http\"".to_string(),
            ));
        }
    }

    // Orchestrator validation
    if config.orchestrator.event_log_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.event_log_capacity cannot be 0".to_string(),
        ));
    }
    if config.orchestrator.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.retry.max_attempts cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_max_results_range() {
        let mut config = Config::default();
        config.source.youtube.max_results = 0;
        assert!(validate_config(&config).is_err());

        config.source.youtube.max_results = 51;
        assert!(validate_config(&config).is_err());

        config.source.youtube.max_results = 50;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_http_destination_needs_base_url() {
        let mut config = Config::default();
        config.destination.backend = DestinationBackend::Http;
        assert!(validate_config(&config).is_err());

        config.destination.base_url = Some("  ".to_string());
        assert!(validate_config(&config).is_err());

        config.destination.base_url = Some("http://localhost:9100".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_orchestrator_limits() {
        let mut config = Config::default();
        config.orchestrator.event_log_capacity = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("event_log_capacity"));

        let mut config = Config::default();
        config.orchestrator.retry.max_attempts = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }
}
