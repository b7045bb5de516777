//! Environment Resolver
//!
//! Derives the backend origin and served-by mode from the page location and
//! the playback configuration. Pure; no I/O.

use std::net::IpAddr;

use url::Url;

use crate::config::{Environment, PlaybackConfig, ServedBy};
use crate::SourceError;

/// The parts of the page location the resolver looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub scheme: String,
    pub host: String,
    /// `None` when the URL uses the scheme's default port
    pub port: Option<u16>,
}

impl Location {
    pub fn new(scheme: &str, host: &str, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        }
    }

    /// Parse from the page URL
    pub fn parse(page_url: &str) -> Result<Self, SourceError> {
        let url = Url::parse(page_url).map_err(|e| SourceError::InvalidUrl(format!("{page_url}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| SourceError::InvalidUrl(format!("{page_url}: no host")))?;
        Ok(Self::new(url.scheme(), host, url.port()))
    }

    pub fn is_loopback(&self) -> bool {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        if host.eq_ignore_ascii_case("localhost") || host.ends_with(".localhost") {
            return true;
        }
        host.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
    }

    fn origin(&self, port: Option<u16>) -> String {
        match port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }
}

/// Outcome of environment resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub environment: Environment,
    pub base_url: String,
    pub served_by: ServedBy,
}

/// Classify a location when the configuration does not say.
///
/// A loopback host with an explicit port is a development server. A
/// production deployment on a non-default port is only recognised through
/// `PlaybackConfig::environment`.
pub fn classify(location: &Location) -> Environment {
    if location.is_loopback() && location.port.is_some() {
        Environment::Dev
    } else {
        Environment::Prod
    }
}

/// Resolve base URL and served-by mode
pub fn resolve_environment(location: &Location, config: &PlaybackConfig) -> ResolvedEnvironment {
    let environment = config.environment.unwrap_or_else(|| classify(location));

    let base_url = match (&config.base_url, environment) {
        (Some(base), _) => base.trim_end_matches('/').to_string(),
        (None, Environment::Dev) => {
            let dev = Location::new("http", &location.host, location.port);
            dev.origin(config.dev_server_port.or(location.port))
        }
        (None, Environment::Prod) => location.origin(location.port),
    };

    let served_by = config.served_by.unwrap_or(match environment {
        Environment::Dev => ServedBy::Dynamic,
        Environment::Prod => ServedBy::Static,
    });

    tracing::debug!("Resolved {:?} environment, {:?} at {}", environment, served_by, base_url);

    ResolvedEnvironment {
        environment,
        base_url,
        served_by,
    }
}

/// Prefix for shareable watch links; the video id is appended by the caller
pub fn public_watch_url(resolved: &ResolvedEnvironment, config: &PlaybackConfig) -> String {
    if let Some(domain) = config.shareable_link_domain.as_deref().filter(|d| !d.is_empty()) {
        return format!("{}/w/", domain.trim_end_matches('/'));
    }
    match resolved.environment {
        Environment::Dev => format!("{}/#/w/", resolved.base_url),
        Environment::Prod => format!("{}/w/", resolved.base_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_with_port_is_dev() {
        let location = Location::parse("http://localhost:3000/#/feed").unwrap();
        let resolved = resolve_environment(&location, &PlaybackConfig::default());

        assert_eq!(resolved.environment, Environment::Dev);
        assert_eq!(resolved.served_by, ServedBy::Dynamic);
        assert_eq!(resolved.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_dev_port_override() {
        let location = Location::parse("http://127.0.0.1:3000/").unwrap();
        let config = PlaybackConfig {
            dev_server_port: Some(5000),
            ..Default::default()
        };
        let resolved = resolve_environment(&location, &config);
        assert_eq!(resolved.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_localhost_without_port_is_prod() {
        let location = Location::parse("http://localhost/").unwrap();
        assert_eq!(classify(&location), Environment::Prod);
    }

    #[test]
    fn test_production_origin_keeps_port() {
        let location = Location::parse("https://clips.example.com:8443/w/abc").unwrap();
        let resolved = resolve_environment(&location, &PlaybackConfig::default());

        assert_eq!(resolved.environment, Environment::Prod);
        assert_eq!(resolved.served_by, ServedBy::Static);
        assert_eq!(resolved.base_url, "https://clips.example.com:8443");
    }

    #[test]
    fn test_default_port_is_dropped() {
        let location = Location::parse("https://clips.example.com:443/").unwrap();
        assert_eq!(location.port, None);
    }

    #[test]
    fn test_explicit_config_wins() {
        let location = Location::parse("http://localhost:3000/").unwrap();
        let config = PlaybackConfig {
            environment: Some(Environment::Prod),
            served_by: Some(ServedBy::Dynamic),
            base_url: Some("https://media.example.com/".into()),
            ..Default::default()
        };
        let resolved = resolve_environment(&location, &config);

        assert_eq!(resolved.environment, Environment::Prod);
        assert_eq!(resolved.served_by, ServedBy::Dynamic);
        assert_eq!(resolved.base_url, "https://media.example.com");
    }

    #[test]
    fn test_ipv6_loopback() {
        let location = Location::parse("http://[::1]:8080/").unwrap();
        assert!(location.is_loopback());
        assert_eq!(classify(&location), Environment::Dev);
    }

    #[test]
    fn test_public_watch_url() {
        let dev = resolve_environment(
            &Location::parse("http://localhost:3000/").unwrap(),
            &PlaybackConfig::default(),
        );
        assert_eq!(public_watch_url(&dev, &PlaybackConfig::default()), "http://localhost:3000/#/w/");

        let prod = resolve_environment(
            &Location::parse("https://clips.example.com/").unwrap(),
            &PlaybackConfig::default(),
        );
        assert_eq!(public_watch_url(&prod, &PlaybackConfig::default()), "https://clips.example.com/w/");

        let config = PlaybackConfig {
            shareable_link_domain: Some("https://s.example".into()),
            ..Default::default()
        };
        assert_eq!(public_watch_url(&prod, &config), "https://s.example/w/");
    }
}
