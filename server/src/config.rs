use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use youtube_api::DEFAULT_BASE_URL;

/// Serves the latest uploads of a YouTube channel over HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "channel-videos", version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CHANNEL_VIDEOS_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the YouTube Data API, e.g. a local mock server
    #[arg(long, env = "YOUTUBE_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Timeout applied to every upstream request, in seconds
    #[arg(
        long,
        env = "YOUTUBE_REQUEST_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    /// Sent as the User-Agent of upstream requests
    #[arg(long, env = "YOUTUBE_APPLICATION_NAME", default_value = "channel-videos")]
    pub application_name: String,

    /// Allow cross-origin requests from any origin
    #[arg(long, env = "CHANNEL_VIDEOS_PERMISSIVE_CORS")]
    pub permissive_cors: bool,

    /// Serve the OpenAPI document and Swagger UI
    #[arg(long, env = "CHANNEL_VIDEOS_API_DOCS")]
    pub api_docs: bool,

    /// PEM certificate chain; serves HTTPS together with --tls-key
    #[arg(long, env = "CHANNEL_VIDEOS_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key; serves HTTPS together with --tls-cert
    #[arg(long, env = "CHANNEL_VIDEOS_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Certificate and key paths when HTTPS is configured
    pub fn tls_paths(&self) -> Option<(&Path, &Path)> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("channel-videos").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = parse(&["--api-key", "secret"]).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.application_name, "channel-videos");
        assert!(!config.permissive_cors);
        assert!(!config.api_docs);
        assert!(config.tls_paths().is_none());
    }

    #[test]
    fn overrides() {
        let config = parse(&[
            "--api-key",
            "secret",
            "--listen",
            "0.0.0.0:9000",
            "--api-base-url",
            "http://localhost:8080/youtube/v3",
            "--request-timeout-secs",
            "3",
            "--permissive-cors",
            "--api-docs",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
        ])
        .unwrap();

        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.api_base_url, "http://localhost:8080/youtube/v3");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert!(config.permissive_cors);
        assert!(config.api_docs);
        assert_eq!(
            config.tls_paths(),
            Some((Path::new("cert.pem"), Path::new("key.pem")))
        );
    }

    #[test]
    fn tls_cert_requires_key() {
        assert!(parse(&["--api-key", "secret", "--tls-cert", "cert.pem"]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(parse(&["--api-key", "secret", "--request-timeout-secs", "0"]).is_err());
    }
}
