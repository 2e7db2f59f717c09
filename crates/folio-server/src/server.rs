//! Preview server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use tower_http::services::ServeDir;

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Directory to serve
    pub dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            port: 4000,
            host: "127.0.0.1".to_string(),
            open: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Invalid address {0}:{1}")]
    InvalidAddress(String, u16),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),
}

/// Static file server over the built output.
pub struct PreviewServer {
    config: ServeConfig,
}

impl PreviewServer {
    /// Create a new preview server.
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    /// Serve until the process is interrupted.
    pub async fn start(self) -> Result<(), ServerError> {
        if !self.config.dir.exists() {
            return Err(ServerError::DirectoryNotFound(
                self.config.dir.display().to_string(),
            ));
        }

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.config.host.clone(), self.config.port))?;

        let app = Router::new().fallback_service(ServeDir::new(&self.config.dir));

        tracing::info!("Serving {} at http://{}", self.config.dir.display(), addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_targets_dist() {
        let config = ServeConfig::default();

        assert_eq!(config.dir, PathBuf::from("dist"));
        assert_eq!(config.port, 4000);
        assert!(!config.open);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let temp = tempdir().unwrap();

        let server = PreviewServer::new(ServeConfig {
            dir: temp.path().join("nope"),
            ..Default::default()
        });

        assert!(matches!(
            server.start().await,
            Err(ServerError::DirectoryNotFound(_))
        ));
    }
}
