mod config;

use axum::Router;
use clap::Parser;
use config::Config;
use eyre::WrapErr;
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use video_service::{ApiDoc, VideoFeedFetcher};
use youtube_api::YouTubeDataApi;

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

const SWAGGER_UI_PATH: &str = "/swagger";
const OPENAPI_DOC_PATH: &str = "/openapi/v1.json";

/// Development-only surfaces of the HTTP app
#[derive(Debug, Clone, Copy, Default)]
struct AppOptions {
    permissive_cors: bool,
    api_docs: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let config = Config::parse();

    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.application_name.as_str())
        .build()
        .wrap_err("build HTTP client")?;
    let platform = YouTubeDataApi::new(http_client, config.api_key.as_str())
        .with_base_url(config.api_base_url.as_str());
    tracing::info!(base_url = platform.base_url(), "using YouTube Data API");

    let fetcher = VideoFeedFetcher::new(Arc::new(platform)).with_call_timeout(config.request_timeout());
    let app = build_app(
        fetcher,
        AppOptions {
            permissive_cors: config.permissive_cors,
            api_docs: config.api_docs,
        },
    );

    match config.tls_paths() {
        Some((cert, key)) => serve_tls(config.listen, app, cert, key).await,
        None => serve(config.listen, app).await,
    }
}

fn build_app(fetcher: VideoFeedFetcher, options: AppOptions) -> Router {
    let app = video_service::create_router_with_fetcher(fetcher);
    let app = if options.api_docs {
        tracing::info!(path = SWAGGER_UI_PATH, "serving Swagger UI");
        app.merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_DOC_PATH, ApiDoc::openapi()))
    } else {
        app
    };
    let app = if options.permissive_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };
    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn serve(addr: SocketAddr, app: Router) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("bind to {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("run HTTP server")
}

async fn serve_tls(addr: SocketAddr, app: Router, cert: &Path, key: &Path) -> eyre::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| eyre::eyre!("a rustls crypto provider is already installed"))?;
    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .wrap_err_with(|| {
            format!(
                "load TLS certificate {} and key {}",
                cert.display(),
                key.display()
            )
        })?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
    });

    tracing::info!("Server listening on https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .wrap_err("run HTTPS server")
}

async fn shutdown_signal() {
    // shutdown still happens when ctrl-c fires, only the graceful drain is lost
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install Ctrl+C handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use video_service::CHANNEL_VIDEOS_PATH;
    use youtube_api::{StaticPlatform, VideoPlatform};

    fn app(options: AppOptions) -> Router {
        let platform: Arc<dyn VideoPlatform> = Arc::new(StaticPlatform::new());
        build_app(VideoFeedFetcher::new(platform), options)
    }

    fn preflight() -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri(CHANNEL_VIDEOS_PATH)
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn permissive_cors_allows_any_origin() {
        let app = app(AppOptions {
            permissive_cors: true,
            ..AppOptions::default()
        });

        let response = app.oneshot(preflight()).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn cors_headers_absent_by_default() {
        let app = app(AppOptions::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("{CHANNEL_VIDEOS_PATH}?channelUrl=https://www.youtube.com/channel/UC1"))
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn api_docs_are_served_when_enabled() {
        let app = app(AppOptions {
            api_docs: true,
            ..AppOptions::default()
        });

        let response = app
            .oneshot(Request::builder().uri(OPENAPI_DOC_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"][CHANNEL_VIDEOS_PATH]["get"].is_object());
    }

    #[tokio::test]
    async fn api_docs_are_hidden_by_default() {
        let app = app(AppOptions::default());

        let response = app
            .oneshot(Request::builder().uri(OPENAPI_DOC_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
