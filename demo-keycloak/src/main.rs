use axum::{Router, routing::get};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keycloak_pkce_axum::{KEYCLOAK_ROUTE_PREFIX, KeycloakClient, KeycloakConfig, keycloak_router};

mod handlers;

use crate::handlers::{backend_user, index, protected};

const DEFAULT_BACKEND_API_URL: &str = "http://localhost:8081/api/user";

#[derive(Clone)]
pub(crate) struct AppState {
    http: reqwest::Client,
    backend_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,keycloak_pkce=debug,keycloak_pkce_axum=debug,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = KeycloakConfig::from_env()?;
    tracing::info!(
        "Keycloak realm {}, redirect URI {}",
        config.issuer_url,
        config.redirect_uri
    );
    let client = KeycloakClient::new(config)?;

    let state = AppState {
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?,
        backend_url: std::env::var("BACKEND_API_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_API_URL.to_string()),
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/protected", get(protected))
        .route("/api/backend/user", get(backend_user))
        .with_state(state)
        .nest(KEYCLOAK_ROUTE_PREFIX.as_str(), keycloak_router(client));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::debug!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
