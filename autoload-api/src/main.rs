use std::{net::IpAddr, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use autoload_api::create_router;
use autoload_config::{CONFIG, DEFAULT_PORT};
use autoload_core::runtime::Runtime;
use autoload_engine::{bigquery::BigQueryEngine, TableRef};
use axum::{
    extract::MatchedPath,
    http::Request,
    response::{Redirect, Response},
    routing::get,
    Router,
};
use clap::Parser;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{info_span, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa_scalar::{Scalar, Servable};
use utoipa_swagger_ui::SwaggerUi;

const AUTOLOAD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Destination coordinates for every triggered load. Left empty they pass
/// through to the engine, which rejects the submission.
#[derive(Debug, Parser)]
#[command(name = "autoload", version, about = "Loads finalized storage objects into an analytics table")]
struct Flags {
    /// Project owning the destination table
    #[arg(long, default_value = "")]
    project: String,
    /// Destination dataset
    #[arg(long, default_value = "")]
    dataset: String,
    /// Destination table
    #[arg(long, default_value = "")]
    table: String,
}

fn set_api_docs_info(mut openapi: utoipa::openapi::OpenApi) -> utoipa::openapi::OpenApi {
    openapi.info.title = "Autoload API".to_string();
    openapi.info.version = AUTOLOAD_VERSION.to_string();

    openapi
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let flags = Flags::parse();

    // The engine client is shared by every request; failing to build it is
    // fatal before serving anything.
    let engine = BigQueryEngine::new(&flags.project, &CONFIG.engine_endpoint, &CONFIG.access_token)
        .map_err(|e| anyhow::anyhow!("Failed to build load engine client: {}", e))?;

    let destination = TableRef::new(flags.project, flags.dataset, flags.table);
    let runtime = Arc::new(Runtime::new(destination, Arc::new(engine)));

    let (mut router, mut api_docs) = create_router(runtime);
    api_docs = set_api_docs_info(api_docs);

    router = router
        .merge(Scalar::with_url("/scalar/", api_docs.clone()))
        .route("/scalar", get(|| async { Redirect::to("/scalar/") }))
        .merge(SwaggerUi::new("/swagger").url("/api/openapi.json", api_docs.clone()));

    router = setup_tracing(router);

    if CONFIG.port.is_empty() {
        tracing::info!("PORT not set, defaulting to {}", DEFAULT_PORT);
    }
    let port: u16 = CONFIG
        .resolved_port()
        .parse()
        .with_context(|| format!("Failed to parse listen port {:?}", CONFIG.resolved_port()))?;

    let addr = std::net::SocketAddr::new(
        IpAddr::from_str(&CONFIG.host)
            .map_err(|e| anyhow::anyhow!("Failed to parse IP address from config: {}", e))?,
        port,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to address {}: {}", addr, e))?;

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, router)
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}

fn setup_tracing<T>(mut router: Router<T>) -> Router<T>
where
    T: Send + Sync + Clone + 'static,
{
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                // Log the matched route's path (with placeholders not filled in).
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                )
            })
            .on_response(|_response: &Response, latency: Duration, _span: &Span| {
                tracing::debug!("Response completed. Duration: {:?}", latency);
            })
            .on_failure(
                |_error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    tracing::error!("Request failed..")
                },
            ),
    );

    router
}
