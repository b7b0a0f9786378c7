use std::sync::Arc;

use autoload_core::runtime::Runtime;
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod push;

#[derive(utoipa::OpenApi)]
#[openapi()]
pub struct ApiDoc;

/// Build the service router around a shared [`Runtime`].
///
/// The push handler is registered for `POST /` and as the fallback, so the
/// endpoint accepts the push envelope on any path with any method, the way
/// the notification transport delivers it.
pub fn create_router(runtime: Arc<Runtime>) -> (Router, utoipa::openapi::OpenApi) {
    let (router, api_docs) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(push::push))
        .split_for_parts();

    let router = router.fallback(push::push).with_state(runtime);

    (router, api_docs)
}
