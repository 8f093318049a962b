use axum::Router;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};

/// Adds permissive CORS headers to every response and answers preflight
/// requests with an empty 204 before they reach a route.
pub fn wrap(router: Router) -> Router {
    router.layer(middleware::from_fn(cors))
}

async fn cors<B>(request: Request<B>, next: Next<B>) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));

    response
}
