//! # Chatvault Gateway Crate
//!
//! This crate provides the HTTP layer for the Chatvault message service,
//! translating REST requests into message repository calls and mapping
//! their outcomes onto response codes.
//!
//! ## Architecture
//!
//! - **REST**: HTTP API endpoints with OpenAPI documentation
//! - **State**: Shared application state holding the injected repository
//! - **Error**: Translation of store errors into HTTP responses

pub mod error;
pub mod rest;
pub mod state;

// Re-export main types for convenience
pub use error::{GatewayError, GatewayResult};
pub use state::{create_test_gateway_state, GatewayState};

pub use create_router as build_router;

use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);
    #[cfg_attr(not(debug_assertions), allow(unused_mut))]
    let mut router = Router::new()
        .merge(rest::create_rest_routes().with_state(arc_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Add Swagger UI if in debug mode
    #[cfg(debug_assertions)]
    {
        #[derive(OpenApi)]
        #[openapi(
            paths(
                rest::health::health_check,
                rest::message::create_message,
                rest::message::update_message,
                rest::message::list_messages,
                rest::message::get_message,
                rest::message::delete_message,
            ),
            components(
                schemas(
                    rest::health::HealthResponse,
                    rest::message::MessageResponse,
                    rest::message::CreateMessageRequest,
                    rest::message::UpdateMessageQuery,
                    rest::message::ListMessagesQuery,
                    rest::message::ErrorResponse,
                )
            ),
            tags(
                (name = "Health", description = "Service health"),
                (name = "Messages", description = "Message management"),
            )
        )]
        struct ApiDoc;

        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
}
