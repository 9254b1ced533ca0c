//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::handlers::generate::OutfitResponse;
use crate::handlers::health::HealthCheckResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Outfit API",
        version = "0.1.0",
        description = "Travel-outfit image synthesis API. Accepts a selfie, clothing photos, and a destination photo via multipart upload and returns one generated outfit image as base64. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::generate::generate_openai,
        handlers::generate::generate_gemini,
        handlers::health::health_check,
    ),
    components(schemas(OutfitResponse, HealthCheckResponse, ErrorResponse)),
    tags(
        (name = "outfits", description = "Outfit image generation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
