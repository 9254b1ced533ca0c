//! Tracing initialization.

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing with a compact console format.
///
/// The filter honors `RUST_LOG`; without it, application and HTTP-layer
/// debug logging is enabled.
pub fn init_telemetry() {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "outfit_api=debug,outfit_core=debug,outfit_providers=debug,\
                     outfit_storage=debug,tower_http=debug"
                        .into()
                }),
        )
        .with(console_fmt)
        .init();
}
