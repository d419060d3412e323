use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes structured logging. `RUST_LOG` in the environment wins over `default_level`.
pub fn init_tracing(crate_name: &str, default_level: &str) {
    let target = crate_name.replace('-', "_");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{target}={default_level},portal_common={default_level},tower_http=info"
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
