use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use tracing_tree::HierarchicalLayer;

/// Installs a global subscriber that prints spans as an indented tree.
///
/// Filtering follows `RUST_LOG` and defaults to `warn`. Calling this again
/// after a subscriber is installed does nothing.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let tree = HierarchicalLayer::new(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_bracketed_fields(true)
        .with_filter(filter);
    let subscriber = Registry::default().with(tree);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("a tracing subscriber is already installed");
    }
}
