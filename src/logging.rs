//! Logging context
//!
//! The library only emits `tracing` events. Each component is handed a
//! span at construction and logs inside it; installing a subscriber is the
//! binary's job and happens once through [`init`].

use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber.
///
/// `RUST_LOG` takes precedence over the `verbose` flag. Calling this twice
/// is harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Default span for a component created without an injected one.
pub fn component_span(component: &'static str) -> Span {
    tracing::info_span!("component", name = component)
}

/// Child span of `parent`, used when a component builds its own sub-components.
pub fn child_span(parent: &Span, component: &'static str) -> Span {
    tracing::info_span!(parent: parent, "component", name = component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }

    #[test]
    fn test_spans_without_subscriber_are_usable() {
        let span = component_span("test");
        let child = child_span(&span, "child");
        let _guard = child.enter();
        tracing::info!("inside child span");
    }
}
