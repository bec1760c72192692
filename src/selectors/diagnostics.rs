use tracing::debug;

/// Receives selector fallback events.
///
/// The resolver reports what happened; implementations decide whether that becomes a log
/// line, a metric or nothing at all.
pub trait Diagnostics {
    /// Strategy `position` (zero-based) found nothing and the resolver moved on
    fn strategy_failed(&self, position: usize, name: &str);

    fn strategy_matched(&self, position: usize, name: &str, count: usize);
}

/// Default hook, forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn strategy_failed(&self, position: usize, name: &str) {
        debug!(strategy = name, position, "selector strategy failed, falling back");
    }

    fn strategy_matched(&self, position: usize, name: &str, count: usize) {
        debug!(strategy = name, position, count, "selector strategy matched");
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn strategy_failed(&self, _position: usize, _name: &str) {}

    fn strategy_matched(&self, _position: usize, _name: &str, _count: usize) {}
}
