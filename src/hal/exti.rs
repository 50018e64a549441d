//! Interface to edge-triggered external event lines.

/// An edge-detect latch attached to an input line.
///
/// The hardware recognizes a signal transition and holds it latched
/// until explicitly acknowledged. Handlers must acknowledge the latch
/// as their first action, so an edge arriving while they run is
/// latched rather than lost (it is serviced once the handler returns;
/// queue depth is exactly one pending edge per line).
pub trait EdgeDetect {
    /// True if an edge has been latched and not yet acknowledged.
    fn is_pending(&self) -> bool;

    /// Acknowledges the latched edge, re-arming detection.
    fn clear_pending(&mut self);
}
