use crate::hal::exti::EdgeDetect;

/// Edge latch double. Tracks how many times the latch was
/// acknowledged, so tests can assert it is cleared exactly once
/// per serviced edge.
#[derive(Clone, Debug, Default)]
pub struct MockRequestLine {
    pub pending: bool,
    pub clears: usize,
}

impl MockRequestLine {
    pub fn latched() -> Self { Self { pending: true, clears: 0 } }
}

impl EdgeDetect for MockRequestLine {
    fn is_pending(&self) -> bool { self.pending }

    fn clear_pending(&mut self) {
        self.pending = false;
        self.clears += 1;
    }
}
