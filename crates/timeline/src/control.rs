//! Engine-side mirror of a range control node.
//!
//! The document host owns the real node. The engine keeps a small copy of
//! its bounds and value so aggregation and fan-out never have to call back
//! into the host mid-pass.

use ph_common::{NodeId, Span};

/// Mirrored state of one range control.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RangeControl {
    pub id: NodeId,
    pub range: Span,
    pub value: f64,
    /// Set once a union controller adopts this control.
    pub controller: Option<NodeId>,
}

impl RangeControl {
    pub fn new(id: NodeId, range: Span, value: f64) -> Self {
        Self {
            id,
            range,
            value: range.clamp(value),
            controller: None,
        }
    }

    pub fn is_slave(&self) -> bool {
        self.controller.is_some()
    }

    /// Replaces the bounds and re-clamps the held value into them.
    pub fn set_range(&mut self, range: Span) {
        self.range = range;
        self.value = range.clamp(self.value);
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = self.range.clamp(value);
    }

    pub fn enslave(&mut self, controller: NodeId) {
        self.controller = Some(controller);
    }

    pub fn release(&mut self) {
        self.controller = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_value_into_range() {
        let control = RangeControl::new(NodeId(1), Span::new(10.0, 20.0), 35.0);
        assert_eq!(control.value, 20.0);
    }

    #[test]
    fn set_range_reclamps_value() {
        let mut control = RangeControl::new(NodeId(1), Span::new(0.0, 100.0), 80.0);
        control.set_range(Span::new(0.0, 50.0));
        assert_eq!(control.value, 50.0);
    }

    #[test]
    fn enslave_and_release() {
        let mut control = RangeControl::new(NodeId(3), Span::new(0.0, 1.0), 0.5);
        assert!(!control.is_slave());
        control.enslave(NodeId(9));
        assert_eq!(control.controller, Some(NodeId(9)));
        control.release();
        assert!(!control.is_slave());
    }
}
