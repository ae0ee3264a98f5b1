//! Drag-and-drop state for merging charts

use super::partition::ChartId;

/// Drag gesture state machine: idle, or dragging one chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ChartId),
}

impl DragState {
    /// Begin dragging `source`, replacing any unfinished gesture
    pub fn start(&mut self, source: ChartId) {
        *self = DragState::Dragging(source);
    }

    pub fn dragged(&self) -> Option<ChartId> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(id) => Some(*id),
        }
    }

    /// Finish the gesture with a drop on `target` (`None` when dropped outside
    /// any chart). Returns `(source, target)` when the drop asks for a merge.
    pub fn drop_on(&mut self, target: Option<ChartId>) -> Option<(ChartId, ChartId)> {
        let source = self.end()?;
        let target = target?;
        (source != target).then_some((source, target))
    }

    /// Abandon the gesture, returning the chart that was being dragged
    pub fn end(&mut self) -> Option<ChartId> {
        std::mem::take(self).dragged()
    }
}
