//! Outbound notifications from the document model to the presentation layer.

use std::collections::VecDeque;

use crate::properties::PropertySheet;

#[derive(Clone, Debug, PartialEq)]
pub enum DesignerEvent {
    ElementSelected {
        path: String,
        kind: String,
    },
    PropertiesChanged {
        path: String,
        kind: String,
        properties: PropertySheet,
    },
    PlacementRejected {
        reason: String,
    },
    FragmentListChanged {
        fragments: Vec<String>,
        current: usize,
    },
}

/// FIFO of pending events. The model pushes, the front-end drains once per
/// frame.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<DesignerEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: DesignerEvent) {
        self.pending.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = DesignerEvent> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
