use tracing::{debug, span, Level};

use crate::{DOMContent, DOMElement};

/// Pointer events. Enter and leave do not bubble: moving from an element into one of
/// its descendants does not leave the element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    PointerEnter,
    PointerLeave,
}

/// What a listener does to its element. The index points into the element's `contents`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show(usize),
    Hide(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub event: EventType,
    pub action: Action,
}

impl DOMElement {
    pub fn add_event(&mut self, event: EventType, action: Action) {
        self.listeners.push(Listener { event, action });
    }

    /// Run this element's listeners for `event`, returning how many ran
    pub fn fire(&mut self, event: EventType) -> usize {
        let DOMElement {
            listeners,
            contents,
            ..
        } = self;
        let mut ran = 0;
        for listener in listeners.iter().filter(|l| l.event == event) {
            let (idx, show) = match listener.action {
                Action::Show(idx) => (idx, true),
                Action::Hide(idx) => (idx, false),
            };
            if let Some(DOMContent::Element(target)) = contents.get_mut(idx) {
                if show {
                    target.show();
                } else {
                    target.hide();
                }
                ran += 1;
            }
        }
        ran
    }
}

/// Fire `event` on the element at `path` below `root`. Returns false if there is no
/// element there
pub fn dispatch(root: &mut DOMElement, path: &[usize], event: EventType) -> bool {
    match root.element_at_mut(path) {
        Some(target) => {
            let ran = target.fire(event);
            debug!(?path, ?event, ran, "Dispatched event");
            true
        }
        None => false,
    }
}

/// Tracks which element the pointer is over and turns moves into enter and leave events
#[derive(Debug, Default)]
pub struct Pointer {
    hovered: Option<Vec<usize>>,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&[usize]> {
        self.hovered.as_deref()
    }

    /// Move the pointer over the element at `target`, or off the tree entirely with
    /// `None`. Elements no longer under the pointer get a leave, deepest first, then
    /// newly covered elements get an enter, outermost first. An unknown path leaves
    /// the pointer where it was and returns false
    pub fn move_to(&mut self, root: &mut DOMElement, target: Option<&[usize]>) -> bool {
        let span = span!(Level::DEBUG, "Pointer move", ?target);
        let _enter = span.enter();
        if let Some(path) = target {
            if root.element_at(path).is_none() {
                return false;
            }
        }
        let old = self.hovered.take();
        // Number of elements, root included, that stay under the pointer
        let shared = match (&old, target) {
            (Some(old), Some(new)) => {
                1 + old
                    .iter()
                    .zip(new.iter())
                    .take_while(|(a, b)| a == b)
                    .count()
            }
            _ => 0,
        };
        if let Some(old) = &old {
            for depth in (shared..=old.len()).rev() {
                dispatch(root, &old[..depth], EventType::PointerLeave);
            }
        }
        if let Some(new) = target {
            for depth in shared..=new.len() {
                dispatch(root, &new[..depth], EventType::PointerEnter);
            }
        }
        self.hovered = target.map(<[usize]>::to_vec);
        true
    }
}
