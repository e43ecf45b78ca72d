//! Recorders for delegate events and change callbacks.

use std::cell::RefCell;

use brickflow_foundation::{ItemAttributes, SectionDelegate};
use brickflow_ui_graphics::Rect;

/// Remembers every `did_create_attributes` call as `(section, index)`.
#[derive(Default)]
pub struct RecordingDelegate {
    created: RefCell<Vec<(usize, usize)>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<(usize, usize)> {
        self.created.borrow().clone()
    }

    pub fn created_indices(&self) -> Vec<usize> {
        self.created.borrow().iter().map(|&(_, index)| index).collect()
    }

    pub fn clear(&self) {
        self.created.borrow_mut().clear();
    }
}

impl SectionDelegate for RecordingDelegate {
    fn did_create_attributes(&self, section: usize, attributes: &ItemAttributes) {
        self.created.borrow_mut().push((section, attributes.index));
    }
}

/// One change-callback invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributesChange {
    pub index: usize,
    pub frame: Rect,
    pub old_frame: Option<Rect>,
}

/// Collects change-callback invocations.
///
/// ```ignore
/// let mut recorder = UpdateRecorder::default();
/// section.invalidate_all(Some(&mut recorder.callback()));
/// assert_eq!(recorder.indices(), vec![0, 1, 2]);
/// ```
#[derive(Default, Debug)]
pub struct UpdateRecorder {
    changes: Vec<AttributesChange>,
}

impl UpdateRecorder {
    pub fn callback(&mut self) -> impl FnMut(&ItemAttributes, Option<Rect>) + '_ {
        move |attributes: &ItemAttributes, old_frame: Option<Rect>| {
            self.changes.push(AttributesChange {
                index: attributes.index,
                frame: attributes.frame,
                old_frame,
            });
        }
    }

    pub fn changes(&self) -> &[AttributesChange] {
        &self.changes
    }

    pub fn indices(&self) -> Vec<usize> {
        self.changes.iter().map(|change| change.index).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}
