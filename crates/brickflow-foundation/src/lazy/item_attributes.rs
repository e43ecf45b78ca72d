//! Per-item layout attributes.
//!
//! Contains the result of laying out a single item of a section.

use brickflow_ui_graphics::Rect;

use super::row_packing::Frameable;

/// Layout attributes of one item in a [`LayoutSection`](super::LayoutSection).
///
/// Two frames are kept per item. `original_frame` is the packing ground truth
/// the engine resumes from; `frame` is what gets reported outward and is the
/// only field behaviors and row alignment are allowed to touch.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemAttributes {
    /// Index within the section.
    pub index: usize,

    /// Identifier used to recognise the same logical item across passes.
    pub identifier: String,

    /// Frame before any behavior overlay, in parent-compensated coordinates.
    pub original_frame: Rect,

    /// Rendered frame.
    pub frame: Rect,

    /// Whether the size is a provisional estimate.
    pub is_estimate_size: bool,

    /// Hidden items keep their attributes but take no space.
    pub hidden: bool,

    /// Paint order.
    pub z_index: i32,

    /// Derived from `hidden`.
    pub alpha: f32,
}

impl ItemAttributes {
    /// Creates unmeasured attributes for the item at `index`.
    pub fn new(index: usize, identifier: impl Into<String>) -> Self {
        Self {
            index,
            identifier: identifier.into(),
            original_frame: Rect::ZERO,
            frame: Rect::ZERO,
            is_estimate_size: true,
            hidden: false,
            z_index: 0,
            alpha: 1.0,
        }
    }

    /// Whether this item pushes the packing cursor forward.
    #[inline]
    pub fn occupies_space(&self) -> bool {
        !self.hidden && self.original_frame.height > 0.0
    }

    /// Back to the unmeasured state: zero frames, estimate flag set.
    pub(crate) fn reset(&mut self) {
        self.is_estimate_size = true;
        self.original_frame = Rect::ZERO;
        self.frame = Rect::ZERO;
    }

    pub(crate) fn sync_alpha(&mut self) {
        self.alpha = if self.hidden { 0.0 } else { 1.0 };
    }
}

impl Frameable for ItemAttributes {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn layout_frame(&self) -> Rect {
        self.original_frame
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}
