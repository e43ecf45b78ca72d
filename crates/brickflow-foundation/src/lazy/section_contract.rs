//! Contracts between a [`LayoutSection`](super::LayoutSection) and its collaborators.
//!
//! The section never owns item configuration. Everything it needs to know
//! about widths, sizes and identity is asked from a [`SectionDataSource`];
//! creation events are reported to an optional [`SectionDelegate`].

use brickflow_ui_graphics::{EdgeInsets, Point, Rect, Size};
use smallvec::SmallVec;

use super::item_attributes::ItemAttributes;

/// Per-call change callback.
///
/// Receives every attribute whose rendered frame changed during the call,
/// together with its previous frame (`None` for newly created attributes).
pub type AttributesUpdated<'a> = &'a mut dyn FnMut(&ItemAttributes, Option<Rect>);

/// Indices that must be computed ahead of the lazy frontier.
pub type DownstreamIndices = SmallVec<[usize; 4]>;

/// Direction items flow in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    /// Rows wrap at the section width and stack downwards.
    #[default]
    Vertical,

    /// A single row that grows to the right; never wraps.
    Horizontal,
}

impl ScrollDirection {
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, ScrollDirection::Vertical)
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, ScrollDirection::Horizontal)
    }

    /// Leading edge of `rect` along the flow axis.
    #[inline]
    pub fn main_axis_start(self, rect: &Rect) -> f32 {
        match self {
            ScrollDirection::Vertical => rect.y,
            ScrollDirection::Horizontal => rect.x,
        }
    }
}

/// When the z-index of an item is assigned relative to its sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZIndexBehavior {
    /// Assigned before the size is computed.
    #[default]
    BottomUp,

    /// Assigned after the size is computed.
    TopDown,
}

/// Provides everything a section needs to lay out its items.
///
/// Calls are synchronous and must not re-enter the section that issued them.
pub trait SectionDataSource {
    /// Region items are eagerly materialised in.
    fn frame_of_interest(&self) -> Rect;

    /// Insets between the section edges and its content.
    fn edge_insets(&self, section: usize) -> EdgeInsets;

    /// Gap between two items, horizontally and between rows.
    fn inset(&self, section: usize) -> f32;

    /// Width of the item at `index` given the usable row width.
    fn width(&self, index: usize, total_width: f32, section: usize) -> f32;

    /// Measured (or estimated) size of an item laid out in `width`.
    fn size(&self, attributes: &ItemAttributes, width: f32, section: usize) -> Size;

    /// Stable identifier of the item at `index`.
    fn identifier(&self, index: usize, section: usize) -> String;

    /// Whether all items in a row are stretched to the tallest one.
    fn align_row_heights(&self) -> bool {
        false
    }

    fn z_index_behavior(&self) -> ZIndexBehavior {
        ZIndexBehavior::BottomUp
    }

    fn scroll_direction(&self) -> ScrollDirection {
        ScrollDirection::Vertical
    }

    /// Value representing a full row for ratio-based widths.
    fn width_ratio(&self) -> f32 {
        1.0
    }

    /// When false every pass runs to the item count, ignoring the frame of interest.
    fn only_calculate_frame_of_interest(&self) -> bool {
        true
    }

    fn z_index(&self, index: usize, section: usize) -> i32 {
        let _ = (index, section);
        0
    }

    fn is_estimate(&self, attributes: &ItemAttributes, section: usize) -> bool {
        let _ = (attributes, section);
        false
    }

    /// Indices computed regardless of the frame of interest.
    fn downstream_indices(&self, section: usize) -> DownstreamIndices {
        let _ = section;
        DownstreamIndices::new()
    }

    /// Called right before an item is sized, with the origin it will get.
    fn prepare_for_size_calculation(
        &self,
        attributes: &ItemAttributes,
        width: f32,
        origin: Point,
        invalidate: bool,
        section: usize,
    ) {
        let _ = (attributes, width, origin, invalidate, section);
    }
}

/// Receives section lifecycle events.
pub trait SectionDelegate {
    /// Called once per attribute, when it is first materialised.
    fn did_create_attributes(&self, section: usize, attributes: &ItemAttributes);
}

/// What a nested section needs to know about the attributes representing it
/// one level up. Pushed down by the owner; the section never holds on to the
/// parent itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParentAttributes {
    pub original_frame: Rect,
    pub hidden: bool,
}

impl ParentAttributes {
    pub fn new(original_frame: Rect) -> Self {
        Self {
            original_frame,
            hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_axis_start_follows_direction() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(ScrollDirection::Vertical.main_axis_start(&rect), 20.0);
        assert_eq!(ScrollDirection::Horizontal.main_axis_start(&rect), 10.0);
    }

    #[test]
    fn defaults() {
        assert_eq!(ScrollDirection::default(), ScrollDirection::Vertical);
        assert_eq!(ZIndexBehavior::default(), ZIndexBehavior::BottomUp);
        assert!(!ParentAttributes::new(Rect::ZERO).hidden);
    }
}
