//! Row packing helpers.
//!
//! Pure functions used by the section engine to size ratio-based columns and
//! to recover the state of a partially packed row from already computed frames.

use std::collections::BTreeMap;

use brickflow_ui_graphics::Rect;

/// Something that occupies a frame in a packed row.
pub trait Frameable {
    /// Frame as reported to the host.
    fn frame(&self) -> Rect;

    /// Frame the packing decisions were made with. Defaults to [`Frameable::frame`].
    fn layout_frame(&self) -> Rect {
        self.frame()
    }

    fn is_hidden(&self) -> bool {
        false
    }
}

impl Frameable for Rect {
    fn frame(&self) -> Rect {
        *self
    }
}

/// Width of a column that takes `ratio / unit_ratio` of a row.
///
/// The insets between columns are apportioned so that a full row of equal
/// ratios sums exactly to `total_width`:
/// `row_width = total_width - (unit_ratio / ratio - 1) * inset`.
///
/// # Arguments
/// * `ratio` - Ratio of the column
/// * `unit_ratio` - Value that represents a full row
/// * `total_width` - Usable width of the row
/// * `inset` - Gap between two columns
pub fn width_for_ratio(ratio: f32, unit_ratio: f32, total_width: f32, inset: f32) -> f32 {
    if ratio <= 0.0 || unit_ratio <= 0.0 {
        return 0.0;
    }
    let row_width = total_width - ((unit_ratio / ratio) - 1.0) * inset;
    row_width * (ratio / unit_ratio)
}

/// Returns the item with the lowest bottom edge in the row that precedes
/// `before_index`.
///
/// The row is the run of visible, non-zero-height frames sharing the top edge
/// of the last such frame before `before_index`. Indices missing from `frames`
/// are skipped. Returns `None` when `before_index` is 0, lies beyond the last
/// known index + 1, or nothing visible precedes it.
pub fn find_row_trailing_edge<T: Frameable>(
    before_index: usize,
    frames: &BTreeMap<usize, T>,
) -> Option<&T> {
    preceding_row(before_index, frames).map(|row| row.tallest)
}

/// The last visible frame before an index, and the tallest frame of its row.
pub(crate) struct PrecedingRow<'a, T> {
    pub(crate) last: &'a T,
    pub(crate) tallest: &'a T,
}

pub(crate) fn preceding_row<T: Frameable>(
    before_index: usize,
    frames: &BTreeMap<usize, T>,
) -> Option<PrecedingRow<'_, T>> {
    if before_index == 0 {
        return None;
    }
    let last_key = *frames.keys().next_back()?;
    if before_index > last_key + 1 {
        return None;
    }

    let mut visible = frames
        .range(..before_index)
        .rev()
        .map(|(_, item)| item)
        .filter(|item| !item.is_hidden() && item.layout_frame().height > 0.0);

    let last = visible.next()?;
    let row_top = last.layout_frame().y;
    let mut tallest = last;
    for item in visible {
        let frame = item.layout_frame();
        if frame.y != row_top {
            break;
        }
        if frame.max_y() > tallest.layout_frame().max_y() {
            tallest = item;
        }
    }

    Some(PrecedingRow { last, tallest })
}
