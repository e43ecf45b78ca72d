//! A configurable, deterministic [`SectionDataSource`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use brickflow_foundation::{
    width_for_ratio, DownstreamIndices, ItemAttributes, ScrollDirection, SectionDataSource,
    ZIndexBehavior,
};
use brickflow_ui_graphics::{EdgeInsets, Rect, Size};

/// Identifier reported for items without an explicit one.
pub const DEFAULT_IDENTIFIER: &str = "Brick";

/// Data source with fixed item sizes.
///
/// Widths come from per-item ratios relative to `unit_width_ratio`, heights
/// from a per-item table with a fallback. Everything the engine reads can be
/// changed after the source is shared, so tests can move the frame of
/// interest or resize items between calls.
pub struct FixedSectionDataSource {
    default_height: Cell<f32>,
    heights: RefCell<BTreeMap<usize, f32>>,
    default_width_ratio: Cell<f32>,
    width_ratios: RefCell<BTreeMap<usize, f32>>,
    unit_width_ratio: Cell<f32>,
    identifiers: RefCell<BTreeMap<usize, String>>,
    edge_insets: Cell<EdgeInsets>,
    inset: Cell<f32>,
    frame_of_interest: Cell<Rect>,
    downstream_indices: RefCell<Vec<usize>>,
    align_row_heights: Cell<bool>,
    scroll_direction: Cell<ScrollDirection>,
    z_index_behavior: Cell<ZIndexBehavior>,
    only_calculate_frame_of_interest: Cell<bool>,
    estimate_sizes: Cell<bool>,
    size_calls: Cell<usize>,
}

impl FixedSectionDataSource {
    /// Full-width items of `height`, with an unbounded frame of interest.
    pub fn new(height: f32) -> Self {
        Self {
            default_height: Cell::new(height),
            heights: RefCell::new(BTreeMap::new()),
            default_width_ratio: Cell::new(1.0),
            width_ratios: RefCell::new(BTreeMap::new()),
            unit_width_ratio: Cell::new(1.0),
            identifiers: RefCell::new(BTreeMap::new()),
            edge_insets: Cell::new(EdgeInsets::ZERO),
            inset: Cell::new(0.0),
            frame_of_interest: Cell::new(Rect::new(0.0, 0.0, f32::MAX, f32::MAX)),
            downstream_indices: RefCell::new(Vec::new()),
            align_row_heights: Cell::new(false),
            scroll_direction: Cell::new(ScrollDirection::Vertical),
            z_index_behavior: Cell::new(ZIndexBehavior::BottomUp),
            only_calculate_frame_of_interest: Cell::new(true),
            estimate_sizes: Cell::new(false),
            size_calls: Cell::new(0),
        }
    }

    pub fn with_width_ratio(self, ratio: f32) -> Self {
        self.default_width_ratio.set(ratio);
        self
    }

    pub fn with_width_ratios(self, ratios: impl IntoIterator<Item = f32>) -> Self {
        self.width_ratios.borrow_mut().extend(ratios.into_iter().enumerate());
        self
    }

    pub fn with_unit_width_ratio(self, unit: f32) -> Self {
        self.unit_width_ratio.set(unit);
        self
    }

    pub fn with_heights(self, heights: impl IntoIterator<Item = f32>) -> Self {
        self.heights.borrow_mut().extend(heights.into_iter().enumerate());
        self
    }

    pub fn with_edge_insets(self, edge_insets: EdgeInsets) -> Self {
        self.edge_insets.set(edge_insets);
        self
    }

    pub fn with_inset(self, inset: f32) -> Self {
        self.inset.set(inset);
        self
    }

    pub fn with_frame_of_interest(self, rect: Rect) -> Self {
        self.frame_of_interest.set(rect);
        self
    }

    pub fn with_downstream_indices(self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.set_downstream_indices(indices);
        self
    }

    pub fn with_aligned_rows(self) -> Self {
        self.align_row_heights.set(true);
        self
    }

    pub fn with_scroll_direction(self, direction: ScrollDirection) -> Self {
        self.scroll_direction.set(direction);
        self
    }

    pub fn with_z_index_behavior(self, behavior: ZIndexBehavior) -> Self {
        self.z_index_behavior.set(behavior);
        self
    }

    /// Compute every item regardless of the frame of interest.
    pub fn with_eager_computation(self) -> Self {
        self.only_calculate_frame_of_interest.set(false);
        self
    }

    /// Report every new item as an estimated size.
    pub fn with_estimates(self) -> Self {
        self.estimate_sizes.set(true);
        self
    }

    pub fn set_frame_of_interest(&self, rect: Rect) {
        self.frame_of_interest.set(rect);
    }

    pub fn set_height(&self, index: usize, height: f32) {
        self.heights.borrow_mut().insert(index, height);
    }

    pub fn set_default_height(&self, height: f32) {
        self.default_height.set(height);
    }

    pub fn set_identifier(&self, index: usize, identifier: impl Into<String>) {
        self.identifiers.borrow_mut().insert(index, identifier.into());
    }

    pub fn set_downstream_indices(&self, indices: impl IntoIterator<Item = usize>) {
        *self.downstream_indices.borrow_mut() = indices.into_iter().collect();
    }

    pub fn set_align_row_heights(&self, align: bool) {
        self.align_row_heights.set(align);
    }

    /// How many times an item was measured since creation.
    pub fn size_calls(&self) -> usize {
        self.size_calls.get()
    }

    pub fn reset_size_calls(&self) {
        self.size_calls.set(0);
    }

    fn height_at(&self, index: usize) -> f32 {
        self.heights
            .borrow()
            .get(&index)
            .copied()
            .unwrap_or_else(|| self.default_height.get())
    }

    fn width_ratio_at(&self, index: usize) -> f32 {
        self.width_ratios
            .borrow()
            .get(&index)
            .copied()
            .unwrap_or_else(|| self.default_width_ratio.get())
    }
}

impl SectionDataSource for FixedSectionDataSource {
    fn frame_of_interest(&self) -> Rect {
        self.frame_of_interest.get()
    }

    fn edge_insets(&self, _section: usize) -> EdgeInsets {
        self.edge_insets.get()
    }

    fn inset(&self, _section: usize) -> f32 {
        self.inset.get()
    }

    fn width(&self, index: usize, total_width: f32, section: usize) -> f32 {
        width_for_ratio(
            self.width_ratio_at(index),
            self.unit_width_ratio.get(),
            total_width,
            self.inset(section),
        )
    }

    fn size(&self, attributes: &ItemAttributes, width: f32, _section: usize) -> Size {
        self.size_calls.set(self.size_calls.get() + 1);
        Size::new(width, self.height_at(attributes.index))
    }

    fn identifier(&self, index: usize, _section: usize) -> String {
        self.identifiers
            .borrow()
            .get(&index)
            .cloned()
            .unwrap_or_else(|| DEFAULT_IDENTIFIER.to_string())
    }

    fn align_row_heights(&self) -> bool {
        self.align_row_heights.get()
    }

    fn z_index_behavior(&self) -> ZIndexBehavior {
        self.z_index_behavior.get()
    }

    fn scroll_direction(&self) -> ScrollDirection {
        self.scroll_direction.get()
    }

    fn width_ratio(&self) -> f32 {
        self.unit_width_ratio.get()
    }

    fn only_calculate_frame_of_interest(&self) -> bool {
        self.only_calculate_frame_of_interest.get()
    }

    fn z_index(&self, index: usize, _section: usize) -> i32 {
        index as i32
    }

    fn is_estimate(&self, _attributes: &ItemAttributes, _section: usize) -> bool {
        self.estimate_sizes.get()
    }

    fn downstream_indices(&self, _section: usize) -> DownstreamIndices {
        self.downstream_indices.borrow().iter().copied().collect()
    }
}
