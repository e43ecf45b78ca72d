//! The incremental recompute pass behind every [`LayoutSection`] mutator.
//!
//! Packing state is a cursor (`x`, `y`, `max_y`) in parent-compensated
//! coordinates. Rendered frames are the packed frames shifted by the offset
//! between the section origin and its parent's original origin.

use std::collections::btree_map::Entry;

use brickflow_ui_graphics::{EdgeInsets, Point, Rect, Size};
use rustc_hash::FxHashSet;

use super::item_attributes::ItemAttributes;
use super::layout_section::LayoutSection;
use super::row_packing::preceding_row;
use super::section_contract::{AttributesUpdated, ScrollDirection, SectionDataSource, ZIndexBehavior};

/// Slack allowed when deciding whether an item still fits in the current row.
const WRAP_TOLERANCE: f32 = 0.001;

/// Supplies a height for an existing item instead of re-measuring it.
pub(super) type CustomHeight<'a> = &'a dyn Fn(&ItemAttributes) -> Option<f32>;

/// Everything a pass reads from the data source, queried once up front.
struct PassContext {
    section: usize,
    edge_insets: EdgeInsets,
    inset: f32,
    direction: ScrollDirection,
    align_row_heights: bool,
    z_index_behavior: ZIndexBehavior,
    only_frame_of_interest: bool,
    frame_of_interest: Rect,
    /// Packing-space origin of the section.
    base: Point,
    /// Rendered = packed + offset.
    offset: Point,
    downstream: FxHashSet<usize>,
    invalidate: bool,
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    x: f32,
    y: f32,
    max_y: f32,
}

impl LayoutSection {
    /// Recomputes attributes starting at `first_index`.
    ///
    /// Existing attributes are always recomputed; new ones are created only
    /// while their origin falls inside the frame of interest, unless the data
    /// source lists them as downstream. With `invalidate` every size is
    /// queried again.
    pub(super) fn create_or_update_cells(
        &mut self,
        first_index: usize,
        invalidate: bool,
        updated: AttributesUpdated<'_>,
        custom_height: Option<CustomHeight<'_>>,
    ) {
        let Some(data_source) = self.data_source.clone() else {
            return;
        };
        let data_source = data_source.as_ref();
        let downstream = data_source.downstream_indices(self.section_index);
        let ctx = self.pass_context(data_source, downstream.iter().copied().collect(), invalidate);
        let mut cursor = self.resume_cursor(first_index, &ctx);

        let mut last_in_order = None;
        for index in first_index..self.number_of_items {
            let placed = self.create_or_update_attributes(
                index,
                data_source,
                &ctx,
                &mut cursor,
                false,
                updated,
                custom_height,
            );
            if !placed {
                break;
            }
            last_in_order = Some(index);
        }

        if ctx.align_row_heights {
            if let Some(index) = last_in_order {
                self.update_height_for_row(index, cursor.max_y - cursor.y, updated);
            }
        }

        // Forced items past the in-order frontier are placed again after it on
        // every pass, so they follow the frontier instead of going stale.
        let frontier = last_in_order.map_or(first_index, |index| index + 1);
        if ctx.only_frame_of_interest {
            for &index in &downstream {
                if index >= self.number_of_items {
                    log::warn!(
                        "section {}: downstream index {} out of range ({} items)",
                        self.section_index,
                        index,
                        self.number_of_items
                    );
                    continue;
                }
                if index < frontier && self.attributes.contains_key(&index) {
                    continue;
                }
                self.create_or_update_attributes(
                    index,
                    data_source,
                    &ctx,
                    &mut cursor,
                    true,
                    updated,
                    custom_height,
                );
            }
        }

        self.update_section_frame(first_index, &ctx);

        log::debug!(
            "section {}: pass from {} (invalidate: {}), {} of {} computed, frame {:?}",
            self.section_index,
            first_index,
            invalidate,
            self.attributes.len(),
            self.number_of_items,
            self.frame
        );
    }

    fn pass_context(
        &self,
        data_source: &dyn SectionDataSource,
        downstream: FxHashSet<usize>,
        invalidate: bool,
    ) -> PassContext {
        let section = self.section_index;
        let (base, offset) = match self.parent {
            Some(parent) => {
                let base = parent.original_frame.origin();
                (base, self.frame.origin() - base)
            }
            None => (self.frame.origin(), Point::ZERO),
        };

        PassContext {
            section,
            edge_insets: data_source.edge_insets(section),
            inset: data_source.inset(section),
            direction: data_source.scroll_direction(),
            align_row_heights: data_source.align_row_heights(),
            z_index_behavior: data_source.z_index_behavior(),
            only_frame_of_interest: data_source.only_calculate_frame_of_interest(),
            frame_of_interest: data_source.frame_of_interest(),
            base,
            offset,
            downstream,
            invalidate,
        }
    }

    /// Cursor right after the last visible item before `first_index`.
    fn resume_cursor(&self, first_index: usize, ctx: &PassContext) -> Cursor {
        let start = Cursor {
            x: ctx.base.x + ctx.edge_insets.left,
            y: ctx.base.y + ctx.edge_insets.top,
            max_y: ctx.base.y,
        };
        if first_index == 0 || self.attributes.is_empty() {
            return start;
        }

        match preceding_row(first_index, &self.attributes) {
            Some(row) => Cursor {
                x: row.last.original_frame.max_x() + ctx.inset,
                y: row.last.original_frame.y,
                max_y: row.tallest.original_frame.max_y().max(ctx.base.y),
            },
            None => start,
        }
    }

    /// Places one item. Returns false when the item was culled.
    #[allow(clippy::too_many_arguments)]
    fn create_or_update_attributes(
        &mut self,
        index: usize,
        data_source: &dyn SectionDataSource,
        ctx: &PassContext,
        cursor: &mut Cursor,
        force: bool,
        updated: AttributesUpdated<'_>,
        custom_height: Option<CustomHeight<'_>>,
    ) -> bool {
        let section = ctx.section;
        let mut width = self.width_at_index(index, data_source);
        let existing = self.attributes.get(&index);
        let exists = existing.is_some();
        let hidden = existing.is_some_and(|attributes| attributes.hidden);

        let mut next_x = cursor.x;
        let mut next_y = cursor.y;
        // Hidden items never start a new row.
        let wraps = ctx.direction.is_vertical()
            && !hidden
            && next_x + width - ctx.base.x
                > self.section_width - ctx.edge_insets.right + WRAP_TOLERANCE;
        if wraps {
            if ctx.align_row_heights && index > 0 {
                self.update_height_for_row(index - 1, cursor.max_y - next_y, updated);
            }
            if cursor.max_y > next_y {
                next_y = cursor.max_y + ctx.inset;
            }
            next_x = ctx.base.x + ctx.edge_insets.left;
        }

        let origin = Point::new(next_x + ctx.offset.x, next_y + ctx.offset.y);
        let forced = force || ctx.downstream.contains(&index);
        if ctx.only_frame_of_interest
            && !exists
            && !forced
            && !ctx.frame_of_interest.contains_point(origin)
        {
            log::trace!(
                "section {}: item {} at {:?} outside frame of interest",
                section,
                index,
                origin
            );
            return false;
        }

        let recalculate_z_index = !exists || ctx.invalidate;
        let (attributes, old_frame, old_original) = match self.attributes.entry(index) {
            Entry::Occupied(entry) => {
                let attributes = entry.into_mut();
                let old_frame = attributes.frame;
                let old_original = attributes.original_frame;
                if ctx.invalidate {
                    attributes.reset();
                    attributes.is_estimate_size = data_source.is_estimate(attributes, section);
                }
                (attributes, Some(old_frame), Some(old_original))
            }
            Entry::Vacant(entry) => {
                let mut attributes = ItemAttributes::new(index, data_source.identifier(index, section));
                attributes.is_estimate_size = data_source.is_estimate(&attributes, section);
                (entry.insert(attributes), None, None)
            }
        };

        if recalculate_z_index && ctx.z_index_behavior == ZIndexBehavior::BottomUp {
            attributes.z_index = data_source.z_index(index, section);
        }

        data_source.prepare_for_size_calculation(attributes, width, origin, ctx.invalidate, section);

        let height = match old_original {
            Some(previous) if previous.width == width && !ctx.invalidate => custom_height
                .and_then(|custom_height| custom_height(attributes))
                .unwrap_or(previous.height),
            _ => {
                let size = data_source.size(attributes, width, section);
                width = size.width;
                size.height
            }
        };

        // Items that take no space stay at the cursor and never open a row.
        let origin = if attributes.hidden || height <= 0.0 {
            Point::new(cursor.x + ctx.offset.x, cursor.y + ctx.offset.y)
        } else {
            origin
        };
        let frame = Rect::from_origin_size(origin, Size::new(width, height));
        attributes.frame = frame;
        attributes.original_frame = frame.translate(-ctx.offset.x, -ctx.offset.y);

        if recalculate_z_index && ctx.z_index_behavior == ZIndexBehavior::TopDown {
            attributes.z_index = data_source.z_index(index, section);
        }
        attributes.sync_alpha();

        log::trace!("section {}: item {} -> {:?}", section, index, frame);

        if !exists {
            if let Some(delegate) = &self.delegate {
                delegate.did_create_attributes(section, attributes);
            }
        }
        if old_frame != Some(frame) {
            updated(attributes, old_frame);
        }

        if attributes.occupies_space() {
            let packed = attributes.original_frame;
            cursor.x = packed.max_x() + ctx.inset;
            cursor.y = packed.y;
            cursor.max_y = cursor.max_y.max(packed.max_y());
        }
        true
    }

    /// Stretches the rendered height of every visible item in the row ending
    /// at `index` to `max_height`.
    ///
    /// The row is walked backwards until an item starts at a different top,
    /// or the ledger has a gap.
    pub(super) fn update_height_for_row(
        &mut self,
        index: usize,
        max_height: f32,
        updated: AttributesUpdated<'_>,
    ) {
        if max_height <= 0.0 {
            return;
        }
        let Some(row_top) = self.attributes.get(&index).map(|a| a.original_frame.y) else {
            return;
        };

        for index in (0..=index).rev() {
            let Some(attributes) = self.attributes.get_mut(&index) else {
                break;
            };
            if attributes.original_frame.y != row_top {
                break;
            }
            if attributes.hidden || attributes.original_frame.height <= 0.0 {
                continue;
            }
            let old_frame = attributes.frame;
            if old_frame.height != max_height {
                attributes.frame.height = max_height;
                updated(attributes, Some(old_frame));
            }
        }
    }

    /// Derives the section frame from the computed attributes.
    ///
    /// Height along the flow axis is exact once every item is computed and
    /// extrapolated from the computed prefix otherwise.
    fn update_section_frame(&mut self, first_index: usize, ctx: &PassContext) {
        let edge_insets = ctx.edge_insets;
        let computed = self.contiguous_count();
        let trailing_row = preceding_row(computed, &self.attributes)
            .map(|row| (row.last.original_frame.max_x(), row.tallest.original_frame.max_y()));

        let mut height = 0.0;
        if let Some(first_top) = self.attributes.get(&0).map(|a| a.original_frame.y) {
            let max_y = trailing_row.map_or(first_top, |(_, max_y)| max_y);
            height = if computed < self.number_of_items && ctx.direction.is_vertical() {
                let fraction = computed as f32 / self.number_of_items as f32;
                ((max_y - first_top) + ctx.inset) / fraction
            } else {
                (max_y - first_top) + edge_insets.vertical_sum()
            };

            let origin_y = first_top + ctx.offset.y - edge_insets.top;
            if self.frame.y != origin_y {
                let difference = self.frame.y - origin_y;
                self.frame.y = origin_y;
                for (_, attributes) in self.attributes.range_mut(..first_index) {
                    attributes.frame.y -= difference;
                }
            }
        }
        if height <= edge_insets.vertical_sum() {
            height = 0.0;
        }
        self.frame.height = height;

        self.frame.width = match ctx.direction {
            ScrollDirection::Vertical => self.section_width,
            ScrollDirection::Horizontal => {
                let trailing_x = trailing_row
                    .map_or(ctx.base.x + edge_insets.left, |(max_x, _)| max_x);
                trailing_x + edge_insets.right - ctx.base.x
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::section_contract::{ParentAttributes, SectionDelegate};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Items sized from a table of (width, height) pairs.
    struct TableSource {
        sizes: Vec<(f32, f32)>,
        edge_insets: EdgeInsets,
        inset: f32,
        align_row_heights: bool,
        direction: ScrollDirection,
        z_index_behavior: ZIndexBehavior,
        log: RefCell<Vec<String>>,
    }

    impl TableSource {
        fn new(sizes: Vec<(f32, f32)>) -> Self {
            Self {
                sizes,
                edge_insets: EdgeInsets::ZERO,
                inset: 0.0,
                align_row_heights: false,
                direction: ScrollDirection::Vertical,
                z_index_behavior: ZIndexBehavior::BottomUp,
                log: RefCell::new(Vec::new()),
            }
        }
    }

    impl SectionDataSource for TableSource {
        fn frame_of_interest(&self) -> Rect {
            Rect::new(0.0, 0.0, f32::MAX, f32::MAX)
        }

        fn edge_insets(&self, _section: usize) -> EdgeInsets {
            self.edge_insets
        }

        fn inset(&self, _section: usize) -> f32 {
            self.inset
        }

        fn width(&self, index: usize, _total_width: f32, _section: usize) -> f32 {
            self.sizes[index].0
        }

        fn size(&self, attributes: &ItemAttributes, width: f32, _section: usize) -> Size {
            self.log.borrow_mut().push(format!("size {}", attributes.index));
            Size::new(width, self.sizes[attributes.index].1)
        }

        fn identifier(&self, index: usize, _section: usize) -> String {
            format!("item-{index}")
        }

        fn align_row_heights(&self) -> bool {
            self.align_row_heights
        }

        fn z_index_behavior(&self) -> ZIndexBehavior {
            self.z_index_behavior
        }

        fn scroll_direction(&self) -> ScrollDirection {
            self.direction
        }

        fn z_index(&self, index: usize, _section: usize) -> i32 {
            self.log.borrow_mut().push(format!("z {index}"));
            index as i32
        }
    }

    struct CreationLog(RefCell<Vec<usize>>);

    impl SectionDelegate for CreationLog {
        fn did_create_attributes(&self, _section: usize, attributes: &ItemAttributes) {
            self.0.borrow_mut().push(attributes.index);
        }
    }

    fn laid_out(source: TableSource) -> (LayoutSection, Rc<TableSource>) {
        let count = source.sizes.len();
        let source = Rc::new(source);
        let mut section =
            LayoutSection::new(0, count, Point::ZERO, 320.0).with_data_source(source.clone());
        section.invalidate_all(None);
        (section, source)
    }

    fn frames(section: &LayoutSection) -> Vec<Rect> {
        section.attributes().values().map(|a| a.frame).collect()
    }

    #[test]
    fn rows_wrap_at_section_width() {
        let (section, _) = laid_out(TableSource::new(vec![
            (200.0, 50.0),
            (120.0, 80.0),
            (121.0, 30.0),
            (200.0, 40.0),
        ]));

        assert_eq!(
            frames(&section),
            vec![
                Rect::new(0.0, 0.0, 200.0, 50.0),
                Rect::new(200.0, 0.0, 120.0, 80.0),
                Rect::new(0.0, 80.0, 121.0, 30.0),
                Rect::new(0.0, 110.0, 200.0, 40.0),
            ]
        );
        assert_eq!(section.frame().height, 150.0);
    }

    #[test]
    fn insets_separate_items_and_rows() {
        let mut source = TableSource::new(vec![(150.0, 50.0), (150.0, 50.0), (150.0, 50.0)]);
        source.edge_insets = EdgeInsets::from_components(5.0, 10.0, 5.0, 20.0);
        source.inset = 10.0;
        let (section, _) = laid_out(source);

        assert_eq!(
            frames(&section),
            vec![
                Rect::new(5.0, 10.0, 150.0, 50.0),
                Rect::new(165.0, 10.0, 150.0, 50.0),
                Rect::new(5.0, 70.0, 150.0, 50.0),
            ]
        );
        // 10 + 50 + 10 + 50 + 20
        assert_eq!(section.frame(), Rect::new(0.0, 0.0, 320.0, 140.0));
    }

    #[test]
    fn aligned_rows_take_tallest_height() {
        let mut source = TableSource::new(vec![(160.0, 50.0), (160.0, 90.0), (160.0, 30.0)]);
        source.align_row_heights = true;
        let (section, _) = laid_out(source);

        let first = section.attributes_at(0).expect("computed");
        assert_eq!(first.frame.height, 90.0);
        assert_eq!(first.original_frame.height, 50.0);
        assert_eq!(section.attributes_at(1).map(|a| a.frame.height), Some(90.0));
        // A lone last row is aligned to itself.
        assert_eq!(section.attributes_at(2).map(|a| a.frame), Some(Rect::new(0.0, 90.0, 160.0, 30.0)));
    }

    #[test]
    fn horizontal_flow_never_wraps() {
        let mut source = TableSource::new(vec![(200.0, 50.0), (200.0, 70.0), (200.0, 60.0)]);
        source.direction = ScrollDirection::Horizontal;
        source.inset = 10.0;
        let (section, _) = laid_out(source);

        assert_eq!(
            frames(&section),
            vec![
                Rect::new(0.0, 0.0, 200.0, 50.0),
                Rect::new(210.0, 0.0, 200.0, 70.0),
                Rect::new(420.0, 0.0, 200.0, 60.0),
            ]
        );
        assert_eq!(section.frame(), Rect::new(0.0, 0.0, 620.0, 70.0));
    }

    #[test]
    fn zero_height_items_stay_at_the_cursor() {
        let (section, _) = laid_out(TableSource::new(vec![(320.0, 50.0), (320.0, 0.0), (320.0, 50.0)]));

        // The empty item does not wrap, so it sits right after item 0.
        assert_eq!(section.attributes_at(1).map(|a| a.frame), Some(Rect::new(320.0, 0.0, 320.0, 0.0)));
        assert_eq!(section.attributes_at(2).map(|a| a.frame.y), Some(50.0));
        assert_eq!(section.frame().height, 100.0);
    }

    #[test]
    fn z_index_order_follows_behavior() {
        let (_, bottom_up) = laid_out(TableSource::new(vec![(320.0, 50.0)]));
        assert_eq!(*bottom_up.log.borrow(), vec!["z 0", "size 0"]);

        let mut source = TableSource::new(vec![(320.0, 50.0)]);
        source.z_index_behavior = ZIndexBehavior::TopDown;
        let (section, top_down) = laid_out(source);
        assert_eq!(*top_down.log.borrow(), vec!["size 0", "z 0"]);
        assert_eq!(section.attributes_at(0).map(|a| a.z_index), Some(0));
    }

    #[test]
    fn delegate_hears_each_creation_once() {
        let source = Rc::new(TableSource::new(vec![(320.0, 50.0), (320.0, 50.0)]));
        let delegate = Rc::new(CreationLog(RefCell::new(Vec::new())));
        let mut section = LayoutSection::new(0, 2, Point::ZERO, 320.0)
            .with_data_source(source)
            .with_delegate(delegate.clone());

        section.invalidate_all(None);
        section.invalidate_all(None);

        assert_eq!(*delegate.0.borrow(), vec![0, 1]);
    }

    #[test]
    fn unchanged_frames_are_not_reported() {
        let (mut section, _) = laid_out(TableSource::new(vec![(320.0, 50.0), (320.0, 50.0)]));

        let mut reported = 0;
        section.invalidate_all(Some(&mut |_: &ItemAttributes, _: Option<Rect>| reported += 1));
        assert_eq!(reported, 0);
    }

    #[test]
    fn parent_offset_moves_rendered_frames_only() {
        let source = Rc::new(TableSource::new(vec![(320.0, 50.0), (320.0, 50.0)]));
        let mut section = LayoutSection::new(1, 2, Point::new(0.0, 130.0), 320.0)
            .with_data_source(source)
            .with_parent(ParentAttributes::new(Rect::new(0.0, 100.0, 320.0, 100.0)));
        section.invalidate_all(None);

        let second = section.attributes_at(1).expect("computed");
        assert_eq!(second.original_frame, Rect::new(0.0, 150.0, 320.0, 50.0));
        assert_eq!(second.frame, Rect::new(0.0, 180.0, 320.0, 50.0));
        assert_eq!(section.frame(), Rect::new(0.0, 130.0, 320.0, 100.0));
    }

    #[test]
    fn resuming_mid_row_continues_after_last_item() {
        let (mut section, _) = laid_out(TableSource::new(vec![
            (100.0, 40.0),
            (100.0, 60.0),
            (100.0, 50.0),
            (100.0, 50.0),
        ]));
        let before = frames(&section);

        section.invalidate(2, None);

        assert_eq!(frames(&section), before);
        assert_eq!(before[2], Rect::new(200.0, 0.0, 100.0, 50.0));
        assert_eq!(before[3], Rect::new(0.0, 60.0, 100.0, 50.0));
    }
}
