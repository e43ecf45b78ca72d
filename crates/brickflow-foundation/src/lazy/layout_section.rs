//! The section layout engine.
//!
//! A [`LayoutSection`] owns the attributes of one section. Attributes are kept
//! in a sparse, index-ordered ledger: a missing key means "not computed yet",
//! never "does not exist". Every mutator funnels into one incremental pass
//! (see `section_pass`) that resumes packing from the requested index.

use std::collections::BTreeMap;
use std::rc::Rc;

use brickflow_ui_graphics::{Point, Rect};

use super::binary_search::closest_index;
use super::item_attributes::ItemAttributes;
use super::section_contract::{
    AttributesUpdated, ParentAttributes, SectionDataSource, SectionDelegate,
};

/// Lays out and tracks the items of a single section.
pub struct LayoutSection {
    pub(super) section_index: usize,
    pub(super) parent: Option<ParentAttributes>,
    pub(super) number_of_items: usize,
    pub(super) attributes: BTreeMap<usize, ItemAttributes>,
    pub(super) frame: Rect,
    /// Authoritative width. Differs from `frame.width` for horizontal flow,
    /// where the frame is as wide as the packed content.
    pub(super) section_width: f32,
    pub(super) data_source: Option<Rc<dyn SectionDataSource>>,
    pub(super) delegate: Option<Rc<dyn SectionDelegate>>,
}

impl LayoutSection {
    /// Creates an empty section. Nothing is computed until the first mutator
    /// (usually [`LayoutSection::invalidate_all`]) runs.
    pub fn new(section_index: usize, number_of_items: usize, origin: Point, section_width: f32) -> Self {
        Self {
            section_index,
            parent: None,
            number_of_items,
            attributes: BTreeMap::new(),
            frame: Rect::new(origin.x, origin.y, section_width, 0.0),
            section_width,
            data_source: None,
            delegate: None,
        }
    }

    pub fn with_data_source(mut self, data_source: Rc<dyn SectionDataSource>) -> Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn with_delegate(mut self, delegate: Rc<dyn SectionDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn with_parent(mut self, parent: ParentAttributes) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn set_data_source(&mut self, data_source: Option<Rc<dyn SectionDataSource>>) {
        self.data_source = data_source;
    }

    pub fn set_delegate(&mut self, delegate: Option<Rc<dyn SectionDelegate>>) {
        self.delegate = delegate;
    }

    /// Updates what this section knows about its attributes one level up.
    ///
    /// The owner pushes this before every pass that depends on it; the
    /// section keeps no link to the parent itself.
    pub fn set_parent_attributes(&mut self, parent: Option<ParentAttributes>) {
        self.parent = parent;
    }

    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn number_of_items(&self) -> usize {
        self.number_of_items
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn origin(&self) -> Point {
        self.frame.origin()
    }

    pub fn section_width(&self) -> f32 {
        self.section_width
    }

    pub fn parent_attributes(&self) -> Option<ParentAttributes> {
        self.parent
    }

    /// The sparse attribute ledger.
    pub fn attributes(&self) -> &BTreeMap<usize, ItemAttributes> {
        &self.attributes
    }

    pub fn attributes_at(&self, index: usize) -> Option<&ItemAttributes> {
        self.attributes.get(&index)
    }

    /// Number of materialised attributes, including out-of-order downstream ones.
    pub fn computed_count(&self) -> usize {
        self.attributes.len()
    }

    /// Length of the run of computed indices starting at 0.
    pub fn contiguous_count(&self) -> usize {
        match self.attributes.keys().next_back() {
            None => 0,
            Some(&last) if last + 1 == self.attributes.len() => self.attributes.len(),
            Some(_) => self
                .attributes
                .keys()
                .enumerate()
                .take_while(|(position, index)| position == *index)
                .count(),
        }
    }

    pub fn is_fully_computed(&self) -> bool {
        self.attributes.len() == self.number_of_items
    }

    /// Sets the authoritative item count.
    ///
    /// Growing extends computation from the computed tail; previously valid
    /// attributes are untouched. Shrinking drops attributes at `count` and
    /// above, highest index first, reporting each through `updated`, then
    /// re-packs the new last row.
    pub fn set_item_count(&mut self, count: usize, updated: Option<AttributesUpdated<'_>>) {
        if count == self.number_of_items {
            return;
        }
        with_callback(updated, |updated| {
            if count > self.number_of_items {
                self.number_of_items = count;
                let from = self.contiguous_count();
                self.create_or_update_cells(from, false, updated, None);
            } else {
                self.number_of_items = count;
                let removed = self.attributes.split_off(&count);
                for (_, attributes) in removed.into_iter().rev() {
                    updated(&attributes, Some(attributes.frame));
                }
                // Re-place the new last item so its row is aligned without
                // the removed items.
                let from = self.contiguous_count().min(count.saturating_sub(1));
                self.create_or_update_cells(from, false, updated, None);
            }
        });
    }

    pub fn append_item(&mut self, updated: Option<AttributesUpdated<'_>>) {
        self.set_item_count(self.number_of_items + 1, updated);
    }

    pub fn remove_last_item(&mut self, updated: Option<AttributesUpdated<'_>>) {
        if self.number_of_items == 0 {
            return;
        }
        self.set_item_count(self.number_of_items - 1, updated);
    }

    /// Moves the section, translating every computed attribute by the delta.
    ///
    /// When the move comes from a behavior overlay only the rendered frames
    /// move; the original frames stay where packing put them.
    pub fn set_origin(&mut self, origin: Point, from_behaviors: bool, updated: Option<AttributesUpdated<'_>>) {
        let current = self.frame.origin();
        if current == origin {
            return;
        }
        let delta = origin - current;
        self.frame.x = origin.x;
        self.frame.y = origin.y;

        with_callback(updated, |updated| {
            for attributes in self.attributes.values_mut() {
                let old_frame = attributes.frame;
                if !from_behaviors {
                    attributes.original_frame = attributes.original_frame.translate(delta.x, delta.y);
                }
                attributes.frame = attributes.frame.translate(delta.x, delta.y);
                updated(attributes, Some(old_frame));
            }
        });
    }

    /// Changing the width invalidates every row.
    pub fn set_section_width(&mut self, section_width: f32, updated: Option<AttributesUpdated<'_>>) {
        if self.section_width != section_width {
            self.section_width = section_width;
            self.invalidate_all(updated);
        }
    }

    /// Recomputes every materialised item from index 0, re-querying sizes.
    pub fn invalidate_all(&mut self, updated: Option<AttributesUpdated<'_>>) {
        with_callback(updated, |updated| {
            self.create_or_update_cells(0, true, updated, None);
        });
    }

    /// Records the exact height of an item and re-packs from it.
    ///
    /// Items further down that share the identifier and are still estimates
    /// take the same height instead of being measured again.
    pub fn set_height(&mut self, height: f32, index: usize, updated: Option<AttributesUpdated<'_>>) {
        let Some(attributes) = self.attributes.get_mut(&index) else {
            log::warn!(
                "section {}: height reported for item {} which is not computed",
                self.section_index,
                index
            );
            return;
        };
        attributes.is_estimate_size = false;
        if attributes.original_frame.height == height {
            return;
        }
        attributes.original_frame.height = height;

        let identifier = attributes.identifier.clone();
        let custom_height = move |candidate: &ItemAttributes| {
            (candidate.is_estimate_size && candidate.identifier == identifier).then_some(height)
        };
        with_callback(updated, |updated| {
            self.create_or_update_cells(index, false, updated, Some(&custom_height));
        });
    }

    /// Resets one item to unmeasured, sizes it again and re-packs from it.
    ///
    /// # Panics
    /// Panics when no data source is attached.
    #[track_caller]
    pub fn invalidate(&mut self, index: usize, updated: Option<AttributesUpdated<'_>>) {
        let Some(data_source) = self.data_source.clone() else {
            panic!(
                "LayoutSection::invalidate({index}) on section {} requires a data source",
                self.section_index
            );
        };
        if !self.attributes.contains_key(&index) {
            return;
        }

        let width = self.width_at_index(index, data_source.as_ref());
        let section = self.section_index;
        if let Some(attributes) = self.attributes.get_mut(&index) {
            attributes.reset();
            let size = data_source.size(attributes, width, section);
            attributes.original_frame.width = size.width;
            attributes.original_frame.height = size.height;
            attributes.frame.width = size.width;
            attributes.frame.height = size.height;
        }

        with_callback(updated, |updated| {
            self.create_or_update_cells(index, false, updated, None);
        });
    }

    /// Hides or shows an item; hidden items give their space back to the row.
    pub fn set_visibility(&mut self, hidden: bool, index: usize, updated: Option<AttributesUpdated<'_>>) {
        let Some(attributes) = self.attributes.get_mut(&index) else {
            return;
        };
        attributes.hidden = hidden;

        with_callback(updated, |updated| {
            self.create_or_update_cells(index, false, updated, None);
        });
    }

    /// Resumes lazy computation, typically after the frame of interest grew.
    ///
    /// Backs off by the number of downstream indices so that items forced
    /// ahead of the frontier get recomputed in sequence.
    pub fn continue_computing(&mut self, updated: Option<AttributesUpdated<'_>>) {
        if self.attributes.len() == self.number_of_items {
            return;
        }
        let Some(data_source) = self.data_source.clone() else {
            return;
        };
        let downstream = data_source.downstream_indices(self.section_index);
        let next_index = self.attributes.len().saturating_sub(downstream.len());

        with_callback(updated, |updated| {
            self.create_or_update_cells(next_index, false, updated, None);
        });
    }

    /// Overrides the rendered frame of a computed item.
    ///
    /// Meant for post-layout behaviors: the original frame is left alone so
    /// later passes still pack from it. Returns whether the frame changed.
    pub fn apply_rendered_frame(
        &mut self,
        index: usize,
        frame: Rect,
        updated: Option<AttributesUpdated<'_>>,
    ) -> bool {
        let Some(attributes) = self.attributes.get_mut(&index) else {
            return false;
        };
        if attributes.frame == frame {
            return false;
        }
        let old_frame = attributes.frame;
        attributes.frame = frame;
        if let Some(updated) = updated {
            updated(attributes, Some(old_frame));
        }
        true
    }

    /// All computed attributes whose rendered frame intersects `rect`, by index.
    ///
    /// Binary-searches the first item starting at or after the leading edge
    /// of `rect`, then walks outwards in both directions until an item no
    /// longer intersects. Packing only moves forward, so intersecting items
    /// form one contiguous run.
    pub fn attributes_in_rect(&self, rect: Rect) -> Vec<&ItemAttributes> {
        let mut found = Vec::new();
        if self.attributes.is_empty() {
            return found;
        }
        let Some(data_source) = &self.data_source else {
            return found;
        };

        let direction = data_source.scroll_direction();
        let closest = closest_index(direction.main_axis_start(&rect), &self.attributes, direction);

        for index in (0..closest).rev() {
            match self.attributes.get(&index) {
                Some(attributes) if rect.intersects(&attributes.frame) => found.push(attributes),
                _ => break,
            }
        }
        for index in closest..self.attributes.len() {
            match self.attributes.get(&index) {
                Some(attributes) if rect.intersects(&attributes.frame) => found.push(attributes),
                _ => break,
            }
        }

        found.sort_by_key(|attributes| attributes.index);
        found
    }

    pub(super) fn width_at_index(&self, index: usize, data_source: &dyn SectionDataSource) -> f32 {
        let edge_insets = data_source.edge_insets(self.section_index);
        let total_width = self.section_width - edge_insets.horizontal_sum();
        data_source.width(index, total_width, self.section_index)
    }
}

/// Runs `body` with the caller's callback, or a no-op when there is none.
fn with_callback<R>(
    updated: Option<AttributesUpdated<'_>>,
    body: impl FnOnce(AttributesUpdated<'_>) -> R,
) -> R {
    match updated {
        Some(updated) => body(updated),
        None => body(&mut |_: &ItemAttributes, _: Option<Rect>| {}),
    }
}
