//! Post-layout behaviors.
//!
//! Behaviors run after every engine pass and only ever rewrite rendered
//! frames, so the next pass still packs from the untouched original frames.
//! Each behavior derives its overrides from the original origin and the
//! current rendered size; behaviors applied later win.

use brickflow_ui_graphics::{Point, Rect, Size};
use smallvec::SmallVec;

use super::item_attributes::ItemAttributes;
use super::layout_section::LayoutSection;
use super::section_contract::{AttributesUpdated, DownstreamIndices};

/// Keeps footer items pinned to the bottom of the viewport while their laid
/// out position is below it.
#[derive(Debug, Clone, PartialEq)]
pub struct StickyFooterBehavior {
    pub indices: Vec<usize>,
}

impl StickyFooterBehavior {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    fn frame_for(&self, original: Rect, rendered: Rect, viewport: Rect) -> Rect {
        let y = original.y.min(viewport.max_y() - rendered.height);
        Rect::new(original.x, y, rendered.width, rendered.height)
    }
}

/// Shifts (and optionally resizes) items relative to where they were packed.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetBehavior {
    pub indices: Vec<usize>,
    pub origin_offset: Point,
    pub size_offset: Option<Size>,
}

impl OffsetBehavior {
    pub fn new(indices: impl IntoIterator<Item = usize>, origin_offset: Point) -> Self {
        Self {
            indices: indices.into_iter().collect(),
            origin_offset,
            size_offset: None,
        }
    }

    pub fn with_size_offset(mut self, size_offset: Size) -> Self {
        self.size_offset = Some(size_offset);
        self
    }

    fn frame_for(&self, original: Rect, rendered: Rect) -> Rect {
        let size_offset = self.size_offset.unwrap_or(Size::ZERO);
        Rect::new(
            original.x + self.origin_offset.x,
            original.y + self.origin_offset.y,
            rendered.width + size_offset.width,
            rendered.height + size_offset.height,
        )
    }
}

/// A post-layout transform over rendered frames.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBehavior {
    StickyFooter(StickyFooterBehavior),
    Offset(OffsetBehavior),
}

impl LayoutBehavior {
    /// Indices this behavior needs computed ahead of the lazy frontier.
    pub fn downstream_indices(&self) -> DownstreamIndices {
        match self {
            LayoutBehavior::StickyFooter(footer) => footer.indices.iter().copied().collect(),
            LayoutBehavior::Offset(_) => DownstreamIndices::new(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        match self {
            LayoutBehavior::StickyFooter(footer) => &footer.indices,
            LayoutBehavior::Offset(offset) => &offset.indices,
        }
    }

    /// Rendered frames this behavior wants for the computed, visible items
    /// it targets, given the current viewport.
    pub fn frame_overrides(&self, section: &LayoutSection, viewport: Rect) -> SmallVec<[(usize, Rect); 4]> {
        self.indices()
            .iter()
            .filter_map(|&index| section.attributes_at(index))
            .filter(|attributes| !attributes.hidden)
            .map(|attributes| {
                let frame = match self {
                    LayoutBehavior::StickyFooter(footer) => {
                        footer.frame_for(attributes.original_frame, attributes.frame, viewport)
                    }
                    LayoutBehavior::Offset(offset) => {
                        offset.frame_for(attributes.original_frame, attributes.frame)
                    }
                };
                (attributes.index, frame)
            })
            .collect()
    }
}

impl From<StickyFooterBehavior> for LayoutBehavior {
    fn from(behavior: StickyFooterBehavior) -> Self {
        LayoutBehavior::StickyFooter(behavior)
    }
}

impl From<OffsetBehavior> for LayoutBehavior {
    fn from(behavior: OffsetBehavior) -> Self {
        LayoutBehavior::Offset(behavior)
    }
}

/// Applies `behaviors` in order and returns the indices they touched.
pub fn apply_behaviors(
    behaviors: &[LayoutBehavior],
    section: &mut LayoutSection,
    viewport: Rect,
    updated: Option<AttributesUpdated<'_>>,
) -> Vec<usize> {
    match updated {
        Some(updated) => apply_in_order(behaviors, section, viewport, updated),
        None => apply_in_order(behaviors, section, viewport, &mut |_: &ItemAttributes, _| {}),
    }
}

fn apply_in_order(
    behaviors: &[LayoutBehavior],
    section: &mut LayoutSection,
    viewport: Rect,
    updated: AttributesUpdated<'_>,
) -> Vec<usize> {
    let mut touched = Vec::new();
    for behavior in behaviors {
        for (index, frame) in behavior.frame_overrides(section, viewport) {
            section.apply_rendered_frame(index, frame, Some(&mut *updated));
            touched.push(index);
        }
    }
    touched.sort_unstable();
    touched.dedup();
    touched
}
