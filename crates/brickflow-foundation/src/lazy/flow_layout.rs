//! Hosting adapter around a single root [`LayoutSection`].
//!
//! [`LazyFlowLayout`] owns the frame of interest, the viewport and the list
//! of post-layout behaviors. Every query grows the frame of interest, resumes
//! lazy computation, re-applies behaviors and then answers from the section.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use brickflow_ui_graphics::{EdgeInsets, Point, Rect, Size};

use super::behaviors::{apply_behaviors, LayoutBehavior};
use super::frame_of_interest::FrameOfInterest;
use super::item_attributes::ItemAttributes;
use super::layout_section::LayoutSection;
use super::section_contract::{
    DownstreamIndices, ScrollDirection, SectionDataSource, SectionDelegate, ZIndexBehavior,
};

/// Layout-wide policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowLayoutConfig {
    pub scroll_direction: ScrollDirection,

    /// Stretch every item of a row to the tallest one.
    pub align_row_heights: bool,

    pub z_index_behavior: ZIndexBehavior,

    /// Ratio that represents a full row.
    pub width_ratio: f32,

    /// Only materialise items inside the frame of interest.
    pub only_calculate_frame_of_interest: bool,
}

impl Default for FlowLayoutConfig {
    fn default() -> Self {
        Self {
            scroll_direction: ScrollDirection::Vertical,
            align_row_heights: false,
            z_index_behavior: ZIndexBehavior::BottomUp,
            width_ratio: 1.0,
            only_calculate_frame_of_interest: true,
        }
    }
}

impl FlowLayoutConfig {
    /// Reads the policy a data source answers with.
    pub fn from_data_source(data_source: &dyn SectionDataSource) -> Self {
        Self {
            scroll_direction: data_source.scroll_direction(),
            align_row_heights: data_source.align_row_heights(),
            z_index_behavior: data_source.z_index_behavior(),
            width_ratio: data_source.width_ratio(),
            only_calculate_frame_of_interest: data_source.only_calculate_frame_of_interest(),
        }
    }
}

/// Decorates the caller's data source with host-owned state: the frame of
/// interest, the behaviors' downstream indices and the layout config.
struct HostedDataSource {
    inner: Rc<dyn SectionDataSource>,
    config: FlowLayoutConfig,
    frame_of_interest: Cell<Rect>,
    behavior_indices: RefCell<DownstreamIndices>,
}

impl SectionDataSource for HostedDataSource {
    fn frame_of_interest(&self) -> Rect {
        self.frame_of_interest.get()
    }

    fn edge_insets(&self, section: usize) -> EdgeInsets {
        self.inner.edge_insets(section)
    }

    fn inset(&self, section: usize) -> f32 {
        self.inner.inset(section)
    }

    fn width(&self, index: usize, total_width: f32, section: usize) -> f32 {
        self.inner.width(index, total_width, section)
    }

    fn size(&self, attributes: &ItemAttributes, width: f32, section: usize) -> Size {
        self.inner.size(attributes, width, section)
    }

    fn identifier(&self, index: usize, section: usize) -> String {
        self.inner.identifier(index, section)
    }

    fn align_row_heights(&self) -> bool {
        self.config.align_row_heights
    }

    fn z_index_behavior(&self) -> ZIndexBehavior {
        self.config.z_index_behavior
    }

    fn scroll_direction(&self) -> ScrollDirection {
        self.config.scroll_direction
    }

    fn width_ratio(&self) -> f32 {
        self.config.width_ratio
    }

    fn only_calculate_frame_of_interest(&self) -> bool {
        self.config.only_calculate_frame_of_interest
    }

    fn z_index(&self, index: usize, section: usize) -> i32 {
        self.inner.z_index(index, section)
    }

    fn is_estimate(&self, attributes: &ItemAttributes, section: usize) -> bool {
        self.inner.is_estimate(attributes, section)
    }

    fn downstream_indices(&self, section: usize) -> DownstreamIndices {
        let mut indices = self.inner.downstream_indices(section);
        for &index in self.behavior_indices.borrow().iter() {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        indices
    }

    fn prepare_for_size_calculation(
        &self,
        attributes: &ItemAttributes,
        width: f32,
        origin: Point,
        invalidate: bool,
        section: usize,
    ) {
        self.inner
            .prepare_for_size_calculation(attributes, width, origin, invalidate, section);
    }
}

/// A lazily computed flow layout hosting one root section.
pub struct LazyFlowLayout {
    section: LayoutSection,
    data_source: Rc<HostedDataSource>,
    behaviors: Vec<LayoutBehavior>,
    viewport: Rect,
    frame_of_interest: FrameOfInterest,
    /// Behaviors changed since the last pass.
    behaviors_dirty: bool,
}

impl LazyFlowLayout {
    /// Hosts `item_count` items of `data_source` in a section `section_width` wide.
    ///
    /// Nothing is computed until the viewport is set or a rect is queried.
    pub fn new(data_source: Rc<dyn SectionDataSource>, section_width: f32, item_count: usize) -> Self {
        let config = FlowLayoutConfig::from_data_source(data_source.as_ref());
        Self::with_config(data_source, section_width, item_count, config)
    }

    pub fn with_config(
        data_source: Rc<dyn SectionDataSource>,
        section_width: f32,
        item_count: usize,
        config: FlowLayoutConfig,
    ) -> Self {
        let hosted = Rc::new(HostedDataSource {
            inner: data_source,
            config,
            frame_of_interest: Cell::new(Rect::ZERO),
            behavior_indices: RefCell::new(DownstreamIndices::new()),
        });
        let section = LayoutSection::new(0, item_count, Point::ZERO, section_width)
            .with_data_source(hosted.clone());

        Self {
            section,
            data_source: hosted,
            behaviors: Vec::new(),
            viewport: Rect::ZERO,
            frame_of_interest: FrameOfInterest::new(),
            behaviors_dirty: false,
        }
    }

    pub fn set_delegate(&mut self, delegate: Option<Rc<dyn SectionDelegate>>) {
        self.section.set_delegate(delegate);
    }

    pub fn config(&self) -> FlowLayoutConfig {
        self.data_source.config
    }

    /// Appends a behavior. Behaviors run in insertion order after every pass.
    pub fn add_behavior(&mut self, behavior: impl Into<LayoutBehavior>) {
        let behavior = behavior.into();
        {
            let mut indices = self.data_source.behavior_indices.borrow_mut();
            for index in behavior.downstream_indices() {
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }
        self.behaviors.push(behavior);
        self.behaviors_dirty = true;
    }

    pub fn behaviors(&self) -> &[LayoutBehavior] {
        &self.behaviors
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Moves the visible bounds. Behaviors are re-applied against the new
    /// viewport, and the frame of interest grows to cover it.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.refresh(viewport);
    }

    /// Every computed attribute whose rendered frame intersects `rect`.
    pub fn attributes_in_rect(&mut self, rect: Rect) -> Vec<&ItemAttributes> {
        self.refresh(rect);

        let mut indices: Vec<usize> = self
            .section
            .attributes_in_rect(rect)
            .into_iter()
            .map(|attributes| attributes.index)
            .collect();
        for behavior in &self.behaviors {
            for &index in behavior.indices() {
                let overridden = self
                    .section
                    .attributes_at(index)
                    .is_some_and(|attributes| rect.intersects(&attributes.frame));
                if overridden && !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }
        indices.sort_unstable();

        indices
            .into_iter()
            .filter_map(|index| self.section.attributes_at(index))
            .collect()
    }

    /// Size of the root section; extrapolated while computation is partial.
    pub fn content_size(&self) -> Size {
        self.section.frame().size()
    }

    pub fn frame_of_interest(&self) -> Rect {
        self.frame_of_interest.rect()
    }

    pub fn section(&self) -> &LayoutSection {
        &self.section
    }

    pub fn section_mut(&mut self) -> &mut LayoutSection {
        &mut self.section
    }

    pub fn item_count(&self) -> usize {
        self.section.number_of_items()
    }

    pub fn set_item_count(&mut self, count: usize) {
        self.section.set_item_count(count, None);
        self.apply_behaviors();
    }

    pub fn set_section_width(&mut self, section_width: f32) {
        self.section.set_section_width(section_width, None);
        self.apply_behaviors();
    }

    /// Reports the measured height of an item.
    pub fn set_height(&mut self, height: f32, index: usize) {
        self.section.set_height(height, index, None);
        self.apply_behaviors();
    }

    pub fn invalidate_all(&mut self) {
        self.section.invalidate_all(None);
        self.apply_behaviors();
    }

    fn refresh(&mut self, rect: Rect) {
        let behaviors_changed = std::mem::take(&mut self.behaviors_dirty);
        let grew = self.frame_of_interest.expand(rect);
        if grew {
            self.data_source.frame_of_interest.set(self.frame_of_interest.rect());
            log::debug!("frame of interest grew to {:?}", self.frame_of_interest.rect());
        }
        if grew || behaviors_changed {
            self.section.continue_computing(None);
        }
        self.apply_behaviors();
    }

    fn apply_behaviors(&mut self) {
        if self.behaviors.is_empty() {
            return;
        }
        apply_behaviors(&self.behaviors, &mut self.section, self.viewport, None);
    }
}
