//! Foundation elements for brickflow: the lazy section layout engine and
//! the post-layout behaviors that decorate its output.

pub mod lazy;

pub use brickflow_ui_graphics::{EdgeInsets, Point, Rect, Size};
pub use lazy::*;

pub mod prelude {
    pub use crate::lazy::{
        FlowLayoutConfig, ItemAttributes, LayoutBehavior, LayoutSection, LazyFlowLayout,
        ScrollDirection, SectionDataSource, SectionDelegate, ZIndexBehavior,
    };
    pub use brickflow_ui_graphics::prelude::*;
}
