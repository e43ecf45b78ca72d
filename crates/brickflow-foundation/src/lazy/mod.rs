//! Lazy section layout for brickflow.
//!
//! A section lays out an ordered, possibly unbounded, run of items in rows
//! that wrap at the section width, while only ever materialising the items
//! that fall inside the frame of interest (plus any downstream items a
//! behavior needs ahead of time).
//!
//! # Architecture
//!
//! - [`row_packing`] / [`binary_search`] - pure helpers over index-keyed frames
//! - [`SectionDataSource`] / [`SectionDelegate`] - the upstream contracts
//! - [`LayoutSection`] - the incremental engine and its sparse attribute ledger
//! - [`LayoutBehavior`] - post-layout transforms that only touch rendered frames
//! - [`LazyFlowLayout`] - hosting adapter: frame of interest, behaviors, queries
//!
//! # Example
//!
//! ```rust,ignore
//! let mut layout = LazyFlowLayout::new(data_source, 320.0, 1_000);
//! layout.set_viewport(Rect::new(0.0, 0.0, 320.0, 480.0));
//! for attributes in layout.attributes_in_rect(Rect::new(0.0, 0.0, 320.0, 480.0)) {
//!     println!("{} -> {:?}", attributes.index, attributes.frame);
//! }
//! ```

mod behaviors;
pub mod binary_search;
mod flow_layout;
mod frame_of_interest;
mod item_attributes;
mod layout_section;
pub mod row_packing;
mod section_contract;
mod section_pass;

pub use behaviors::*;
pub use binary_search::{closest_index, closest_index_for_x, closest_index_for_y};
pub use flow_layout::*;
pub use frame_of_interest::*;
pub use item_attributes::*;
pub use layout_section::*;
pub use row_packing::{find_row_trailing_edge, width_for_ratio, Frameable};
pub use section_contract::*;
