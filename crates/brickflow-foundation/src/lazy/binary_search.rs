//! Binary search over a sparse, index-keyed frame ledger.
//!
//! Frames are expected to be monotonically non-decreasing along the flow
//! axis as the index increases, which row packing guarantees.

use std::collections::BTreeMap;

use super::row_packing::Frameable;
use super::section_contract::ScrollDirection;

/// Smallest index whose frame starts at or after `min` along the flow axis.
///
/// Searches `[0, frames.len())`. Reaching an index that has no frame yet means
/// the ledger cannot answer for that range; the search stops and returns the
/// best lower bound found so far.
pub fn closest_index<T: Frameable>(
    min: f32,
    frames: &BTreeMap<usize, T>,
    direction: ScrollDirection,
) -> usize {
    let mut lower_bound = 0;
    let mut upper_bound = frames.len();
    while lower_bound < upper_bound {
        let mid_index = lower_bound + (upper_bound - lower_bound) / 2;
        let Some(item) = frames.get(&mid_index) else {
            break;
        };
        if direction.main_axis_start(&item.frame()) < min {
            lower_bound = mid_index + 1;
        } else {
            upper_bound = mid_index;
        }
    }
    lower_bound
}

/// [`closest_index`] for vertical flow.
pub fn closest_index_for_y<T: Frameable>(min_y: f32, frames: &BTreeMap<usize, T>) -> usize {
    closest_index(min_y, frames, ScrollDirection::Vertical)
}

/// [`closest_index`] for horizontal flow.
pub fn closest_index_for_x<T: Frameable>(min_x: f32, frames: &BTreeMap<usize, T>) -> usize {
    closest_index(min_x, frames, ScrollDirection::Horizontal)
}
