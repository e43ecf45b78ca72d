//! Frame of interest tracking for lazy computation.
//!
//! Sections only materialise items whose origin lies inside the frame of
//! interest. The frame only ever grows: it is the union of every rect the
//! host has asked about, so items computed once stay computed.

use brickflow_ui_graphics::Rect;

/// Expanding union of every queried rect.
///
/// Starts empty; the first query replaces it outright.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOfInterest {
    /// Union of every rect seen so far.
    value: Option<Rect>,
}

impl FrameOfInterest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known rect, e.g. the initial viewport.
    pub fn with_rect(rect: Rect) -> Self {
        Self { value: Some(rect) }
    }

    /// Returns the current frame, or [`Rect::ZERO`] before the first query.
    pub fn rect(&self) -> Rect {
        self.value.unwrap_or(Rect::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Grows the frame to cover `rect`.
    /// Returns true when the frame changed and lazy computation should resume.
    pub fn expand(&mut self, rect: Rect) -> bool {
        let expanded = match self.value {
            None => rect,
            Some(current) => current.union(&rect),
        };
        if self.value == Some(expanded) {
            return false;
        }
        self.value = Some(expanded);
        true
    }

    /// Forgets every query; the next one starts a new frame.
    pub fn reset(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_query_replaces_empty_frame() {
        let mut frame = FrameOfInterest::new();
        assert!(frame.is_empty());
        assert!(frame.expand(Rect::new(0.0, 0.0, 320.0, 500.0)));
        assert_eq!(frame.rect(), Rect::new(0.0, 0.0, 320.0, 500.0));
    }

    #[test]
    fn frame_grows_monotonically() {
        let mut frame = FrameOfInterest::with_rect(Rect::new(0.0, 0.0, 320.0, 500.0));

        assert!(frame.expand(Rect::new(0.0, 500.0, 320.0, 500.0)));
        assert_eq!(frame.rect(), Rect::new(0.0, 0.0, 320.0, 1000.0));

        assert!(frame.expand(Rect::new(0.0, 20_000.0, 320.0, 500.0)));
        assert_eq!(frame.rect(), Rect::new(0.0, 0.0, 320.0, 20_500.0));
    }

    #[test]
    fn contained_query_does_not_change_frame() {
        let mut frame = FrameOfInterest::with_rect(Rect::new(0.0, 0.0, 320.0, 1000.0));
        assert!(!frame.expand(Rect::new(0.0, 200.0, 320.0, 100.0)));
        assert_eq!(frame.rect(), Rect::new(0.0, 0.0, 320.0, 1000.0));
    }

    #[test]
    fn reset_empties_the_frame() {
        let mut frame = FrameOfInterest::with_rect(Rect::new(0.0, 0.0, 320.0, 1000.0));
        frame.reset();
        assert_eq!(frame.rect(), Rect::ZERO);
    }
}
