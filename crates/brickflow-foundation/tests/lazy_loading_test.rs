//! Tests for lazy computation against a frame of interest.

use std::rc::Rc;

use brickflow_foundation::*;
use brickflow_testing::{FixedSectionDataSource, RecordingDelegate, UpdateRecorder};

const FIRST_SCREEN: Rect = Rect::new(0.0, 0.0, 320.0, 500.0);

fn lazy_section(source: FixedSectionDataSource, count: usize) -> (LayoutSection, Rc<FixedSectionDataSource>) {
    brickflow_testing::init_test_logging();
    let source = Rc::new(source.with_frame_of_interest(FIRST_SCREEN));
    let mut section = LayoutSection::new(0, count, Point::ZERO, 320.0).with_data_source(source.clone());
    section.invalidate_all(None);
    (section, source)
}

#[test]
fn only_first_screen_is_computed() {
    let (section, _) = lazy_section(FixedSectionDataSource::new(100.0), 100);

    assert_eq!(section.computed_count(), 5);
    assert_eq!(section.frame().height, 10_000.0);
}

#[test]
fn first_screen_materializes_exactly_its_items() {
    let source = Rc::new(FixedSectionDataSource::new(50.0).with_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 480.0)));
    let mut section = LayoutSection::new(0, 20, Point::ZERO, 320.0).with_data_source(source);
    section.invalidate_all(None);

    let keys: Vec<usize> = section.attributes().keys().copied().collect();
    assert_eq!(keys, (0..10).collect::<Vec<_>>());
}

#[test]
fn two_columns_compute_two_per_row() {
    let (section, _) = lazy_section(FixedSectionDataSource::new(100.0).with_width_ratio(0.5), 100);

    assert_eq!(section.computed_count(), 10);
    assert_eq!(section.frame().height, 5_000.0);
}

#[test]
fn estimate_includes_insets() {
    let source = FixedSectionDataSource::new(100.0)
        .with_edge_insets(EdgeInsets::from_components(0.0, 5.0, 0.0, 5.0))
        .with_inset(10.0);
    let (section, _) = lazy_section(source, 100);

    assert_eq!(section.computed_count(), 5);
    assert_eq!(section.frame().height, 11_000.0);
}

#[test]
fn growing_frame_of_interest_continues_computing() {
    let (mut section, source) = lazy_section(FixedSectionDataSource::new(100.0), 100);
    let delegate = Rc::new(RecordingDelegate::new());
    section.set_delegate(Some(delegate.clone()));

    source.set_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 1_000.0));
    let mut recorder = UpdateRecorder::default();
    section.continue_computing(Some(&mut recorder.callback()));

    assert_eq!(section.computed_count(), 10);
    assert_eq!(recorder.indices(), (5..10).collect::<Vec<_>>());
    assert!(recorder.changes().iter().all(|change| change.old_frame.is_none()));
    assert_eq!(delegate.created_indices(), (5..10).collect::<Vec<_>>());
    assert_eq!(section.frame().height, 10_000.0);
}

#[test]
fn height_becomes_exact_once_everything_is_computed() {
    let (mut section, source) = lazy_section(FixedSectionDataSource::new(100.0).with_inset(10.0), 10);
    // Items sit at 110 * i; (540 + 10) / 0.5 while half of them are known.
    assert_eq!(section.frame().height, 1_100.0);

    source.set_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 5_000.0));
    section.continue_computing(None);

    assert!(section.is_fully_computed());
    assert_eq!(section.frame().height, 1_090.0);
}

#[test]
fn downstream_items_are_forced_past_the_frontier() {
    let (section, _) = lazy_section(FixedSectionDataSource::new(100.0).with_downstream_indices([99]), 100);

    assert_eq!(section.computed_count(), 6);
    assert_eq!(section.contiguous_count(), 5);
    let footer = section.attributes_at(99).expect("forced");
    assert_eq!(footer.original_frame, Rect::new(0.0, 500.0, 320.0, 100.0));
    assert_eq!(section.frame().height, 10_000.0);
}

#[test]
fn out_of_range_downstream_indices_are_ignored() {
    let (section, _) = lazy_section(FixedSectionDataSource::new(100.0).with_downstream_indices([250]), 100);

    assert_eq!(section.computed_count(), 5);
    assert!(section.attributes_at(250).is_none());
}

#[test]
fn continuing_recomputes_forced_items_in_sequence() {
    let (mut section, source) =
        lazy_section(FixedSectionDataSource::new(100.0).with_downstream_indices([99]), 100);

    source.set_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 10_000.0));
    section.continue_computing(None);

    assert!(section.is_fully_computed());
    assert_eq!(
        section.attributes_at(99).map(|a| a.original_frame),
        Some(Rect::new(0.0, 9_900.0, 320.0, 100.0))
    );
    assert_eq!(section.frame().height, 10_000.0);
}

#[test]
fn forced_items_move_with_the_frontier() {
    let (mut section, source) =
        lazy_section(FixedSectionDataSource::new(100.0).with_downstream_indices([99]), 100);

    source.set_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 1_000.0));
    let mut recorder = UpdateRecorder::default();
    section.continue_computing(Some(&mut recorder.callback()));

    assert_eq!(section.contiguous_count(), 10);
    assert_eq!(recorder.indices(), vec![5, 6, 7, 8, 9, 99]);
    let footer = recorder.changes().last().expect("footer moved");
    assert_eq!(footer.old_frame, Some(Rect::new(0.0, 500.0, 320.0, 100.0)));
    assert_eq!(footer.frame, Rect::new(0.0, 1_000.0, 320.0, 100.0));
    assert_eq!(section.frame().height, 10_000.0);
}

#[test]
fn eager_sources_ignore_the_frame_of_interest() {
    let (section, _) = lazy_section(FixedSectionDataSource::new(100.0).with_eager_computation(), 100);

    assert!(section.is_fully_computed());
    assert_eq!(section.frame().height, 10_000.0);
}

#[test]
fn existing_items_are_recomputed_even_outside_the_frame() {
    let (mut section, source) = lazy_section(FixedSectionDataSource::new(100.0), 100);
    source.set_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 1_000.0));
    section.continue_computing(None);

    // Shrinking the frame never drops computed items.
    source.set_frame_of_interest(Rect::new(0.0, 0.0, 320.0, 100.0));
    section.invalidate_all(None);

    assert_eq!(section.computed_count(), 10);
}
