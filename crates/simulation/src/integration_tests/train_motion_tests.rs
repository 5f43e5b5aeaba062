//! Drive modes, cadence and map selection through the heartbeat.

use crate::geometry::offset_m;
use crate::test_harness::fixtures::*;
use crate::test_harness::TestSession;
use crate::track_network::SegmentId;
use crate::train_motion::DriveMode;

#[test]
fn manual_mode_moves_only_on_request() {
    let mut session = TestSession::new().started();
    session.place_train(0, 0);

    session.tick(5);
    session.assert_train_on(0, 0);

    session.step_train();
    session.tick(1);
    session.assert_train_on(0, 1);

    session.step_train();
    session.step_train();
    session.tick(1);
    session.assert_train_on(0, 3);
}

#[test]
fn cruise_steps_every_other_tick_and_crosses_segments() {
    let mut session = TestSession::new().started();
    session.place_train(0, 0);
    session.set_drive_mode(DriveMode::Cruise);

    // Ticks 2..=11: five even ticks, five steps; the fifth crosses into segment 1.
    session.tick(10);
    session.assert_train_on(1, 0);
    session.assert_notified("Drive mode: Cruise");
    session.assert_invariants();
}

#[test]
fn paused_train_stays_put() {
    let mut session = TestSession::new().started();
    session.place_train(0, 0);
    session.set_drive_mode(DriveMode::Cruise);
    session.pause(true);
    let tick = session.clock().tick;

    session.tick(10);
    session.assert_train_on(0, 0);
    assert_eq!(session.clock().tick, tick);

    session.pause(false);
    session.tick(4);
    assert!(session.train().path_index > 0);
}

#[test]
fn cruise_turns_around_at_the_end_of_the_line() {
    let mut session = TestSession::new().started();
    session.place_train(2, SEGMENT_POINTS - 1);
    session.set_drive_mode(DriveMode::Cruise);

    session.tick(4);
    let train = session.train();
    assert_eq!(train.segment, SegmentId(2));
    assert!(train.reversed);
    assert!(train.path_index < SEGMENT_POINTS - 1);
}

#[test]
fn segment_click_moves_train() {
    let mut session = TestSession::new().started();
    session.select_segment(SegmentId(2));
    session.tick(1);
    session.assert_train_on(2, 0);

    session.select_segment(SegmentId(40));
    session.tick(1);
    session.assert_train_on(2, 0);
    session.assert_notified("Unknown track segment 40");
}

#[test]
fn point_click_enters_nearest_track_or_reports_nothing() {
    let mut session = TestSession::new().started();
    session.select_point(offset_m(ORIGIN, 20.0, 760.0));
    session.tick(1);
    session.assert_train_on(1, 2);

    session.select_point(offset_m(ORIGIN, 3_000.0, 0.0));
    session.tick(1);
    session.assert_train_on(1, 2);
    session.assert_notified("No nearby track found");
}

#[test]
fn idle_goal_directed_train_explores_everything() {
    let mut session = TestSession::with_network(chain_network(2)).started();
    session.set_drive_mode(DriveMode::GoalDirected);

    let used = session.tick_until(200, |s| s.notifications().mentions("Every track explored"));
    assert!(used.is_some(), "exploration never completed");
    session.assert_invariants();
}

#[test]
fn goal_directed_train_fetches_and_delivers() {
    let mut session = TestSession::new().started();
    session.place_train(0, 0);
    session.admit_waiting(1, 2);
    session.set_drive_mode(DriveMode::GoalDirected);

    let used = session.tick_until(400, |s| s.stats().delivered == 1);
    assert!(used.is_some(), "passenger was never delivered");
    assert_eq!(session.stats().money, 150);
    session.assert_invariants();
}
