//! The train motion state machine.
//!
//! A step either advances one point along the current segment or, at a
//! segment boundary, resolves what happens next:
//!
//! 1. a connected segment exists: transfer onto it (goal-directed
//!    exploration may prefer a better unvisited segment instead);
//! 2. no connection: reverse in place;
//! 3. cruise only: reversing twice on the same segment jumps to the closest
//!    other segment instead of shuttling forever.
//!
//! Nothing here fails: missing connections, degenerate geometry and lost
//! routes all resolve through one of the fallbacks above.

use bevy::log::{debug, info, warn};

use crate::errors::{ConfigurationError, TrackError};
use crate::geometry::{closest_index_on_path, Coordinate};
use crate::path_finder::find_path;
use crate::track_network::{
    closest_unvisited_segment, closest_with_distance, ConnectionInfo, SegmentId, TrackNetwork,
};

use super::routing::{best_explore_target, pick_goal, MotionContext};
use super::types::*;

/// Put the train on the network: next to the home station when there is
/// one, otherwise at the start of the first segment.
pub fn seat_train(train: &mut TrainState, network: &TrackNetwork) -> Result<(), ConfigurationError> {
    let first = network
        .segments
        .first()
        .ok_or(ConfigurationError::EmptyNetwork)?;

    let home_spot = network.personal_station().and_then(|home| {
        let id = network.segment_for_station(home.id)?;
        let segment = network.segment(id)?;
        Some((id, closest_index_on_path(home.position, &segment.path)?))
    });
    let (segment_id, index) = home_spot.unwrap_or((first.id, 0));

    let segment = network.segment(segment_id).unwrap_or(first);
    let index = index.min(segment.last_index());
    train.segment = segment.id;
    train.path_index = index;
    train.reversed = false;
    if let Some(point) = segment.path.get(index) {
        train.position = *point;
    }
    Ok(())
}

impl MotionController {
    /// A controller for `network`. The network must have at least one segment.
    pub fn new(network: &TrackNetwork) -> Result<Self, ConfigurationError> {
        if network.is_empty() {
            return Err(ConfigurationError::EmptyNetwork);
        }
        Ok(Self::default())
    }

    /// Switch modes. Returns whether anything changed.
    pub fn set_mode(&mut self, mode: DriveMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.clear_route();
        self.bounced_on = None;
        self.hold_ticks = 0;
        true
    }

    pub fn clear_route(&mut self) {
        self.active_route = None;
        self.route_index = 0;
    }

    /// Forget everything but the mode (network regenerated).
    pub fn reset(&mut self) {
        *self = Self {
            mode: self.mode,
            ..Self::default()
        };
    }

    fn mark_visited(&mut self, id: SegmentId) {
        self.visited.insert(id);
        if !self.visit_order.contains(&id) {
            self.visit_order.push(id);
        }
    }

    // -------------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------------

    /// Place the train at `index` of segment `id`, running forward.
    pub fn place(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        id: SegmentId,
        index: usize,
    ) -> Result<(), TrackError> {
        let segment = network.segment(id).ok_or(TrackError::NotFound)?;
        let index = index.min(segment.last_index());
        train.segment = id;
        train.path_index = index;
        train.reversed = false;
        if let Some(point) = segment.path.get(index) {
            train.position = *point;
        }
        self.clear_route();
        self.bounced_on = None;
        self.came_from = None;
        self.hold_ticks = 0;
        Ok(())
    }

    /// Enter the segment nearest `point` at its nearest index, if one lies
    /// within `radius_m`.
    pub fn select_point(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        point: Coordinate,
        radius_m: f64,
    ) -> Result<SegmentId, TrackError> {
        let (id, gap) = closest_with_distance(point, &network.segments).ok_or(TrackError::NotFound)?;
        if gap > radius_m {
            return Err(TrackError::NotFound);
        }
        let segment = network.segment(id).ok_or(TrackError::NotFound)?;
        let index = closest_index_on_path(point, &segment.path).unwrap_or(0);
        self.place(train, network, id, index)?;
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Advance the train by one step according to the current mode.
    pub fn step(&mut self, train: &mut TrainState, ctx: &MotionContext<'_>) -> StepOutcome {
        let network = ctx.network;
        if network.segment(train.segment).is_none() {
            // The network changed under the train; re-anchor on the nearest track.
            return match network.closest_segment(train.position) {
                Ok(id) => self.jump_to(train, network, id),
                Err(_) => StepOutcome::Holding,
            };
        }
        match self.mode {
            DriveMode::Manual => self.step_following(train, network, false),
            DriveMode::Cruise => self.step_following(train, network, true),
            DriveMode::GoalDirected => self.step_goal_directed(train, ctx),
        }
    }

    /// Move one point in the current direction. `false` at a boundary.
    fn advance(&mut self, train: &mut TrainState, network: &TrackNetwork) -> bool {
        let Some(segment) = network.segment(train.segment) else {
            return false;
        };
        train.path_index = train.path_index.min(segment.last_index());
        let next = if train.reversed {
            train.path_index.checked_sub(1)
        } else {
            Some(train.path_index + 1)
        };
        match next.filter(|i| *i < segment.path.len()) {
            Some(i) => {
                train.path_index = i;
                if let Some(point) = segment.path.get(i) {
                    train.position = *point;
                }
                self.hold_ticks = 0;
                true
            }
            None => false,
        }
    }

    /// Best connection, avoiding an immediate return to the segment the
    /// train just left when there is any alternative.
    fn pick_connection(&self, candidates: &[ConnectionInfo]) -> Option<ConnectionInfo> {
        candidates
            .iter()
            .find(|c| Some(c.target) != self.came_from)
            .or_else(|| candidates.first())
            .copied()
    }

    fn enter(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        info: ConnectionInfo,
    ) -> StepOutcome {
        let Some(segment) = network.segment(info.target) else {
            return StepOutcome::Holding;
        };
        let from = train.segment;
        let index = info.start_index.min(segment.last_index());
        train.segment = info.target;
        train.path_index = index;
        train.reversed = info.reversed;
        if let Some(point) = segment.path.get(index) {
            train.position = *point;
        }
        self.came_from = Some(from);
        self.bounced_on = None;
        StepOutcome::Transferred {
            from,
            to: info.target,
        }
    }

    /// Discontinuous move onto `id`, entering at the point nearest the train
    /// and heading for the far end.
    fn jump_to(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        id: SegmentId,
    ) -> StepOutcome {
        let Some(segment) = network.segment(id) else {
            return StepOutcome::Holding;
        };
        let index = closest_index_on_path(train.position, &segment.path).unwrap_or(0);
        self.jump_to_index(train, network, id, index)
    }

    fn jump_to_index(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        id: SegmentId,
        index: usize,
    ) -> StepOutcome {
        let Some(segment) = network.segment(id) else {
            return StepOutcome::Holding;
        };
        let index = index.min(segment.last_index());
        train.segment = id;
        train.path_index = index;
        train.reversed = index * 2 > segment.last_index();
        if let Some(point) = segment.path.get(index) {
            train.position = *point;
        }
        self.came_from = None;
        self.bounced_on = None;
        StepOutcome::Jumped { to: id }
    }

    fn reverse_in_place(&mut self, train: &mut TrainState, network: &TrackNetwork) -> StepOutcome {
        let Some(segment) = network.segment(train.segment) else {
            return StepOutcome::Holding;
        };
        train.reversed = !train.reversed;
        train.path_index = if train.reversed {
            segment.last_index()
        } else {
            0
        };
        if let Some(point) = segment.path.get(train.path_index) {
            train.position = *point;
        }
        self.bounced_on = Some(train.segment);
        StepOutcome::Reversed
    }

    /// Manual and cruise: follow connections, reverse at dead ends.
    fn step_following(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        cruise: bool,
    ) -> StepOutcome {
        if self.advance(train, network) {
            return StepOutcome::Advanced;
        }
        let current = train.segment;
        self.mark_visited(current);
        let candidates = network.connecting_candidates(current, !train.reversed);
        if let Some(info) = self.pick_connection(&candidates) {
            return self.enter(train, network, info);
        }
        if cruise && self.bounced_on == Some(current) {
            if let Some((id, _)) = network.closest_segment_excluding(train.position, current) {
                debug!(
                    "Segment {} is a dead end both ways; jumping to segment {}",
                    current.0, id.0
                );
                return self.jump_to(train, network, id);
            }
        }
        self.reverse_in_place(train, network)
    }

    // -------------------------------------------------------------------------
    // Goal-directed mode
    // -------------------------------------------------------------------------

    fn step_goal_directed(
        &mut self,
        train: &mut TrainState,
        ctx: &MotionContext<'_>,
    ) -> StepOutcome {
        let network = ctx.network;
        if self.active_route.is_some() {
            return self.follow_route(train, network);
        }

        let Some(goal) = pick_goal(train, network, ctx.waiting) else {
            return self.explore(train, ctx);
        };
        let goal_position = goal.position;
        let Some(goal_segment) = network.segment_for_station(goal.id) else {
            return self.explore(train, ctx);
        };
        if goal_segment == train.segment {
            return self.approach(train, network, goal_position);
        }

        if let Some(route) = find_path(network, train.segment, goal_segment) {
            if route.len() >= 2 && self.orient_toward(train, network, route[1]) {
                self.active_route = Some(route);
                self.route_index = 0;
                return self.follow_route(train, network);
            }
        }

        warn!(
            "No route from segment {} to segment {}; snapping to the goal",
            train.segment.0, goal_segment.0
        );
        let index = network
            .segment(goal_segment)
            .and_then(|s| closest_index_on_path(goal_position, &s.path))
            .unwrap_or(0);
        self.jump_to_index(train, network, goal_segment, index)
    }

    /// Point the train at whichever end of its segment connects to `next`.
    fn orient_toward(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        next: SegmentId,
    ) -> bool {
        let joins = |at_end: bool| {
            network
                .connecting_candidates(train.segment, at_end)
                .iter()
                .any(|c| c.target == next)
        };
        if joins(true) {
            train.reversed = false;
            true
        } else if joins(false) {
            train.reversed = true;
            true
        } else {
            false
        }
    }

    fn follow_route(&mut self, train: &mut TrainState, network: &TrackNetwork) -> StepOutcome {
        if self.advance(train, network) {
            return StepOutcome::Advanced;
        }
        let current = train.segment;
        self.mark_visited(current);

        let next = self
            .active_route
            .as_ref()
            .and_then(|route| route.get(self.route_index + 1).copied());
        let Some(next) = next else {
            self.clear_route();
            return StepOutcome::Holding;
        };

        let info = network
            .connecting_candidates(current, !train.reversed)
            .into_iter()
            .find(|c| c.target == next);
        let Some(info) = info else {
            debug!(
                "Route broken between segments {} and {}; re-planning",
                current.0, next.0
            );
            self.clear_route();
            return StepOutcome::Holding;
        };

        let outcome = self.enter(train, network, info);
        self.route_index += 1;
        let after = self
            .active_route
            .as_ref()
            .and_then(|route| route.get(self.route_index + 1).copied());
        match after {
            None => self.clear_route(),
            Some(after) => {
                if !self.orient_toward(train, network, after) {
                    self.clear_route();
                }
            }
        }
        outcome
    }

    /// Step toward the path index nearest `target` and hold there.
    fn approach(
        &mut self,
        train: &mut TrainState,
        network: &TrackNetwork,
        target: Coordinate,
    ) -> StepOutcome {
        let target_index = network
            .segment(train.segment)
            .and_then(|s| closest_index_on_path(target, &s.path));
        let Some(target_index) = target_index else {
            return StepOutcome::Holding;
        };
        if train.path_index == target_index {
            self.hold_ticks = self.hold_ticks.saturating_add(1);
            return StepOutcome::Holding;
        }
        train.reversed = target_index < train.path_index;
        if self.advance(train, network) {
            StepOutcome::Advanced
        } else {
            StepOutcome::Holding
        }
    }

    /// No goal: wander, preferring unvisited track.
    fn explore(&mut self, train: &mut TrainState, ctx: &MotionContext<'_>) -> StepOutcome {
        let network = ctx.network;
        if self.advance(train, network) {
            return StepOutcome::Advanced;
        }
        let current = train.segment;
        self.mark_visited(current);

        let complete = network
            .segments
            .iter()
            .all(|s| self.visited.contains(&s.id));
        if complete {
            info!("Explored all {} segments; starting over", network.segments.len());
            self.visited.clear();
        }

        let candidates = network.connecting_candidates(current, !train.reversed);
        let outcome = match self.pick_connection(&candidates) {
            Some(info) if !self.visited.contains(&info.target) => self.enter(train, network, info),
            Some(info) => {
                match best_explore_target(train.position, current, ctx, &self.visited) {
                    Some((id, score)) if score > ctx.weights.score_floor && id != info.target => {
                        self.jump_to(train, network, id)
                    }
                    _ => self.enter(train, network, info),
                }
            }
            None => {
                let others = network.segments.iter().filter(|s| s.id != current);
                match closest_unvisited_segment(train.position, others, &self.visited) {
                    Some(id) => self.jump_to(train, network, id),
                    None => self.reverse_in_place(train, network),
                }
            }
        };

        if complete {
            StepOutcome::ExplorationComplete
        } else {
            outcome
        }
    }
}
