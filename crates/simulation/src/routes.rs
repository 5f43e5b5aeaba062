//! Named routes the player saved from the train's journey.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::notifications::{NotificationEvent, NotificationPriority};
use crate::sim_clock::SimClock;
use crate::simulation_sets::TickSet;
use crate::track_network::SegmentId;
use crate::train_motion::MotionController;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SavedRoute {
    pub name: String,
    pub segments: Vec<SegmentId>,
    pub saved_at_ms: u64,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct RouteBook {
    routes: Vec<SavedRoute>,
}

impl RouteBook {
    pub fn from_routes(routes: Vec<SavedRoute>) -> Self {
        let mut book = Self::default();
        for route in routes {
            book.store(route);
        }
        book
    }

    pub fn routes(&self) -> &[SavedRoute] {
        &self.routes
    }

    pub fn get(&self, name: &str) -> Option<&SavedRoute> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Insert `route`, replacing any route with the same name.
    pub fn store(&mut self, route: SavedRoute) {
        match self.routes.iter_mut().find(|r| r.name == route.name) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<SavedRoute> {
        let index = self.routes.iter().position(|r| r.name == name)?;
        Some(self.routes.remove(index))
    }
}

/// Save the current journey under `name` (blank names get a numbered default).
#[derive(Event, Debug, Clone)]
pub struct SaveRouteEvent {
    pub name: String,
}

/// The planned route if there is one, otherwise the segments visited so far.
pub fn route_to_save(controller: &MotionController) -> Vec<SegmentId> {
    match &controller.active_route {
        Some(route) if !route.is_empty() => route.clone(),
        _ => controller.visit_order.clone(),
    }
}

pub fn handle_save_route(
    mut requests: EventReader<SaveRouteEvent>,
    controller: Res<MotionController>,
    clock: Res<SimClock>,
    mut book: ResMut<RouteBook>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for SaveRouteEvent { name } in requests.read() {
        let segments = route_to_save(&controller);
        if segments.is_empty() {
            notifications.send(NotificationEvent::new(
                "Nothing to save yet: the train has not left its first segment",
                NotificationPriority::Attention,
            ));
            continue;
        }
        let name = match name.trim() {
            "" => format!("Route {}", book.routes().len() + 1),
            trimmed => trimmed.to_string(),
        };
        info!("Saved route '{}' ({} segments)", name, segments.len());
        notifications.send(NotificationEvent::new(
            format!("Route '{}' saved", name),
            NotificationPriority::Positive,
        ));
        book.store(SavedRoute {
            name,
            segments,
            saved_at_ms: clock.elapsed_ms,
        });
    }
}

pub struct RoutesPlugin;

impl Plugin for RoutesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RouteBook>()
            .add_event::<SaveRouteEvent>()
            .add_systems(FixedUpdate, handle_save_route.in_set(TickSet::Progress));
    }
}
