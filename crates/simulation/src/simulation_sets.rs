//! Deterministic per-tick ordering via `SystemSet` phases.
//!
//! Every simulation system in `FixedUpdate` MUST live in exactly one of these
//! sets; host plugins order themselves after `Report`. The sets are chained,
//! so one `FixedUpdate` run is one heartbeat that walks the phases in order:
//!
//! ```text
//! Clock  →  Generate  →  Interact  →  Move  →  Progress  →  Report
//! ```
//!
//! * **Clock**: player commands (start/pause, level select, drive mode,
//!   segment clicks, relocation) and the simulation clock advance.
//! * **Generate**: passenger generation.
//! * **Interact**: expiry, delivery and pickup checks against the position
//!   the train came to rest at in the previous tick. Passengers generated in
//!   this tick are never picked up in it.
//! * **Move**: train motion.
//! * **Progress**: objective evaluation, level unlocks, saved routes.
//! * **Report**: read-only aggregation (notifications, the map frame).

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Clock,
    Generate,
    Interact,
    Move,
    Progress,
    Report,
}

impl TickSet {
    /// Phases in execution order.
    pub const ORDER: [TickSet; 6] = [
        TickSet::Clock,
        TickSet::Generate,
        TickSet::Interact,
        TickSet::Move,
        TickSet::Progress,
        TickSet::Report,
    ];
}

/// Chain the phases inside `FixedUpdate`.
pub(crate) fn configure_tick_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            TickSet::Clock,
            TickSet::Generate,
            TickSet::Interact,
            TickSet::Move,
            TickSet::Progress,
            TickSet::Report,
        )
            .chain(),
    );
}
