//! Player-facing message sink.
//!
//! Systems emit `NotificationEvent`s for every pickup, delivery, expiry,
//! level change, mode change and exploration event. They are collected into
//! `NotificationLog` in the `Report` phase: an active list the presentation
//! layer shows (auto-dismissed after a priority-dependent number of ticks)
//! and a bounded journal.

use bevy::prelude::*;

use crate::sim_clock::SimClock;
use crate::simulation_sets::TickSet;

// =============================================================================
// Priority Levels
// =============================================================================

/// Notification priority, from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NotificationPriority {
    /// Lost passengers, failed levels.
    Warning,
    /// Refused commands: locked level, no track near a click.
    Attention,
    /// Pickups, mode changes, general status.
    Info,
    /// Deliveries, completed levels.
    Positive,
}

impl NotificationPriority {
    /// Auto-dismiss duration in simulation ticks.
    pub fn auto_dismiss_ticks(&self) -> u64 {
        match self {
            NotificationPriority::Warning => 100,
            NotificationPriority::Attention => 80,
            NotificationPriority::Info => 50,
            NotificationPriority::Positive => 50,
        }
    }

    /// Hex colour the presentation layer renders the message in.
    pub fn color(&self) -> &'static str {
        match self {
            NotificationPriority::Warning => "#e74c3c",
            NotificationPriority::Attention => "#f39c12",
            NotificationPriority::Info => "#3498db",
            NotificationPriority::Positive => "#2ecc71",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationPriority::Warning => "WARNING",
            NotificationPriority::Attention => "ATTENTION",
            NotificationPriority::Info => "INFO",
            NotificationPriority::Positive => "POSITIVE",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub priority: NotificationPriority,
    /// `SimClock::tick` at creation; drives auto-dismiss.
    pub created_tick: u64,
    /// `SimClock::elapsed_ms` at creation.
    pub created_ms: u64,
    pub dismissed: bool,
}

/// An archived notification.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub text: String,
    pub priority: NotificationPriority,
    pub created_ms: u64,
}

// =============================================================================
// Event
// =============================================================================

#[derive(Event, Debug, Clone)]
pub struct NotificationEvent {
    pub text: String,
    pub priority: NotificationPriority,
}

impl NotificationEvent {
    pub fn new(text: impl Into<String>, priority: NotificationPriority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }
}

// =============================================================================
// NotificationLog Resource
// =============================================================================

#[derive(Resource)]
pub struct NotificationLog {
    pub active: Vec<Notification>,
    pub journal: Vec<JournalEntry>,
    pub max_journal: usize,
    next_id: u64,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            journal: Vec::new(),
            max_journal: 200,
            next_id: 1,
        }
    }
}

impl NotificationLog {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, event: &NotificationEvent, clock: &SimClock) {
        let id = self.next_id();
        self.active.push(Notification {
            id,
            text: event.text.clone(),
            priority: event.priority,
            created_tick: clock.tick,
            created_ms: clock.elapsed_ms,
            dismissed: false,
        });
        self.journal.push(JournalEntry {
            text: event.text.clone(),
            priority: event.priority,
            created_ms: clock.elapsed_ms,
        });
        if self.journal.len() > self.max_journal {
            let excess = self.journal.len() - self.max_journal;
            self.journal.drain(0..excess);
        }
    }

    pub fn dismiss(&mut self, id: u64) {
        if let Some(n) = self.active.iter_mut().find(|n| n.id == id) {
            n.dismissed = true;
        }
    }

    /// Drop dismissed and timed-out notifications from the active list.
    pub fn sweep(&mut self, current_tick: u64) {
        self.active.retain(|n| {
            !n.dismissed
                && current_tick.saturating_sub(n.created_tick) < n.priority.auto_dismiss_ticks()
        });
    }

    /// Whether any journal entry contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.journal.iter().any(|e| e.text.contains(needle))
    }
}

// =============================================================================
// Systems
// =============================================================================

fn collect_notifications(
    mut events: EventReader<NotificationEvent>,
    mut log: ResMut<NotificationLog>,
    clock: Res<SimClock>,
) {
    for event in events.read() {
        debug!("[{}] {}", event.priority.label(), event.text);
        log.push(event, &clock);
    }
}

fn sweep_expired_notifications(mut log: ResMut<NotificationLog>, clock: Res<SimClock>) {
    log.sweep(clock.tick);
}

pub struct NotificationsPlugin;

impl Plugin for NotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NotificationLog>()
            .add_event::<NotificationEvent>()
            .add_systems(
                FixedUpdate,
                (collect_notifications, sweep_expired_notifications)
                    .chain()
                    .in_set(TickSet::Report),
            );
    }
}
