use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const OBJECTIVE_RADIUS: f32 = 0.12;
pub const GATHERING_MS: u64 = 5000;
pub const FUSION_MS: u64 = 10_000;
pub const LOCKBACK_MS: u64 = 5000;
pub const SPAWN_BATCH: usize = 120;
pub const DRIFT_MAX: f32 = 0.003;
pub const DEFAULT_TICK_RATE: u32 = 10;

/// Capture distance around a participant, derived from the objective radius.
pub fn participant_radius() -> f32 {
    OBJECTIVE_RADIUS * (1.0f32 / 6.0).sqrt()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Round phase of one objective. Each variant carries only the timing
/// state meaningful to it; Idle has none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Gathering { started_ms: u64 },
    Fusion { started_ms: u64 },
    Lockback { started_ms: u64 },
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Gathering { .. } => "gathering",
            Phase::Fusion { .. } => "fusion",
            Phase::Lockback { .. } => "lockback",
        }
    }
}

/// Full state of one rendezvous objective as broadcast in every snapshot.
///
/// The fixed identity fields (`id`, `name`, `color`, `center`, `radius`,
/// `rank`) never change after startup; everything else is owned and
/// mutated by the server tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveState {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub center: Position,
    pub radius: f32,
    pub rank: u32,
    pub phase: Phase,
    pub gathering_ms: u64,
    pub fusion_ms: u64,
    pub lockback_ms: u64,
    /// Participants active in the current round. Grows monotonically while
    /// a round is in progress, empty outside one.
    pub current_group: BTreeSet<u32>,
    /// Sorted snapshot of the most recently completed group.
    pub last_group: Vec<u32>,
    /// Incremented each time the objective enters Fusion.
    pub round_counter: u32,
    pub last_round_id: Option<u32>,
}

impl ObjectiveState {
    pub fn new(id: u32, rank: u32, center: Position, color: &str, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            center,
            radius: OBJECTIVE_RADIUS,
            rank,
            phase: Phase::Idle,
            gathering_ms: GATHERING_MS,
            fusion_ms: FUSION_MS,
            lockback_ms: LOCKBACK_MS,
            current_group: BTreeSet::new(),
            last_group: Vec::new(),
            round_counter: 0,
            last_round_id: None,
        }
    }
}

/// The three fixed objectives every session starts with.
pub fn default_objectives() -> Vec<ObjectiveState> {
    vec![
        ObjectiveState::new(1, 0, Position::new(0.25, 0.5), "#FFD93D", "Yellow"),
        ObjectiveState::new(2, 1, Position::new(0.50, 0.5), "#6EC1FF", "Blue"),
        ObjectiveState::new(3, 2, Position::new(0.75, 0.5), "#FF90C9", "Pink"),
    ]
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CollectibleState {
    Free,
    Captured { captured_by: u32 },
}

/// An ephemeral collectible spawned for one objective round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: String,
    pub state: CollectibleState,
    pub objective_id: u32,
    pub round_id: u32,
}

impl Collectible {
    pub fn is_free(&self) -> bool {
        matches!(self.state, CollectibleState::Free)
    }

    /// Advances the collectible by its drift velocity, reflecting off the
    /// unit-square boundary with position clamped to the edge.
    pub fn drift(&mut self) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 {
            self.x = 0.0;
            self.vx = -self.vx;
        }
        if self.x > 1.0 {
            self.x = 1.0;
            self.vx = -self.vx;
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = -self.vy;
        }
        if self.y > 1.0 {
            self.y = 1.0;
            self.vy = -self.vy;
        }
    }
}

/// Collectible field portion of the per-tick snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub active: bool,
    pub active_objective_id: Option<u32>,
    pub collectibles: Vec<Collectible>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    PositionUpdate {
        x: f32,
        y: f32,
    },
    Disconnect,

    Connected {
        participant_id: u32,
        participants: HashMap<u32, Position>,
        objectives: Vec<ObjectiveState>,
    },
    Rejected {
        reason: String,
    },
    ParticipantJoined {
        id: u32,
        x: f32,
        y: f32,
    },
    ParticipantLeft {
        id: u32,
    },
    Snapshot {
        tick: u32,
        timestamp: u64,
        participants: HashMap<u32, Position>,
        objectives: Vec<ObjectiveState>,
        field: FieldSnapshot,
    },
}
