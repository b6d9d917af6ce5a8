//! The simulation context: all mutable session state, advanced one tick at
//! a time by the server loop and serialized whole into every snapshot.

use crate::entity_field::EntityField;
use crate::ledger::GroupLedger;
use crate::objective::{self, FusionEdge};
use crate::registry::Registry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{ObjectiveState, Packet, Position};

/// Owns the registry, objectives, ledger, and collectible field. The tick
/// driver is the sole writer; inbound position updates are funneled through
/// [`Simulation::apply_position_update`] between ticks.
pub struct Simulation {
    pub registry: Registry,
    pub objectives: Vec<ObjectiveState>,
    pub ledger: GroupLedger,
    pub field: EntityField,
    pub tick: u32,
    rng: StdRng,
}

impl Simulation {
    pub fn new(objectives: Vec<ObjectiveState>) -> Self {
        Self::with_rng(objectives, StdRng::from_entropy())
    }

    /// Deterministic instance for tests.
    pub fn with_seed(objectives: Vec<ObjectiveState>, seed: u64) -> Self {
        Self::with_rng(objectives, StdRng::seed_from_u64(seed))
    }

    fn with_rng(objectives: Vec<ObjectiveState>, rng: StdRng) -> Self {
        Self {
            registry: Registry::new(),
            objectives,
            ledger: GroupLedger::new(),
            field: EntityField::new(),
            tick: 0,
            rng,
        }
    }

    /// Registers a new participant at a random spawn position and returns it.
    pub fn connect(&mut self, id: u32) -> Position {
        let position = Registry::spawn_position(&mut self.rng);
        self.registry.register(id, position);
        position
    }

    pub fn disconnect(&mut self, id: u32) {
        self.registry.unregister(id);
    }

    pub fn apply_position_update(&mut self, id: u32, x: f32, y: f32) {
        self.registry.update_position(id, x, y);
    }

    /// Advances the whole simulation by one tick evaluated at `now_ms`.
    ///
    /// Order is fixed: every objective state machine first (Fusion edges
    /// drive collectible round start/end), then the collectible field. A
    /// snapshot taken afterwards can never show collectibles belonging to a
    /// round its objective has not reached.
    pub fn advance(&mut self, now_ms: u64) {
        self.tick = self.tick.wrapping_add(1);

        let palette: Vec<String> = self
            .objectives
            .iter()
            .map(|objective| objective.color.clone())
            .collect();

        for index in 0..self.objectives.len() {
            let edge = objective::advance(
                &mut self.objectives[index],
                &mut self.registry,
                &mut self.ledger,
                now_ms,
            );
            match edge {
                Some(FusionEdge::Entered) => {
                    self.field
                        .start_round(&mut self.objectives[index], &palette, &mut self.rng)
                }
                Some(FusionEdge::Exited) => self.field.end_round(),
                None => {}
            }
        }

        self.field.update(&self.registry, &mut self.rng);
    }

    /// Full-state snapshot packet for broadcasting. No diffing.
    pub fn snapshot(&self, timestamp: u64) -> Packet {
        Packet::Snapshot {
            tick: self.tick,
            timestamp,
            participants: self.registry.positions().clone(),
            objectives: self.objectives.clone(),
            field: self.field.snapshot(),
        }
    }
}
