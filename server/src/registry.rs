use log::info;
use rand::Rng;
use shared::{ObjectiveState, Position};
use std::collections::{BTreeSet, HashMap};

/// Connection registry: every connected participant's id and position.
///
/// Positions are the only state mutable from outside the tick (inbound
/// updates land here directly); everything else in the simulation is
/// written exclusively by the tick itself.
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<u32, Position>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            participants: HashMap::new(),
        }
    }

    /// Picks a random spawn position away from the edges of the unit square.
    pub fn spawn_position(rng: &mut impl Rng) -> Position {
        Position::new(
            rng.gen::<f32>() * 0.6 + 0.2,
            rng.gen::<f32>() * 0.6 + 0.2,
        )
    }

    pub fn register(&mut self, id: u32, position: Position) {
        info!(
            "Registered participant {} at ({:.3}, {:.3})",
            id, position.x, position.y
        );
        self.participants.insert(id, position);
    }

    /// Removes the participant entirely. Does not touch any objective's
    /// group membership already recorded or in progress.
    pub fn unregister(&mut self, id: u32) -> bool {
        if self.participants.remove(&id).is_some() {
            info!("Unregistered participant {}", id);
            true
        } else {
            false
        }
    }

    /// Applies an inbound position update. Each finite coordinate is
    /// clamped into [0,1]; non-finite coordinates are ignored without
    /// error, preserving the last valid value. Unknown ids are ignored.
    pub fn update_position(&mut self, id: u32, x: f32, y: f32) {
        if let Some(position) = self.participants.get_mut(&id) {
            if x.is_finite() {
                position.x = x.clamp(0.0, 1.0);
            }
            if y.is_finite() {
                position.y = y.clamp(0.0, 1.0);
            }
        }
    }

    /// Hard relocation used when a round locks its group back to the
    /// objective center. Skips ids no longer registered.
    pub fn force_position(&mut self, id: u32, x: f32, y: f32) {
        if let Some(position) = self.participants.get_mut(&id) {
            position.x = x;
            position.y = y;
        }
    }

    pub fn get(&self, id: u32) -> Option<Position> {
        self.participants.get(&id).copied()
    }

    /// Ids of all participants strictly inside the objective radius,
    /// sorted by id.
    pub fn inside(&self, objective: &ObjectiveState) -> BTreeSet<u32> {
        self.participants
            .iter()
            .filter(|(_, position)| position.distance_to(objective.center) < objective.radius)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Position)> {
        self.participants.iter()
    }

    pub fn positions(&self) -> &HashMap<u32, Position> {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
