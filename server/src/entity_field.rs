//! Collectible entity field: per-round spawn, drift, capture, replenish.

use crate::registry::Registry;
use log::{debug, info};
use rand::Rng;
use shared::{
    participant_radius, Collectible, CollectibleState, FieldSnapshot, ObjectiveState, DRIFT_MAX,
    SPAWN_BATCH,
};

/// The round collectibles are currently capturable for. A single slot: a
/// second objective entering Fusion overwrites it, and either Fusion's end
/// clears it.
#[derive(Debug, Clone)]
struct ActiveRound {
    objective_id: u32,
    round_id: u32,
    color: String,
}

#[derive(Debug, Default)]
pub struct EntityField {
    collectibles: Vec<Collectible>,
    active: Option<ActiveRound>,
    next_id: u64,
}

impl EntityField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_objective_id(&self) -> Option<u32> {
        self.active.as_ref().map(|round| round.objective_id)
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    fn spawn(
        &mut self,
        color: String,
        objective_id: u32,
        round_id: u32,
        rng: &mut impl Rng,
    ) -> Collectible {
        let id = self.next_id;
        self.next_id += 1;
        Collectible {
            id,
            x: rng.gen::<f32>(),
            y: rng.gen::<f32>(),
            vx: rng.gen_range(-DRIFT_MAX..=DRIFT_MAX),
            vy: rng.gen_range(-DRIFT_MAX..=DRIFT_MAX),
            color,
            state: CollectibleState::Free,
            objective_id,
            round_id,
        }
    }

    /// Starts a new round for `objective`: bumps its round counter, drops
    /// every Free collectible left over (captured ones persist as records),
    /// and spawns a fresh batch colored round-robin across the whole
    /// palette, all owned by the new `(objective, round)` pair.
    pub fn start_round(
        &mut self,
        objective: &mut ObjectiveState,
        palette: &[String],
        rng: &mut impl Rng,
    ) {
        objective.round_counter += 1;
        let round_id = objective.round_counter;

        self.collectibles.retain(|collectible| !collectible.is_free());
        for index in 0..SPAWN_BATCH {
            let color = palette[index % palette.len()].clone();
            let collectible = self.spawn(color, objective.id, round_id, rng);
            self.collectibles.push(collectible);
        }

        info!(
            "Round {} started for objective {}: {} collectibles spawned",
            round_id, objective.id, SPAWN_BATCH
        );
        self.active = Some(ActiveRound {
            objective_id: objective.id,
            round_id,
            color: objective.color.clone(),
        });
    }

    /// Ends the active round: remaining Free collectibles disappear,
    /// captured ones are retained indefinitely.
    pub fn end_round(&mut self) {
        let before = self.collectibles.len();
        self.collectibles.retain(|collectible| !collectible.is_free());
        info!(
            "Round ended: {} free collectibles discarded, {} capture records kept",
            before - self.collectibles.len(),
            self.collectibles.len()
        );
        self.active = None;
    }

    /// One tick of field simulation: drift every Free collectible, capture
    /// those of the active round's color that touch a participant, then
    /// replenish so at least one capturable collectible always exists while
    /// a round is active.
    pub fn update(&mut self, registry: &Registry, rng: &mut impl Rng) {
        if self.collectibles.is_empty() && self.active.is_none() {
            return;
        }

        let capture_distance = participant_radius();

        for collectible in &mut self.collectibles {
            if !collectible.is_free() {
                continue;
            }
            collectible.drift();

            let capturable = match &self.active {
                Some(round) => {
                    collectible.objective_id == round.objective_id
                        && collectible.round_id == round.round_id
                        && collectible.color.eq_ignore_ascii_case(&round.color)
                }
                None => false,
            };
            if !capturable {
                continue;
            }

            // First participant in iteration order wins; not distance-ranked.
            for (id, position) in registry.iter() {
                let dx = collectible.x - position.x;
                let dy = collectible.y - position.y;
                if (dx * dx + dy * dy).sqrt() <= capture_distance {
                    collectible.state = CollectibleState::Captured { captured_by: *id };
                    break;
                }
            }
        }

        if let Some(round) = self.active.clone() {
            let free_matching = self
                .collectibles
                .iter()
                .filter(|collectible| {
                    collectible.is_free()
                        && collectible.objective_id == round.objective_id
                        && collectible.round_id == round.round_id
                        && collectible.color.eq_ignore_ascii_case(&round.color)
                })
                .count();

            if free_matching == 0 {
                let replacement =
                    self.spawn(round.color.clone(), round.objective_id, round.round_id, rng);
                debug!(
                    "Replenished collectible {} for objective {} round {}",
                    replacement.id, round.objective_id, round.round_id
                );
                self.collectibles.push(replacement);
            }
        }
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            active: self.active.is_some(),
            active_objective_id: self.active_objective_id(),
            collectibles: self.collectibles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{default_objectives, Position};
    use std::collections::HashMap;

    fn palette() -> Vec<String> {
        default_objectives()
            .iter()
            .map(|objective| objective.color.clone())
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn free_with(
        field: &EntityField,
        color: &str,
        objective_id: u32,
        round_id: u32,
    ) -> usize {
        field
            .collectibles()
            .iter()
            .filter(|c| {
                c.is_free()
                    && c.objective_id == objective_id
                    && c.round_id == round_id
                    && c.color.eq_ignore_ascii_case(color)
            })
            .count()
    }

    #[test]
    fn test_start_round_spawns_full_batch_round_robin() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();

        field.start_round(&mut objective, &palette(), &mut rng);

        assert_eq!(objective.round_counter, 1);
        assert_eq!(field.collectibles().len(), SPAWN_BATCH);
        assert!(field.is_active());
        assert_eq!(field.active_objective_id(), Some(objective.id));

        let mut per_color: HashMap<&str, usize> = HashMap::new();
        for collectible in field.collectibles() {
            assert!(collectible.is_free());
            assert_eq!(collectible.objective_id, objective.id);
            assert_eq!(collectible.round_id, 1);
            assert!((0.0..=1.0).contains(&collectible.x));
            assert!((0.0..=1.0).contains(&collectible.y));
            assert!(collectible.vx.abs() <= DRIFT_MAX);
            assert!(collectible.vy.abs() <= DRIFT_MAX);
            *per_color.entry(collectible.color.as_str()).or_default() += 1;
        }
        // 120 collectibles cycling 3 colors: 40 each
        assert_eq!(per_color.len(), 3);
        for count in per_color.values() {
            assert_eq!(*count, SPAWN_BATCH / 3);
        }
    }

    #[test]
    fn test_capture_requires_active_round_color_and_distance() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();
        field.start_round(&mut objective, &palette(), &mut rng);

        // Plant known collectibles: stale round, wrong color, and a live one
        field.collectibles.push(Collectible {
            id: 9001,
            x: 0.5,
            y: 0.5,
            vx: 0.0,
            vy: 0.0,
            color: objective.color.clone(),
            state: CollectibleState::Free,
            objective_id: objective.id,
            round_id: 0, // stale round
        });
        field.collectibles.push(Collectible {
            id: 9002,
            x: 0.5,
            y: 0.5,
            vx: 0.0,
            vy: 0.0,
            color: "#6EC1FF".to_string(), // wrong color
            state: CollectibleState::Free,
            objective_id: objective.id,
            round_id: 1,
        });
        field.collectibles.push(Collectible {
            id: 9003,
            x: 0.5,
            y: 0.5,
            vx: 0.0,
            vy: 0.0,
            color: objective.color.to_ascii_lowercase(), // case-insensitive match
            state: CollectibleState::Free,
            objective_id: objective.id,
            round_id: 1,
        });

        let mut registry = Registry::new();
        registry.register(7, Position::new(0.5, 0.5));

        field.update(&registry, &mut rng);

        let by_id: HashMap<u64, &Collectible> = field
            .collectibles()
            .iter()
            .map(|collectible| (collectible.id, collectible))
            .collect();
        assert!(by_id[&9001].is_free(), "stale round must not be captured");
        assert!(by_id[&9002].is_free(), "wrong color must not be captured");
        assert_eq!(
            by_id[&9003].state,
            CollectibleState::Captured { captured_by: 7 }
        );
    }

    #[test]
    fn test_capture_outside_radius_is_ignored() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();
        field.start_round(&mut objective, &palette(), &mut rng);

        field.collectibles.push(Collectible {
            id: 9001,
            x: 0.5,
            y: 0.5,
            vx: 0.0,
            vy: 0.0,
            color: objective.color.clone(),
            state: CollectibleState::Free,
            objective_id: objective.id,
            round_id: 1,
        });

        let mut registry = Registry::new();
        // participant_radius() ≈ 0.049; place just beyond it (plus drift margin)
        registry.register(7, Position::new(0.5 + 0.056, 0.5));

        field.update(&registry, &mut rng);

        let planted = field
            .collectibles()
            .iter()
            .find(|collectible| collectible.id == 9001)
            .unwrap();
        assert!(planted.is_free());
    }

    #[test]
    fn test_captured_by_is_write_once() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();
        field.start_round(&mut objective, &palette(), &mut rng);

        field.collectibles.push(Collectible {
            id: 9001,
            x: 0.5,
            y: 0.5,
            vx: 0.0,
            vy: 0.0,
            color: objective.color.clone(),
            state: CollectibleState::Free,
            objective_id: objective.id,
            round_id: 1,
        });

        let mut registry = Registry::new();
        registry.register(7, Position::new(0.5, 0.5));
        field.update(&registry, &mut rng);

        let captured_by = match field
            .collectibles()
            .iter()
            .find(|collectible| collectible.id == 9001)
            .unwrap()
            .state
        {
            CollectibleState::Captured { captured_by } => captured_by,
            CollectibleState::Free => panic!("expected capture"),
        };
        assert_eq!(captured_by, 7);

        // Another participant lands on the same spot; attribution must hold
        registry.register(8, Position::new(0.5, 0.5));
        registry.unregister(7);
        for _ in 0..5 {
            field.update(&registry, &mut rng);
        }
        let state = field
            .collectibles()
            .iter()
            .find(|collectible| collectible.id == 9001)
            .unwrap()
            .state;
        assert_eq!(state, CollectibleState::Captured { captured_by: 7 });
    }

    #[test]
    fn test_replenishment_keeps_one_capturable() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();
        field.start_round(&mut objective, &palette(), &mut rng);

        // Capture every active-color collectible by force
        for collectible in &mut field.collectibles {
            if collectible.color.eq_ignore_ascii_case(&objective.color) {
                collectible.state = CollectibleState::Captured { captured_by: 1 };
            }
        }
        assert_eq!(free_with(&field, &objective.color, objective.id, 1), 0);

        let registry = Registry::new();
        field.update(&registry, &mut rng);
        assert_eq!(free_with(&field, &objective.color, objective.id, 1), 1);

        // Stays at one while nothing captures it
        field.update(&registry, &mut rng);
        assert_eq!(free_with(&field, &objective.color, objective.id, 1), 1);
    }

    #[test]
    fn test_end_round_discards_free_keeps_captured() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();
        field.start_round(&mut objective, &palette(), &mut rng);

        field.collectibles[0].state = CollectibleState::Captured { captured_by: 3 };
        field.collectibles[1].state = CollectibleState::Captured { captured_by: 4 };

        field.end_round();

        assert!(!field.is_active());
        assert_eq!(field.collectibles().len(), 2);
        assert!(field.collectibles().iter().all(|c| !c.is_free()));

        // No active round: nothing is replenished
        let registry = Registry::new();
        field.update(&registry, &mut rng);
        assert_eq!(field.collectibles().len(), 2);
    }

    #[test]
    fn test_second_round_overwrites_active_slot() {
        let mut field = EntityField::new();
        let mut objectives = default_objectives();
        let mut rng = rng();
        let palette = palette();

        let (yellow, rest) = objectives.split_at_mut(1);
        let blue = &mut rest[0];

        field.start_round(&mut yellow[0], &palette, &mut rng);
        field.start_round(blue, &palette, &mut rng);

        assert_eq!(field.active_objective_id(), Some(blue.id));
        // The first round's free collectibles were displaced by the new batch
        assert_eq!(field.collectibles().len(), SPAWN_BATCH);
        assert!(field
            .collectibles()
            .iter()
            .all(|collectible| collectible.objective_id == blue.id));
    }

    #[test]
    fn test_captured_records_persist_across_rounds() {
        let mut field = EntityField::new();
        let mut objective = default_objectives().remove(0);
        let mut rng = rng();
        let palette = palette();

        field.start_round(&mut objective, &palette, &mut rng);
        field.collectibles[5].state = CollectibleState::Captured { captured_by: 9 };
        field.end_round();

        field.start_round(&mut objective, &palette, &mut rng);
        assert_eq!(objective.round_counter, 2);
        assert_eq!(field.collectibles().len(), SPAWN_BATCH + 1);
        let record = field
            .collectibles()
            .iter()
            .find(|collectible| !collectible.is_free())
            .unwrap();
        assert_eq!(record.round_id, 1);
    }
}
