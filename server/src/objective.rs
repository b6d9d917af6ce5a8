//! Rendezvous objective state machine: Idle → Gathering → Fusion → Lockback → Idle.

use crate::ledger::GroupLedger;
use crate::registry::Registry;
use log::info;
use shared::{ObjectiveState, Phase};

/// Fusion boundary crossed during one advance step. The tick driver uses
/// this to start and end collectible rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionEdge {
    Entered,
    Exited,
}

/// Advances one objective by a single tick evaluated at `now_ms`.
///
/// Transition rules:
/// - Idle: ≥2 participants inside the radius whose exact set has not
///   completed this objective before → Gathering with that set as the group.
/// - Gathering: newly-inside participants join the group (it never shrinks);
///   if the live inside-count drops below 2 the round aborts to Idle. After
///   the gathering duration, a group of ≥2 enters Fusion.
/// - Fusion: fixed window with no membership or position constraints. On
///   expiry the round id is latched, the whole group is relocated to the
///   objective center, and Lockback begins.
/// - Lockback: on expiry the group becomes `last_group`, is recorded in the
///   ledger, and the objective returns to Idle.
pub fn advance(
    objective: &mut ObjectiveState,
    registry: &mut Registry,
    ledger: &mut GroupLedger,
    now_ms: u64,
) -> Option<FusionEdge> {
    let inside = registry.inside(objective);

    match objective.phase {
        Phase::Idle => {
            if inside.len() >= 2 && !ledger.has_exact_group(objective.id, &inside) {
                info!(
                    "Objective {} gathering with group {:?}",
                    objective.name, inside
                );
                objective.phase = Phase::Gathering { started_ms: now_ms };
                objective.current_group = inside;
            }
            None
        }

        Phase::Gathering { started_ms } => {
            // Late arrivals join; departures never shrink the group.
            objective.current_group.extend(inside.iter().copied());

            if inside.len() < 2 {
                info!("Objective {} gathering aborted", objective.name);
                objective.phase = Phase::Idle;
                objective.current_group.clear();
                return None;
            }

            if now_ms.saturating_sub(started_ms) >= objective.gathering_ms {
                if objective.current_group.len() >= 2 {
                    info!(
                        "Objective {} fusion started, group {:?}",
                        objective.name, objective.current_group
                    );
                    objective.phase = Phase::Fusion { started_ms: now_ms };
                    return Some(FusionEdge::Entered);
                }
                objective.phase = Phase::Idle;
                objective.current_group.clear();
            }
            None
        }

        Phase::Fusion { started_ms } => {
            if now_ms.saturating_sub(started_ms) >= objective.fusion_ms {
                objective.last_round_id = Some(objective.round_counter);

                // Lock the whole group back onto the objective center.
                // Ids that disconnected mid-round are skipped but stay
                // in the group.
                for id in &objective.current_group {
                    registry.force_position(*id, objective.center.x, objective.center.y);
                }

                info!(
                    "Objective {} lockback, round {} complete",
                    objective.name, objective.round_counter
                );
                objective.phase = Phase::Lockback { started_ms: now_ms };
                return Some(FusionEdge::Exited);
            }
            None
        }

        Phase::Lockback { started_ms } => {
            if now_ms.saturating_sub(started_ms) >= objective.lockback_ms {
                objective.last_group = objective.current_group.iter().copied().collect();
                if objective.last_group.len() >= 2 {
                    ledger.record(objective.id, &objective.current_group);
                }
                objective.current_group.clear();
                objective.phase = Phase::Idle;
                info!("Objective {} idle", objective.name);
            }
            None
        }
    }
}
