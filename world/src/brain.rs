//! Decision strategies carried by individual enemies.
//!
//! A brain owns only its strategy tag and a private random source; the
//! world passes the acting enemy's position and the already-validated
//! candidate actions into [`Brain::decide`], so no brain ever holds a
//! reference back into world state.

use dimlight_core::{Direction, EnemyKind, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One legal action an enemy may take this turn.
///
/// Candidates are enumerated by the world in the fixed direction order, so
/// a brain's deterministic preferences resolve identically across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Candidate {
    /// Strike the player standing on the adjacent tile.
    Strike {
        /// Direction from the enemy toward the player.
        direction: Direction,
    },
    /// Step onto an adjacent free tile.
    Step {
        /// Destination tile of the step.
        to: Position,
        /// Direction of travel for the step.
        direction: Direction,
    },
}

#[derive(Clone, Copy, Debug)]
enum Strategy {
    Wander,
    Pursue { aggro_radius: u32 },
}

/// Decision-maker bound to exactly one enemy.
#[derive(Debug)]
pub(crate) struct Brain {
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl Brain {
    /// Creates the brain matching an enemy kind, seeded deterministically.
    pub(crate) fn for_kind(kind: EnemyKind, seed: u64) -> Self {
        let strategy = match kind.aggro_radius() {
            Some(aggro_radius) => Strategy::Pursue { aggro_radius },
            None => Strategy::Wander,
        };
        Self {
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Selects one action from the candidates, or `None` to wait in place.
    ///
    /// A strike always wins over any step. Pursuers inside their aggro
    /// radius consider only steps that shrink the Manhattan distance to the
    /// player and hold position when every such step is blocked; wanderers
    /// pick uniformly at random among all legal steps.
    pub(crate) fn decide(
        &mut self,
        own_position: Position,
        player_position: Position,
        candidates: Vec<Candidate>,
    ) -> Option<Candidate> {
        if let Some(strike) = candidates
            .iter()
            .find(|candidate| matches!(candidate, Candidate::Strike { .. }))
        {
            return Some(*strike);
        }

        let mut steps: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| matches!(candidate, Candidate::Step { .. }))
            .collect();

        if let Strategy::Pursue { aggro_radius } = self.strategy {
            let gap = own_position.delta_to(player_position).manhattan();
            if gap <= aggro_radius {
                steps.retain(|candidate| match candidate {
                    Candidate::Step { to, .. } => {
                        to.delta_to(player_position).manhattan() < gap
                    }
                    Candidate::Strike { .. } => false,
                });
                if steps.is_empty() {
                    return None;
                }
            }
        }

        if steps.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..steps.len());
        Some(steps[index])
    }

    /// Draws a percentile roll for the owner's loot table.
    pub(crate) fn loot_roll(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(to: Position, direction: Direction) -> Candidate {
        Candidate::Step { to, direction }
    }

    #[test]
    fn strikes_take_precedence_over_steps() {
        let mut brain = Brain::for_kind(EnemyKind::Prowler, 5);
        let own = Position::new(0, 0);
        let candidates = vec![
            step(Position::new(0, -1), Direction::North),
            Candidate::Strike {
                direction: Direction::East,
            },
            step(Position::new(0, 1), Direction::South),
        ];

        let choice = brain.decide(own, Position::new(1, 0), candidates);
        assert_eq!(
            choice,
            Some(Candidate::Strike {
                direction: Direction::East,
            })
        );
    }

    #[test]
    fn no_candidates_means_waiting() {
        let mut brain = Brain::for_kind(EnemyKind::Prowler, 5);
        let choice = brain.decide(Position::new(0, 0), Position::new(9, 9), Vec::new());
        assert_eq!(choice, None);
    }

    #[test]
    fn pursuer_inside_aggro_only_closes_distance() {
        let mut brain = Brain::for_kind(EnemyKind::Stalker, 5);
        let own = Position::new(0, 0);
        let player = Position::new(3, 0);
        let closing = step(Position::new(1, 0), Direction::East);
        let retreating = step(Position::new(-1, 0), Direction::West);
        let sidestep = step(Position::new(0, 1), Direction::South);

        for _ in 0..16 {
            let choice = brain.decide(own, player, vec![retreating, sidestep, closing]);
            assert_eq!(choice, Some(closing));
        }
    }

    #[test]
    fn cornered_pursuer_holds_position() {
        let mut brain = Brain::for_kind(EnemyKind::Stalker, 5);
        let own = Position::new(0, 0);
        let player = Position::new(2, 0);
        let retreating = step(Position::new(-1, 0), Direction::West);

        let choice = brain.decide(own, player, vec![retreating]);
        assert_eq!(choice, None);
    }

    #[test]
    fn pursuer_outside_aggro_wanders() {
        let mut brain = Brain::for_kind(EnemyKind::Stalker, 5);
        let own = Position::new(0, 0);
        let player = Position::new(20, 20);
        let retreating = step(Position::new(-1, 0), Direction::West);

        let choice = brain.decide(own, player, vec![retreating]);
        assert_eq!(choice, Some(retreating));
    }

    #[test]
    fn wanderer_only_picks_offered_steps() {
        let mut brain = Brain::for_kind(EnemyKind::Prowler, 99);
        let own = Position::new(5, 5);
        let offered = [
            step(Position::new(5, 4), Direction::North),
            step(Position::new(6, 5), Direction::East),
        ];

        for _ in 0..32 {
            let choice = brain
                .decide(own, Position::new(0, 0), offered.to_vec())
                .expect("steps were offered");
            assert!(offered.contains(&choice));
        }
    }
}
