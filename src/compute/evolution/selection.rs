//! Tournament selection over occupied archive coordinates.

use crate::schema::{Individual, Objective};

use super::archive::Archive;
use super::genome::GenomeRng;

/// Selection contract violations.
///
/// Both indicate a misconfigured run, not a recoverable condition.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Tournament needs more than one competitor, got {0}")]
    TooFewCompetitors(usize),
    #[error(
        "Not enough elites: {elites} occupied cells cannot supply {amount} winners from tournaments of {competitors}"
    )]
    NotEnoughElites {
        elites: usize,
        amount: usize,
        competitors: usize,
    },
}

/// Select `amount` elites with pairwise distinct coordinates.
///
/// Each pick runs a tournament of `competitors` distinct elites drawn from
/// the elites not yet won in this call. The pool borrows the archive's
/// occupants in row-major order, so every competitor is a real elite.
pub fn select(
    archive: &Archive,
    amount: usize,
    competitors: usize,
    rng: &mut GenomeRng,
) -> Result<Vec<Individual>, SelectionError> {
    if competitors < 2 {
        return Err(SelectionError::TooFewCompetitors(competitors));
    }

    let mut pool: Vec<&Individual> = archive.elites().collect();
    if pool.len() <= amount + competitors {
        return Err(SelectionError::NotEnoughElites {
            elites: pool.len(),
            amount,
            competitors,
        });
    }

    let objective = archive.objective();
    let mut winners = Vec::with_capacity(amount);
    for _ in 0..amount {
        let slot = tournament(&pool, competitors, objective, rng);
        winners.push(pool.remove(slot).clone());
    }

    Ok(winners)
}

/// Run one tournament and return the winner's position in `pool`.
///
/// `pool` must hold more than `competitors` elites; the first drawn
/// competitor wins ties.
fn tournament(
    pool: &[&Individual],
    competitors: usize,
    objective: Objective,
    rng: &mut GenomeRng,
) -> usize {
    let mut available: Vec<usize> = (0..pool.len()).collect();

    let mut winner = available.remove(rng.index(available.len()));
    for _ in 1..competitors {
        let slot = available.remove(rng.index(available.len()));
        if objective.is_better(pool[slot].fitness, pool[winner].fitness) {
            winner = slot;
        }
    }

    winner
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::schema::{Coordinate, Gene, Genome};

    fn filled_archive(cells: usize) -> Archive {
        let mut archive = Archive::new(vec![5, 6], Objective::Minimize).unwrap();
        for i in 0..cells {
            archive
                .place(Individual {
                    genome: Genome::new(vec![Gene::Integer(i as i64)]),
                    fitness: i as f32,
                    coordinate: Some(Coordinate::from((i / 6, i % 6))),
                    generation: 0,
                })
                .unwrap();
        }
        archive
    }

    #[test]
    fn test_select_amount() {
        let archive = filled_archive(10);
        let mut rng = GenomeRng::new(42);

        let parents = select(&archive, 2, 3, &mut rng).unwrap();
        assert_eq!(parents.len(), 2);
        assert_ne!(parents[0].coordinate, parents[1].coordinate);
    }

    #[test]
    fn test_full_tournament_picks_best() {
        // With 7 elites, amount 1 and 5 competitors, two elites sit out, so
        // the winner is always among the three best.
        let archive = filled_archive(7);
        let mut rng = GenomeRng::new(0);
        for _ in 0..50 {
            let winner = &select(&archive, 1, 5, &mut rng).unwrap()[0];
            assert!(winner.fitness <= 2.0);
        }
    }

    #[test]
    fn test_winners_are_archive_elites() {
        let archive = filled_archive(12);
        let mut rng = GenomeRng::new(5);

        for _ in 0..20 {
            let winners = select(&archive, 3, 3, &mut rng).unwrap();
            assert_eq!(winners.len(), 3);
            for winner in &winners {
                let coordinate = winner.coordinate.as_ref().unwrap();
                assert_eq!(archive.get(coordinate), Some(winner));
            }
        }
    }

    #[test]
    fn test_too_few_competitors() {
        let archive = filled_archive(10);
        let mut rng = GenomeRng::new(42);
        assert_eq!(
            select(&archive, 1, 1, &mut rng),
            Err(SelectionError::TooFewCompetitors(1))
        );
    }

    #[test]
    fn test_competitors_exceed_elites() {
        let archive = filled_archive(4);
        let mut rng = GenomeRng::new(42);
        assert_eq!(
            select(&archive, 1, 4, &mut rng),
            Err(SelectionError::NotEnoughElites {
                elites: 4,
                amount: 1,
                competitors: 4,
            })
        );
    }

    #[test]
    fn test_pool_must_exceed_amount_plus_competitors() {
        let archive = filled_archive(5);
        let mut rng = GenomeRng::new(42);
        assert!(select(&archive, 2, 3, &mut rng).is_err());
        assert!(select(&archive, 1, 3, &mut rng).is_ok());
    }

    proptest! {
        #[test]
        fn prop_selection_coordinates_distinct(
            seed in any::<u64>(),
            cells in 8usize..30,
            amount in 1usize..4,
        ) {
            let archive = filled_archive(cells);
            let mut rng = GenomeRng::new(seed);

            let winners = select(&archive, amount, 3, &mut rng).unwrap();
            let coordinates: HashSet<_> =
                winners.iter().map(|w| w.coordinate.clone()).collect();

            prop_assert_eq!(winners.len(), amount);
            prop_assert_eq!(coordinates.len(), amount);
        }
    }
}
