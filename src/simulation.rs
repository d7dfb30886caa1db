//! Monte-Carlo simulation of match outcomes.
//!
//! The low-level functions simulate one tournament at a time from a `[home, draw, away]`
//! probability triple. [`SimulatePointsPerMatch`] drives them over a whole
//! [`PointsPerMatch`] table in batches, so a large number of simulations never has to be
//! drawn in one go.

use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::{DateNumber, Error, PointsPerMatch, Result, TournamentId, Winner};

const WINNER_POSSIBILITIES: [Winner; 3] = [Winner::Home, Winner::Draw, Winner::Away];

/// Simulates winners `num_simulations` times for `num_matches` matches.
///
/// The result has one row per match and one entry per simulation.
///
/// # Errors
///
/// Returns [`Error::InvalidProbabilities`](crate::Error::InvalidProbabilities) if the
/// probabilities cannot form a distribution, e.g. when all of them are zero.
pub fn simulate_winners<R>(
    probabilities: &[f64; 3],
    num_simulations: usize,
    num_matches: usize,
    rng: &mut R,
) -> Result<Vec<Vec<Winner>>>
where
    R: Rng + ?Sized,
{
    let distribution = WeightedIndex::new(probabilities)?;

    Ok((0..num_matches)
        .map(|_| {
            (0..num_simulations)
                .map(|_| WINNER_POSSIBILITIES[distribution.sample(rng)])
                .collect()
        })
        .collect())
}

/// Simulates points `num_simulations` times for the home and away teams of `num_matches`
/// matches.
///
/// Each match yields two consecutive rows, the home team's points first, matching the row
/// layout of [`PointsPerMatch`].
///
/// # Errors
///
/// Returns [`Error::InvalidProbabilities`](crate::Error::InvalidProbabilities) if the
/// probabilities cannot form a distribution.
pub fn simulate_points_per_match<R>(
    probabilities: &[f64; 3],
    num_simulations: usize,
    num_matches: usize,
    rng: &mut R,
) -> Result<Vec<Vec<u32>>>
where
    R: Rng + ?Sized,
{
    let distribution = WeightedIndex::new(probabilities)?;

    let mut rows = Vec::with_capacity(2 * num_matches);
    for _ in 0..num_matches {
        let mut home_row = Vec::with_capacity(num_simulations);
        let mut away_row = Vec::with_capacity(num_simulations);

        for _ in 0..num_simulations {
            let (home, away) = WINNER_POSSIBILITIES[distribution.sample(rng)].points();
            home_row.push(home);
            away_row.push(away);
        }

        rows.push(home_row);
        rows.push(away_row);
    }

    Ok(rows)
}

/// Simulated points for every `(id, date number, team)` row of a [`PointsPerMatch`] table.
///
/// Columns are individual simulations, named `s0`, `s1` and so on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedPoints {
    index: Vec<(TournamentId, DateNumber, String)>,
    columns: Vec<Vec<u32>>,
}

impl SimulatedPoints {
    /// The `(id, date number, team)` row keys, in table order.
    #[inline]
    pub fn index(&self) -> &[(TournamentId, DateNumber, String)] {
        &self.index
    }

    /// One column per simulation, each as long as [`index`](Self::index).
    #[inline]
    pub fn columns(&self) -> &[Vec<u32>] {
        &self.columns
    }

    #[inline]
    pub fn num_simulations(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        (0..self.columns.len()).map(|i| format!("s{i}")).collect()
    }
}

/// Simulates a whole [`PointsPerMatch`] table.
#[derive(Debug)]
pub struct SimulatePointsPerMatch<'a> {
    ppm: &'a PointsPerMatch,
}

impl<'a> SimulatePointsPerMatch<'a> {
    pub fn new(ppm: &'a PointsPerMatch) -> Self {
        Self { ppm }
    }

    fn simulation_index(&self) -> Vec<(TournamentId, DateNumber, String)> {
        self.ppm
            .iter()
            .map(|record| (record.id.clone(), record.date_number, record.team.clone()))
            .collect()
    }

    /// Simulates with one probability triple per tournament; all matches of a tournament
    /// share it.
    ///
    /// `num_iterations * batch_size` simulations are drawn in total, `batch_size` at a time.
    /// When `id_to_probabilities` is `None`, probabilities are estimated from the table
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingProbabilities`](crate::Error::MissingProbabilities) if a
    /// supplied mapping lacks a tournament, and
    /// [`Error::InvalidProbabilities`](crate::Error::InvalidProbabilities) if a tournament's
    /// probabilities cannot form a distribution.
    pub fn tournament_wide<R>(
        &self,
        num_iterations: usize,
        batch_size: usize,
        id_to_probabilities: Option<&BTreeMap<TournamentId, [f64; 3]>>,
        rng: &mut R,
    ) -> Result<SimulatedPoints>
    where
        R: Rng + ?Sized,
    {
        log::info!(
            "simulating {} batches of {} tournament-wide",
            num_iterations,
            batch_size
        );

        let estimated;
        let probabilities = match id_to_probabilities {
            Some(probabilities) => probabilities,
            None => {
                estimated = self.ppm.probabilities_per_id();
                &estimated
            }
        };
        let num_matches = self.ppm.number_of_matches_per_id();

        let mut columns = Vec::with_capacity(num_iterations * batch_size);
        for _ in 0..num_iterations {
            let mut batch = vec![Vec::with_capacity(self.ppm.len()); batch_size];

            // Tournaments are simulated in id order, which is also the row order of the
            // table, so per-id blocks stack up aligned with the index.
            for (id, matches) in &num_matches {
                let probabilities = probabilities
                    .get(id)
                    .ok_or_else(|| Error::MissingProbabilities(id.clone()))?;
                let rows = simulate_points_per_match(probabilities, batch_size, *matches, rng)?;

                for row in rows {
                    for (column, value) in batch.iter_mut().zip(row) {
                        column.push(value);
                    }
                }
            }

            columns.extend(batch);
        }

        Ok(SimulatedPoints {
            index: self.simulation_index(),
            columns,
        })
    }

    /// Simulates with one probability triple per match, given in the match order of the
    /// table (one triple per row pair).
    ///
    /// # Errors
    ///
    /// Returns
    /// [`Error::ProbabilityCountMismatch`](crate::Error::ProbabilityCountMismatch) if the
    /// number of triples does not match the number of matches, and
    /// [`Error::InvalidProbabilities`](crate::Error::InvalidProbabilities) if a triple
    /// cannot form a distribution.
    pub fn match_wide<R>(
        &self,
        num_iterations: usize,
        batch_size: usize,
        match_to_probabilities: &[[f64; 3]],
        rng: &mut R,
    ) -> Result<SimulatedPoints>
    where
        R: Rng + ?Sized,
    {
        log::info!(
            "simulating {} batches of {} match-wide",
            num_iterations,
            batch_size
        );

        if 2 * match_to_probabilities.len() != self.ppm.len() {
            return Err(Error::ProbabilityCountMismatch {
                expected: self.ppm.len() / 2,
                found: match_to_probabilities.len(),
            });
        }

        let mut columns = Vec::with_capacity(num_iterations * batch_size);
        for _ in 0..num_iterations {
            let mut batch = vec![Vec::with_capacity(self.ppm.len()); batch_size];

            for probabilities in match_to_probabilities {
                let rows = simulate_points_per_match(probabilities, batch_size, 1, rng)?;

                for row in rows {
                    for (column, value) in batch.iter_mut().zip(row) {
                        column.push(value);
                    }
                }
            }

            columns.extend(batch);
        }

        Ok(SimulatedPoints {
            index: self.simulation_index(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::{Error, MatchRecord, Matches, PointsPerMatch, TournamentId, Winner};

    use super::{simulate_points_per_match, simulate_winners, SimulatePointsPerMatch};

    fn sample_ppm() -> PointsPerMatch {
        let matches = Matches::new(vec![
            MatchRecord::new("t1", 0, "A", "B", Winner::Home),
            MatchRecord::new("t1", 1, "B", "A", Winner::Home),
            MatchRecord::new("t0", 0, "X", "Y", Winner::Draw),
        ])
        .unwrap();

        PointsPerMatch::from_matches(&matches)
    }

    #[test]
    fn test_simulate_winners_shape_and_certainty() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let winners = simulate_winners(&[1.0, 0.0, 0.0], 5, 3, &mut rng).unwrap();

        assert_eq!(winners.len(), 3);
        for row in &winners {
            assert_eq!(row, &[Winner::Home; 5]);
        }
    }

    #[test]
    fn test_simulate_points_rows_alternate_home_away() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let rows = simulate_points_per_match(&[0.0, 0.0, 1.0], 4, 2, &mut rng).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], [0; 4]);
        assert_eq!(rows[1], [3; 4]);
        assert_eq!(rows[2], [0; 4]);
        assert_eq!(rows[3], [3; 4]);
    }

    #[test]
    fn test_all_zero_probabilities_fail() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = simulate_winners(&[0.0, 0.0, 0.0], 1, 1, &mut rng);

        assert!(matches!(result, Err(Error::InvalidProbabilities(_))));
    }

    #[test]
    fn test_tournament_wide_aligns_rows_with_index() {
        let ppm = sample_ppm();
        let simulation = SimulatePointsPerMatch::new(&ppm);

        let probabilities = BTreeMap::from([
            (TournamentId::new("t0"), [0.0, 1.0, 0.0]),
            (TournamentId::new("t1"), [1.0, 0.0, 0.0]),
        ]);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let simulated = simulation
            .tournament_wide(2, 3, Some(&probabilities), &mut rng)
            .unwrap();

        assert_eq!(simulated.num_simulations(), 6);
        assert_eq!(simulated.column_names()[..2], ["s0", "s1"]);
        assert_eq!(simulated.index().len(), ppm.len());

        // t0 always draws (1, 1); t1 home always wins (3, 0).
        for column in simulated.columns() {
            assert_eq!(column, &[1, 1, 3, 0, 3, 0]);
        }
    }

    #[test]
    fn test_tournament_wide_estimates_probabilities_when_absent() {
        let matches = Matches::new(vec![
            MatchRecord::new("t1", 0, "A", "B", Winner::Home),
            MatchRecord::new("t1", 1, "B", "A", Winner::Home),
        ])
        .unwrap();
        let ppm = PointsPerMatch::from_matches(&matches);

        // Only home wins observed, so every simulated match is (3, 0).
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let simulated = SimulatePointsPerMatch::new(&ppm)
            .tournament_wide(1, 4, None, &mut rng)
            .unwrap();

        for column in simulated.columns() {
            assert_eq!(column, &[3, 0, 3, 0]);
        }
    }

    #[test]
    fn test_match_wide_uses_per_match_probabilities() {
        let ppm = sample_ppm();
        let simulation = SimulatePointsPerMatch::new(&ppm);

        // Row order is t0 then t1 by id: draw, home win, away win.
        let probabilities = [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let simulated = simulation
            .match_wide(1, 2, &probabilities, &mut rng)
            .unwrap();

        for column in simulated.columns() {
            assert_eq!(column, &[1, 1, 3, 0, 0, 3]);
        }
    }

    #[test]
    fn test_match_wide_rejects_wrong_probability_count() {
        let ppm = sample_ppm();
        let simulation = SimulatePointsPerMatch::new(&ppm);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = simulation.match_wide(1, 1, &[[1.0, 0.0, 0.0]], &mut rng);

        assert!(result.is_err());
    }

    #[test]
    fn test_seeded_simulations_are_reproducible() {
        let ppm = sample_ppm();
        let simulation = SimulatePointsPerMatch::new(&ppm);

        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);

        assert_eq!(
            simulation.tournament_wide(2, 2, None, &mut rng_a).unwrap(),
            simulation.tournament_wide(2, 2, None, &mut rng_b).unwrap()
        );
    }
}
