use std::hash::Hash;

use rand::Rng;

use crate::circle::circle_method;
use crate::randomize::{RandomizeOptions, ScheduleRandomizer};
use crate::Schedule;

/// A scheduling function: `num_teams` in, single round-robin schedule over integer teams out.
pub type SchedulingFn = fn(usize) -> Schedule<usize>;

/// How the second portion of each double round-robin repetition is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecondPortion {
    /// A home/away-reversed copy of the (already randomized) first portion, keeping the same
    /// round order. The resulting repetition looks like a real two-legged competition.
    Flipped,
    /// The first portion with rounds and in-round matches reversed in order and every match
    /// flipped.
    Reversed,
    /// An independent randomization of the stored second schedule.
    Randomized(RandomizeOptions),
}

/// A single round-robin schedule: every pair of teams meets exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleRoundRobin<T> {
    num_teams: usize,
    team_names: Vec<T>,
    schedule: Schedule<T>,
}

impl SingleRoundRobin<usize> {
    /// Creates a schedule for `num_teams` teams identified by the integers `0..num_teams`,
    /// using the circle method.
    pub fn from_num_teams(num_teams: usize) -> Self {
        Self::from_num_teams_with(num_teams, circle_method)
    }

    /// Same as [`from_num_teams`] with a custom scheduling function.
    ///
    /// [`from_num_teams`]: Self::from_num_teams
    pub fn from_num_teams_with(num_teams: usize, scheduling_fn: SchedulingFn) -> Self {
        log::info!("creating single round-robin for {} teams", num_teams);

        Self {
            num_teams,
            team_names: (0..num_teams).collect(),
            schedule: scheduling_fn(num_teams),
        }
    }
}

impl<T> SingleRoundRobin<T>
where
    T: Clone,
{
    /// Creates a schedule where team `i` of the generated integer schedule is renamed to
    /// `team_names[i]`, using the circle method.
    pub fn from_team_names(team_names: Vec<T>) -> Self {
        Self::from_team_names_with(team_names, circle_method)
    }

    /// Same as [`from_team_names`] with a custom scheduling function.
    ///
    /// [`from_team_names`]: Self::from_team_names
    pub fn from_team_names_with(team_names: Vec<T>, scheduling_fn: SchedulingFn) -> Self {
        log::info!("creating single round-robin for {} named teams", team_names.len());

        let schedule = scheduling_fn(team_names.len()).rename_teams(&team_names);

        Self {
            num_teams: team_names.len(),
            team_names,
            schedule,
        }
    }
}

impl<T> SingleRoundRobin<T> {
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    #[inline]
    pub fn team_names(&self) -> &[T] {
        &self.team_names
    }

    #[inline]
    pub fn schedule(&self) -> &Schedule<T> {
        &self.schedule
    }
}

impl<T> SingleRoundRobin<T>
where
    T: Clone + Eq + Hash + Ord,
{
    /// Concatenates `num_schedules` independently randomized copies of the schedule into one
    /// flat sequence of rounds.
    pub fn get_full_schedule<R>(
        &self,
        num_schedules: usize,
        options: &RandomizeOptions,
        rng: &mut R,
    ) -> Schedule<T>
    where
        R: Rng + ?Sized,
    {
        let randomizer = ScheduleRandomizer::new(&self.schedule, Some(&self.team_names));

        let mut full = Schedule::with_capacity(num_schedules * self.schedule.len());
        for _ in 0..num_schedules {
            full.extend(randomizer.randomize(options, rng));
        }

        full
    }
}

/// A double round-robin schedule: every pair of teams meets exactly twice, once in each
/// home/away role.
///
/// The second schedule is always derived from the first by flipping each match; it is
/// precomputed at construction and never independently authoritative.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleRoundRobin<T> {
    num_teams: usize,
    team_names: Vec<T>,
    first_schedule: Schedule<T>,
    second_schedule: Schedule<T>,
}

impl DoubleRoundRobin<usize> {
    /// Creates a schedule for `num_teams` teams identified by the integers `0..num_teams`,
    /// using the circle method.
    pub fn from_num_teams(num_teams: usize) -> Self {
        Self::from_num_teams_with(num_teams, circle_method)
    }

    /// Same as [`from_num_teams`] with a custom scheduling function.
    ///
    /// [`from_num_teams`]: Self::from_num_teams
    pub fn from_num_teams_with(num_teams: usize, scheduling_fn: SchedulingFn) -> Self {
        Self::from_single(SingleRoundRobin::from_num_teams_with(num_teams, scheduling_fn))
    }
}

impl<T> DoubleRoundRobin<T>
where
    T: Clone,
{
    /// Creates a schedule where team `i` of the generated integer schedule is renamed to
    /// `team_names[i]`, using the circle method.
    pub fn from_team_names(team_names: Vec<T>) -> Self {
        Self::from_team_names_with(team_names, circle_method)
    }

    /// Same as [`from_team_names`] with a custom scheduling function.
    ///
    /// [`from_team_names`]: Self::from_team_names
    pub fn from_team_names_with(team_names: Vec<T>, scheduling_fn: SchedulingFn) -> Self {
        Self::from_single(SingleRoundRobin::from_team_names_with(team_names, scheduling_fn))
    }

    fn from_single(single: SingleRoundRobin<T>) -> Self {
        let second_schedule = single.schedule.flipped();

        Self {
            num_teams: single.num_teams,
            team_names: single.team_names,
            first_schedule: single.schedule,
            second_schedule,
        }
    }
}

impl<T> DoubleRoundRobin<T> {
    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    #[inline]
    pub fn team_names(&self) -> &[T] {
        &self.team_names
    }

    #[inline]
    pub fn first_schedule(&self) -> &Schedule<T> {
        &self.first_schedule
    }

    #[inline]
    pub fn second_schedule(&self) -> &Schedule<T> {
        &self.second_schedule
    }

    /// Number of rounds in one full repetition (first plus second portion).
    #[inline]
    pub fn rounds_per_repetition(&self) -> usize {
        self.first_schedule.len() + self.second_schedule.len()
    }
}

impl<T> DoubleRoundRobin<T>
where
    T: Clone + Eq + Hash + Ord,
{
    /// Concatenates `num_schedules` double round-robin repetitions into one flat sequence of
    /// rounds.
    ///
    /// Each repetition's first portion is randomized per `first`; its second portion is
    /// produced per `second`: [`SecondPortion::Flipped`] mirrors the randomized first portion,
    /// [`SecondPortion::Reversed`] reverses it wholesale and
    /// [`SecondPortion::Randomized`] randomizes the stored second schedule independently.
    pub fn get_full_schedule<R>(
        &self,
        num_schedules: usize,
        first: &RandomizeOptions,
        second: &SecondPortion,
        rng: &mut R,
    ) -> Schedule<T>
    where
        R: Rng + ?Sized,
    {
        let rand_first = ScheduleRandomizer::new(&self.first_schedule, Some(&self.team_names));
        let rand_second = ScheduleRandomizer::new(&self.second_schedule, Some(&self.team_names));

        let mut full = Schedule::with_capacity(num_schedules * self.rounds_per_repetition());
        for _ in 0..num_schedules {
            let first_portion = rand_first.randomize(first, rng);

            let second_portion = match second {
                SecondPortion::Flipped => first_portion.flipped(),
                SecondPortion::Reversed => first_portion.reversed(),
                SecondPortion::Randomized(options) => rand_second.randomize(options, rng),
            };

            full.extend(first_portion);
            full.extend(second_portion);
        }

        full
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::randomize::RandomizeOptions;
    use crate::{schedule, TeamPair};

    use super::{DoubleRoundRobin, SecondPortion, SingleRoundRobin};

    #[test]
    fn test_single_from_num_teams() {
        let single = SingleRoundRobin::from_num_teams(4);

        assert_eq!(single.num_teams(), 4);
        assert_eq!(single.team_names(), [0, 1, 2, 3]);
        assert_eq!(
            *single.schedule(),
            schedule![
                [(0, 3), (1, 2)],
                [(0, 2), (3, 1)],
                [(0, 1), (2, 3)],
            ]
        );
    }

    #[test]
    fn test_single_from_team_names() {
        let single = SingleRoundRobin::from_team_names(vec!["A", "B", "C", "D"]);

        assert_eq!(
            *single.schedule(),
            schedule![
                [("A", "D"), ("B", "C")],
                [("A", "C"), ("D", "B")],
                [("A", "B"), ("C", "D")],
            ]
        );
    }

    #[test]
    fn test_single_full_schedule_concatenates() {
        let single = SingleRoundRobin::from_num_teams(4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let full = single.get_full_schedule(3, &RandomizeOptions::none(), &mut rng);

        assert_eq!(full.len(), 9);
        for repetition in full.chunks(3) {
            assert_eq!(repetition, single.schedule().as_slice());
        }
    }

    #[test]
    fn test_double_second_schedule_is_flipped_first() {
        let double = DoubleRoundRobin::from_num_teams(5);

        assert_eq!(*double.second_schedule(), double.first_schedule().flipped());

        // Same round index, same relative match position, roles swapped.
        for (first, second) in double
            .first_schedule()
            .iter()
            .zip(double.second_schedule().iter())
        {
            for (pair, flipped) in first.iter().zip(second.iter()) {
                assert_eq!(*flipped, TeamPair::new(pair.away, pair.home));
            }
        }
    }

    #[test]
    fn test_double_full_schedule_flipped() {
        let double = DoubleRoundRobin::from_num_teams(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let full = double.get_full_schedule(
            2,
            &RandomizeOptions::none(),
            &SecondPortion::Flipped,
            &mut rng,
        );

        assert_eq!(full.len(), 2 * double.rounds_per_repetition());
        for repetition in full.chunks(double.rounds_per_repetition()) {
            let (first, second) = repetition.split_at(double.first_schedule().len());
            for (first_round, second_round) in first.iter().zip(second.iter()) {
                for (pair, flipped) in first_round.iter().zip(second_round.iter()) {
                    assert_eq!(*flipped, pair.clone().flipped());
                }
            }
        }
    }

    #[test]
    fn test_double_full_schedule_reversed() {
        let double = DoubleRoundRobin::from_num_teams(4);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let full = double.get_full_schedule(
            1,
            &RandomizeOptions::none(),
            &SecondPortion::Reversed,
            &mut rng,
        );

        let (first, second) = full.split_at(double.first_schedule().len());
        let first: crate::Schedule<usize> = first.to_vec().into();
        assert_eq!(second, first.reversed().as_slice());
    }

    #[test]
    fn test_double_full_schedule_randomized_keeps_multiset() {
        let double = DoubleRoundRobin::from_num_teams(6);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let options = RandomizeOptions {
            teams: false,
            ..RandomizeOptions::all()
        };
        let full = double.get_full_schedule(
            1,
            &options,
            &SecondPortion::Randomized(options),
            &mut rng,
        );

        // One repetition lets every unordered pair meet exactly twice, regardless of which
        // team ended up at home.
        let mut unordered = std::collections::HashMap::new();
        for pair in full.matches() {
            let key = (pair.home.min(pair.away), pair.home.max(pair.away));
            *unordered.entry(key).or_insert(0) += 1;
        }
        assert_eq!(unordered.len(), 6 * 5 / 2);
        assert!(unordered.values().all(|count| *count == 2));
    }
}
