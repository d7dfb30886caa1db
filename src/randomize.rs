//! # Schedule Randomization
//!
//! Independent, composable randomizations of a [`Schedule`]: team relabeling, home/away
//! flipping, in-round match order and round order. Each acts on a different axis, so their
//! combined effect does not depend on application order; [`ScheduleRandomizer::randomize`]
//! nevertheless applies them in a fixed sequence (home/away, matches, rounds, teams) so that a
//! seeded generator always reproduces the same output.
//!
//! No function here mutates its input; a new schedule is always returned, even when nothing is
//! randomized.

use std::collections::HashMap;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::Schedule;

/// Selects which axes of a schedule get randomized.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RandomizeOptions {
    /// Relabel every team via a uniformly random permutation of the team-name set.
    pub teams: bool,
    /// For each match independently, decide by coin flip whether to swap home and away.
    pub home_away: bool,
    /// Shuffle the order of matches within each round.
    pub matches: bool,
    /// Shuffle the order of rounds in the schedule.
    pub rounds: bool,
}

impl RandomizeOptions {
    /// All four axes enabled.
    #[inline]
    pub const fn all() -> Self {
        Self {
            teams: true,
            home_away: true,
            matches: true,
            rounds: true,
        }
    }

    /// No axis enabled; randomizing with this is an identity copy.
    #[inline]
    pub const fn none() -> Self {
        Self {
            teams: false,
            home_away: false,
            matches: false,
            rounds: false,
        }
    }
}

/// For each match independently, keeps `(home, away)` or swaps it to `(away, home)` with equal
/// probability.
///
/// Without this a schedule straight out of the circle method would give some teams far more
/// home matches than others.
pub fn shuffle_home_away<T, R>(schedule: &Schedule<T>, rng: &mut R) -> Schedule<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    schedule
        .iter()
        .map(|round| {
            round
                .iter()
                .map(|pair| {
                    if rng.gen::<bool>() {
                        pair.clone().flipped()
                    } else {
                        pair.clone()
                    }
                })
                .collect()
        })
        .collect()
}

/// Shuffles the matches within each round; round membership is unchanged.
pub fn shuffle_matches_in_rounds<T, R>(schedule: &Schedule<T>, rng: &mut R) -> Schedule<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    schedule
        .iter()
        .map(|round| {
            let mut round = round.clone();
            round.shuffle(rng);
            round
        })
        .collect()
}

/// Shuffles the order of the rounds themselves.
pub fn shuffle_rounds<T, R>(schedule: &Schedule<T>, rng: &mut R) -> Schedule<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut schedule = schedule.clone();
    schedule.shuffle(rng);
    schedule
}

/// Relabels every team via a uniformly random permutation of `team_names`.
///
/// The relabeling is consistent: if team X maps to Y once, every occurrence of X becomes Y.
/// When `team_names` is `None` the names are derived from the schedule itself. A team in the
/// schedule but absent from a supplied `team_names` keeps its name.
pub fn shuffle_teams<T, R>(
    schedule: &Schedule<T>,
    team_names: Option<&[T]>,
    rng: &mut R,
) -> Schedule<T>
where
    T: Clone + Eq + Hash + Ord,
    R: Rng + ?Sized,
{
    let names: Vec<T> = match team_names {
        Some(names) => names.to_vec(),
        None => schedule.team_names(),
    };

    let mut shuffled = names.clone();
    shuffled.shuffle(rng);

    let old_to_new: HashMap<&T, &T> = names.iter().zip(shuffled.iter()).collect();
    schedule.map_teams(|team| match old_to_new.get(team) {
        Some(new) => (*new).clone(),
        None => team.clone(),
    })
}

/// Applies the randomizations selected by a [`RandomizeOptions`] to one schedule.
#[derive(Clone, Debug)]
pub struct ScheduleRandomizer<'a, T> {
    schedule: &'a Schedule<T>,
    team_names: Option<&'a [T]>,
}

impl<'a, T> ScheduleRandomizer<'a, T>
where
    T: Clone + Eq + Hash + Ord,
{
    /// Creates a randomizer for `schedule`. `team_names` is only consulted by the `teams`
    /// option; passing `None` derives the names from the schedule.
    #[inline]
    pub fn new(schedule: &'a Schedule<T>, team_names: Option<&'a [T]>) -> Self {
        Self {
            schedule,
            team_names,
        }
    }

    /// Returns a randomized copy of the schedule. The input schedule is never mutated; with
    /// every option disabled the result is an equal but distinct copy.
    pub fn randomize<R>(&self, options: &RandomizeOptions, rng: &mut R) -> Schedule<T>
    where
        R: Rng + ?Sized,
    {
        let mut schedule = self.schedule.clone();

        if options.home_away {
            schedule = shuffle_home_away(&schedule, rng);
        }
        if options.matches {
            schedule = shuffle_matches_in_rounds(&schedule, rng);
        }
        if options.rounds {
            schedule = shuffle_rounds(&schedule, rng);
        }
        if options.teams {
            schedule = shuffle_teams(&schedule, self.team_names, rng);
        }

        schedule
    }
}
