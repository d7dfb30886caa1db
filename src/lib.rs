//! # tournament-permutations
//!
//! This crate generates round-robin schedules and statistically-valid permutations of real
//! tournament schedules: given the matches that actually took place, it reassigns them to new
//! date numbers while preserving the matches themselves.
//!
//! Important types:
//! - [`Schedule`]: A sequence of [`Round`]s, each an ordered list of [`TeamPair`]s.
//! - [`SingleRoundRobin`]/[`DoubleRoundRobin`]: Synthetic round-robin schedules with pluggable
//! scheduling functions (defaulting to [`circle_method`]).
//! - [`Matches`]: The real matches table, keyed by `(id, date number, home, away)`.
//! - [`MatchDateNumbers`]: For every `(home, away)` pair, the date numbers it played on.
//! - [`OrderedIndex`]: The reconciliation of a synthetic schedule against the real data.
//! - [`MatchesPermutations`]: The driver producing `n` permuted copies of a matches table.
//! - [`PointsPerMatch`]: Points gained by each team in each match, the input to the
//! Monte-Carlo helpers in [`simulation`].
//!
//! All randomized operations take an explicit [`rand::Rng`]; seeding that generator makes every
//! permutation reproducible.
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to the data model types.
//!
pub mod randomize;
pub mod simulation;

mod circle;
mod date_numbers;
mod matches;
mod ordered_index;
mod permutations;
mod permute;
mod points;
mod round_robin;
mod scheduler;

pub use circle::circle_method;
pub use date_numbers::MatchDateNumbers;
pub use matches::{MatchOdds, MatchRecord, Matches, TournamentId, Winner};
pub use ordered_index::{MatchKey, OrderedIndex};
pub use permutations::MatchesPermutations;
pub use permute::PermuteMatches;
pub use points::{PointsPerMatch, PointsRecord};
pub use round_robin::{DoubleRoundRobin, SchedulingFn, SecondPortion, SingleRoundRobin};
pub use scheduler::{
    ScheduleFn, ScheduleSource, TournamentParams, TournamentSchedule, TournamentScheduler,
};

use thiserror::Error;

use std::collections::HashMap;
use std::hash::Hash;
use std::result;
use std::vec::IntoIter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A date number: an integer index identifying a competition round, assigned densely starting
/// at 0 in chronological order of real match dates.
pub type DateNumber = i64;

/// The reserved [`DateNumber`] marking a padding slot with no corresponding real occurrence.
pub const PADDING_DATE_NUMBER: DateNumber = -1;

/// An ordered `(home, away)` pairing of two teams.
///
/// Home/away order is significant: `(A, B)` and `(B, A)` are different pairings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TeamPair<T> {
    pub home: T,
    pub away: T,
}

impl<T> TeamPair<T> {
    #[inline]
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    /// Returns the same pairing with home and away swapped.
    #[inline]
    pub fn flipped(self) -> Self {
        Self {
            home: self.away,
            away: self.home,
        }
    }

    /// Maps `TeamPair<T>` to `TeamPair<U>` by applying `f` to both teams.
    pub fn map<U, F>(self, mut f: F) -> TeamPair<U>
    where
        F: FnMut(T) -> U,
    {
        TeamPair {
            home: f(self.home),
            away: f(self.away),
        }
    }
}

impl<T> From<(T, T)> for TeamPair<T> {
    #[inline]
    fn from((home, away): (T, T)) -> Self {
        Self { home, away }
    }
}

/// A wrapper around a `Vec<TeamPair<T>>` containing the matches of one round.
///
/// A team plays at most once per round; a round may omit a team entirely when the team count is
/// odd (a bye).
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Round<T> {
    matches: Vec<TeamPair<T>>,
}

impl<T> Round<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matches: Vec::with_capacity(capacity),
        }
    }
}

impl<T> FromIterator<TeamPair<T>> for Round<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TeamPair<T>>,
    {
        let matches = iter.into_iter().collect();

        Self { matches }
    }
}

impl<T> IntoIterator for Round<T> {
    type Item = TeamPair<T>;
    type IntoIter = IntoIter<TeamPair<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Round<T> {
    type Item = &'a TeamPair<T>;
    type IntoIter = std::slice::Iter<'a, TeamPair<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

impl<T> std::ops::Deref for Round<T> {
    type Target = Vec<TeamPair<T>>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.matches
    }
}

impl<T> std::ops::DerefMut for Round<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.matches
    }
}

impl<T> AsRef<[TeamPair<T>]> for Round<T> {
    #[inline]
    fn as_ref(&self) -> &[TeamPair<T>] {
        &self.matches
    }
}

impl<T, U> PartialEq<U> for Round<T>
where
    T: PartialEq,
    U: AsRef<[TeamPair<T>]>,
{
    #[inline]
    fn eq(&self, other: &U) -> bool {
        self.matches == other.as_ref()
    }
}

impl<T> From<Vec<TeamPair<T>>> for Round<T> {
    #[inline]
    fn from(matches: Vec<TeamPair<T>>) -> Self {
        Self { matches }
    }
}

/// A wrapper around a `Vec<Round<T>>`: an ordered sequence of rounds.
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Schedule<T> {
    rounds: Vec<Round<T>>,
}

impl<T> Schedule<T> {
    #[inline]
    pub fn new() -> Self {
        Self { rounds: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rounds: Vec::with_capacity(capacity),
        }
    }

    /// Returns an iterator over all matches of all rounds, in round order.
    pub fn matches(&self) -> impl Iterator<Item = &TeamPair<T>> {
        self.rounds.iter().flat_map(|round| round.iter())
    }

    /// Returns the total number of matches across all rounds.
    pub fn num_matches(&self) -> usize {
        self.rounds.iter().map(|round| round.len()).sum()
    }
}

impl<T> Schedule<T>
where
    T: Clone,
{
    /// Returns a new schedule where every `(home, away)` match became `(away, home)`.
    ///
    /// Round order and in-round match order are unchanged.
    pub fn flipped(&self) -> Self {
        self.rounds
            .iter()
            .map(|round| round.iter().map(|pair| pair.clone().flipped()).collect())
            .collect()
    }

    /// Returns a new schedule with the order of rounds reversed, the order of matches within
    /// each round reversed and every match flipped.
    pub fn reversed(&self) -> Self {
        self.rounds
            .iter()
            .rev()
            .map(|round| {
                round
                    .iter()
                    .rev()
                    .map(|pair| pair.clone().flipped())
                    .collect()
            })
            .collect()
    }

    /// Returns a new schedule with every team replaced by `f(team)`.
    ///
    /// The relabeling is consistent for any pure `f`: every occurrence of a team maps to the
    /// same new value.
    pub fn map_teams<U, F>(&self, mut f: F) -> Schedule<U>
    where
        F: FnMut(&T) -> U,
    {
        self.rounds
            .iter()
            .map(|round| {
                round
                    .iter()
                    .map(|pair| TeamPair::new(f(&pair.home), f(&pair.away)))
                    .collect()
            })
            .collect()
    }
}

impl<T> Schedule<T>
where
    T: Clone + Ord,
{
    /// Returns the sorted distinct teams appearing anywhere in the schedule.
    pub fn team_names(&self) -> Vec<T> {
        let mut names: Vec<T> = self
            .matches()
            .flat_map(|pair| [&pair.home, &pair.away])
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Schedule<usize> {
    /// Replaces integer team `i` by `names[i]` throughout the schedule.
    pub fn rename_teams<N>(&self, names: &[N]) -> Schedule<N>
    where
        N: Clone,
    {
        self.map_teams(|team| names[*team].clone())
    }
}

impl<T> FromIterator<Round<T>> for Schedule<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Round<T>>,
    {
        let rounds = iter.into_iter().collect();

        Self { rounds }
    }
}

impl<T> Extend<Round<T>> for Schedule<T> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Round<T>>,
    {
        self.rounds.extend(iter);
    }
}

impl<T> IntoIterator for Schedule<T> {
    type Item = Round<T>;
    type IntoIter = IntoIter<Round<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.rounds.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Schedule<T> {
    type Item = &'a Round<T>;
    type IntoIter = std::slice::Iter<'a, Round<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.rounds.iter()
    }
}

impl<T> std::ops::Deref for Schedule<T> {
    type Target = Vec<Round<T>>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.rounds
    }
}

impl<T> std::ops::DerefMut for Schedule<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rounds
    }
}

impl<T> AsRef<[Round<T>]> for Schedule<T> {
    #[inline]
    fn as_ref(&self) -> &[Round<T>] {
        &self.rounds
    }
}

impl<T, U> PartialEq<U> for Schedule<T>
where
    T: PartialEq,
    U: AsRef<[Round<T>]>,
{
    #[inline]
    fn eq(&self, other: &U) -> bool {
        self.rounds == other.as_ref()
    }
}

impl<T> From<Vec<Round<T>>> for Schedule<T> {
    #[inline]
    fn from(rounds: Vec<Round<T>>) -> Self {
        Self { rounds }
    }
}

/// Counts how many times each match occurs in the schedule.
///
/// Useful for asserting that two schedules contain the same multiset of matches.
pub fn match_counts<T>(schedule: &Schedule<T>) -> HashMap<TeamPair<T>, usize>
where
    T: Clone + Eq + Hash,
{
    let mut counts = HashMap::new();
    for pair in schedule.matches() {
        *counts.entry(pair.clone()).or_insert(0) += 1;
    }
    counts
}

/// An `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The synthetic schedule contains more occurrences of a pair than the real data has date
    /// numbers for. Sizing the schedule is the caller's responsibility.
    #[error("schedule exhausted for {id}: pair ({home}, {away}) has no date numbers left")]
    ScheduleExhausted {
        id: TournamentId,
        home: String,
        away: String,
    },
    /// The synthetic schedule ended before every real date number was consumed; continuing
    /// would silently drop real matches from the permutation.
    #[error("schedule too short for {id}: {remaining} real date numbers were never assigned")]
    ScheduleTooShort { id: TournamentId, remaining: usize },
    /// The ordered index references a row that does not exist in the matches table.
    #[error(
        "unknown match for {id}: ({home}, {away}) at date number {date_number} is not in the matches table"
    )]
    UnknownMatch {
        id: TournamentId,
        date_number: DateNumber,
        home: String,
        away: String,
    },
    /// The same `(home, away)` pairing occurs twice within one date number of one tournament.
    #[error("duplicate match for {id}: ({home}, {away}) occurs twice at date number {date_number}")]
    DuplicateMatch {
        id: TournamentId,
        date_number: DateNumber,
        home: String,
        away: String,
    },
    /// A caller-supplied date number axis does not cover every row exactly once.
    #[error("invalid date number axis: expected {expected} values, found {found}")]
    DateNumberCountMismatch { expected: usize, found: usize },
    /// A per-id schedule source has no function for the given tournament.
    #[error("no scheduling function for {0}")]
    MissingScheduleSource(TournamentId),
    /// Outcome probabilities that cannot form a weighted distribution.
    #[error("invalid outcome probabilities: {0}")]
    InvalidProbabilities(#[from] rand::distributions::WeightedError),
    /// A probability mapping has no entry for the given tournament.
    #[error("no outcome probabilities for {0}")]
    MissingProbabilities(TournamentId),
    /// A per-match probability list does not cover every match exactly once.
    #[error("invalid probability list: expected {expected} triples, found {found}")]
    ProbabilityCountMismatch { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::{match_counts, Schedule, TeamPair};

    #[macro_export]
    macro_rules! schedule {
        ($([$(($home:expr, $away:expr)),*$(,)?]),*$(,)?) => {
            $crate::Schedule::from(vec![
                $(
                    $crate::Round::from(vec![
                        $($crate::TeamPair::new($home, $away)),*
                    ])
                ),*
            ])
        };
    }

    #[test]
    fn test_schedule_flipped() {
        let schedule: Schedule<u32> = schedule![[(0, 3), (1, 2)], [(0, 2), (3, 1)]];

        assert_eq!(
            schedule.flipped(),
            schedule![[(3, 0), (2, 1)], [(2, 0), (1, 3)]]
        );

        // Flipping twice restores the original.
        assert_eq!(schedule.flipped().flipped(), schedule);
    }

    #[test]
    fn test_schedule_reversed() {
        let schedule: Schedule<u32> = schedule![[(0, 3), (1, 2)], [(0, 2), (3, 1)]];

        assert_eq!(
            schedule.reversed(),
            schedule![[(1, 3), (2, 0)], [(2, 1), (3, 0)]]
        );
    }

    #[test]
    fn test_schedule_team_names() {
        let schedule: Schedule<&str> = schedule![[("a", "c")], [("b", "a")]];

        assert_eq!(schedule.team_names(), ["a", "b", "c"]);
    }

    #[test]
    fn test_rename_teams() {
        let schedule: Schedule<usize> = schedule![[(0, 2), (1, 3)]];

        assert_eq!(
            schedule.rename_teams(&["A", "B", "C", "D"]),
            schedule![[("A", "C"), ("B", "D")]]
        );
    }

    #[test]
    fn test_match_counts() {
        let schedule: Schedule<u32> = schedule![[(0, 1)], [(1, 0), (0, 1)]];

        let counts = match_counts(&schedule);
        assert_eq!(counts[&TeamPair::new(0, 1)], 2);
        assert_eq!(counts[&TeamPair::new(1, 0)], 1);
    }
}
