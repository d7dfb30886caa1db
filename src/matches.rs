use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::slice::Iter;
use std::vec::IntoIter;

use crate::{DateNumber, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A tournament identifier.
///
/// Permuted copies of a tournament get derived ids of the form `{id}@{permutation_index}`, see
/// [`TournamentId::with_permutation`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TournamentId(String);

impl TournamentId {
    #[inline]
    pub fn new<S>(id: S) -> Self
    where
        S: Into<String>,
    {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the id of the `index`-th permutation of this tournament.
    pub fn with_permutation(&self, index: usize) -> Self {
        Self(format!("{}@{}", self.0, index))
    }
}

impl Display for TournamentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for TournamentId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for TournamentId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The outcome of a real match from the home team's perspective.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Winner {
    Home,
    Draw,
    Away,
}

impl Winner {
    /// The single-letter label used by the raw data (`"h"`, `"d"` or `"a"`).
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "h",
            Self::Draw => "d",
            Self::Away => "a",
        }
    }

    /// Parses a raw winner label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "h" => Some(Self::Home),
            "d" => Some(Self::Draw),
            "a" => Some(Self::Away),
            _ => None,
        }
    }
}

impl Display for Winner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookmaker odds for the three outcomes of a match.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// One row of the real matches table.
///
/// `id`, `date_number`, `home` and `away` form the composite key; everything else is an
/// outcome column that travels with the row unchanged through a permutation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchRecord {
    pub id: TournamentId,
    pub date_number: DateNumber,
    pub home: String,
    pub away: String,
    pub winner: Winner,
    /// Raw result string, e.g. `"2:1"`.
    pub result: Option<String>,
    /// Raw match date, e.g. `"02.01.2014"`.
    pub date: Option<String>,
    pub odds: Option<MatchOdds>,
}

impl MatchRecord {
    /// Creates a record with the required columns; the optional outcome columns start empty.
    pub fn new<I, S>(id: I, date_number: DateNumber, home: S, away: S, winner: Winner) -> Self
    where
        I: Into<TournamentId>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            date_number,
            home: home.into(),
            away: away.into(),
            winner,
            result: None,
            date: None,
            odds: None,
        }
    }

    /// The non-key columns of the row, for comparing rows across a permutation.
    pub fn outcome(&self) -> (&str, &str, Winner, Option<&str>, Option<&str>) {
        (
            &self.home,
            &self.away,
            self.winner,
            self.result.as_deref(),
            self.date.as_deref(),
        )
    }
}

/// The real matches table: one [`MatchRecord`] per match, sorted by `(id, date number)`.
///
/// Construction validates the precondition the whole permutation scheme relies on: within one
/// tournament, the same `(home, away)` pairing must not occur twice on one date number. The
/// flipped pairing on the same date number is fine.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Matches {
    records: Vec<MatchRecord>,
}

impl Matches {
    /// Builds a table from rows in any order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMatch`] if a `(home, away)` pairing repeats within one
    /// `(id, date number)` group.
    pub fn new(mut records: Vec<MatchRecord>) -> Result<Self> {
        log::debug!("building matches table with {} rows", records.len());

        records.sort_by(|a, b| {
            (&a.id, a.date_number).cmp(&(&b.id, b.date_number))
        });

        let mut seen = HashSet::new();
        for record in &records {
            let key = (
                record.id.clone(),
                record.date_number,
                record.home.clone(),
                record.away.clone(),
            );
            if !seen.insert(key) {
                return Err(Error::DuplicateMatch {
                    id: record.id.clone(),
                    date_number: record.date_number,
                    home: record.home.clone(),
                    away: record.away.clone(),
                });
            }
        }

        Ok(Self { records })
    }

    /// Builds a table from the rows of a permutation.
    ///
    /// A permutation reassigns the date-number column positionally, so a repeated pairing may
    /// land twice on one date number. That is valid output, the duplicate check in
    /// [`Matches::new`] only guards user-supplied input.
    pub(crate) fn from_permuted(mut records: Vec<MatchRecord>) -> Self {
        records.sort_by(|a, b| {
            (&a.id, a.date_number).cmp(&(&b.id, b.date_number))
        });

        Self { records }
    }

    #[inline]
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, MatchRecord> {
        self.records.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The sorted distinct team names of each tournament.
    pub fn team_names_per_id(&self) -> BTreeMap<TournamentId, Vec<String>> {
        let mut names: BTreeMap<TournamentId, HashSet<&str>> = BTreeMap::new();
        for record in &self.records {
            let teams = names.entry(record.id.clone()).or_default();
            teams.insert(&record.home);
            teams.insert(&record.away);
        }

        names
            .into_iter()
            .map(|(id, teams)| {
                let mut teams: Vec<String> = teams.into_iter().map(str::to_owned).collect();
                teams.sort();
                (id, teams)
            })
            .collect()
    }

    /// The number of matches of each tournament.
    pub fn number_of_matches_per_id(&self) -> BTreeMap<TournamentId, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.id.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// How many times each ordered `(home, away)` pairing met, per tournament, sorted by
    /// `(id, home, away)`.
    ///
    /// Pairs that never met are absent.
    pub fn home_vs_away_count_per_id(
        &self,
    ) -> BTreeMap<TournamentId, BTreeMap<(String, String), usize>> {
        let mut counts: BTreeMap<TournamentId, BTreeMap<(String, String), usize>> =
            BTreeMap::new();
        for record in &self.records {
            *counts
                .entry(record.id.clone())
                .or_default()
                .entry((record.home.clone(), record.away.clone()))
                .or_insert(0) += 1;
        }
        counts
    }

    /// The highest number of times any single `(home, away)` pairing met, per tournament.
    ///
    /// A synthetic schedule must provide at least this many occurrences of every pair, which
    /// makes this the lower bound for the `num_schedules` sizing of a double round-robin.
    pub fn max_pair_count_per_id(&self) -> BTreeMap<TournamentId, usize> {
        self.home_vs_away_count_per_id()
            .into_iter()
            .map(|(id, counts)| {
                let max = counts.values().copied().max().unwrap_or(0);
                (id, max)
            })
            .collect()
    }

    /// The observed frequency of home win, draw and away win per tournament, usable as
    /// outcome probabilities for simulation.
    pub fn probabilities_per_id(&self) -> BTreeMap<TournamentId, [f64; 3]> {
        let mut tallies: BTreeMap<TournamentId, (usize, [usize; 3])> = BTreeMap::new();
        for record in &self.records {
            let (total, wins) = tallies.entry(record.id.clone()).or_default();
            *total += 1;
            match record.winner {
                Winner::Home => wins[0] += 1,
                Winner::Draw => wins[1] += 1,
                Winner::Away => wins[2] += 1,
            }
        }

        tallies
            .into_iter()
            .map(|(id, (total, wins))| {
                let probabilities = wins.map(|count| count as f64 / total as f64);
                (id, probabilities)
            })
            .collect()
    }

    /// `(id, date number, home, away, winner label)` tuples for all matches, in table order.
    ///
    /// The winner travels as its raw label so downstream consumers that tolerate unmappable
    /// labels (see [`PointsPerMatch`]) can decide what to do with them.
    ///
    /// [`PointsPerMatch`]: crate::PointsPerMatch
    pub fn home_away_winner(&self) -> Vec<(TournamentId, DateNumber, &str, &str, &str)> {
        self.records
            .iter()
            .map(|record| {
                (
                    record.id.clone(),
                    record.date_number,
                    record.home.as_str(),
                    record.away.as_str(),
                    record.winner.as_str(),
                )
            })
            .collect()
    }
}

impl IntoIterator for Matches {
    type Item = MatchRecord;
    type IntoIter = IntoIter<MatchRecord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Matches {
    type Item = &'a MatchRecord;
    type IntoIter = Iter<'a, MatchRecord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{MatchRecord, Matches, TournamentId, Winner};

    fn record(
        id: &str,
        date_number: i64,
        home: &str,
        away: &str,
        winner: Winner,
    ) -> MatchRecord {
        MatchRecord::new(id, date_number, home, away, winner)
    }

    fn sample_matches() -> Matches {
        Matches::new(vec![
            record("t1", 1, "B", "A", Winner::Away),
            record("t1", 0, "A", "B", Winner::Home),
            record("t1", 0, "C", "D", Winner::Draw),
            record("t1", 2, "A", "B", Winner::Home),
            record("t0", 0, "x", "y", Winner::Home),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_sorts_by_id_and_date_number() {
        let matches = sample_matches();

        let keys: Vec<_> = matches
            .iter()
            .map(|r| (r.id.as_str().to_owned(), r.date_number))
            .collect();
        assert_eq!(
            keys,
            [
                ("t0".to_owned(), 0),
                ("t1".to_owned(), 0),
                ("t1".to_owned(), 0),
                ("t1".to_owned(), 1),
                ("t1".to_owned(), 2),
            ]
        );
    }

    #[test]
    fn test_new_rejects_duplicate_pair_in_date_number() {
        let result = Matches::new(vec![
            record("t1", 0, "A", "B", Winner::Home),
            record("t1", 0, "A", "B", Winner::Away),
        ]);

        assert_eq!(
            result.unwrap_err(),
            Error::DuplicateMatch {
                id: TournamentId::new("t1"),
                date_number: 0,
                home: "A".to_owned(),
                away: "B".to_owned(),
            }
        );
    }

    #[test]
    fn test_flipped_pair_on_same_date_number_is_valid() {
        let result = Matches::new(vec![
            record("t1", 0, "A", "B", Winner::Home),
            record("t1", 0, "B", "A", Winner::Home),
        ]);

        assert!(result.is_ok());
    }

    #[test]
    fn test_team_names_per_id() {
        let names = sample_matches().team_names_per_id();

        assert_eq!(names[&TournamentId::new("t1")], ["A", "B", "C", "D"]);
        assert_eq!(names[&TournamentId::new("t0")], ["x", "y"]);
    }

    #[test]
    fn test_number_of_matches_per_id() {
        let counts = sample_matches().number_of_matches_per_id();

        assert_eq!(counts[&TournamentId::new("t1")], 4);
        assert_eq!(counts[&TournamentId::new("t0")], 1);
    }

    #[test]
    fn test_home_vs_away_count_is_sorted_and_omits_absent_pairs() {
        let counts = sample_matches().home_vs_away_count_per_id();
        let t1 = &counts[&TournamentId::new("t1")];

        let pairs: Vec<_> = t1.keys().cloned().collect();
        assert_eq!(
            pairs,
            [
                ("A".to_owned(), "B".to_owned()),
                ("B".to_owned(), "A".to_owned()),
                ("C".to_owned(), "D".to_owned()),
            ]
        );
        assert_eq!(t1[&("A".to_owned(), "B".to_owned())], 2);
        assert!(!t1.contains_key(&("D".to_owned(), "C".to_owned())));
    }

    #[test]
    fn test_max_pair_count_per_id() {
        let max = sample_matches().max_pair_count_per_id();

        assert_eq!(max[&TournamentId::new("t1")], 2);
        assert_eq!(max[&TournamentId::new("t0")], 1);
    }

    #[test]
    fn test_probabilities_per_id() {
        let probabilities = sample_matches().probabilities_per_id();

        assert_eq!(
            probabilities[&TournamentId::new("t1")],
            [0.5, 0.25, 0.25]
        );
        assert_eq!(probabilities[&TournamentId::new("t0")], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_with_permutation_id() {
        let id = TournamentId::new("t1");

        assert_eq!(id.with_permutation(0), TournamentId::new("t1@0"));
        assert_eq!(id.with_permutation(12), TournamentId::new("t1@12"));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use serde_test::{assert_tokens, Token};

        use super::TournamentId;

        #[test]
        fn test_tournament_id_is_transparent() {
            let id = TournamentId::new("t1");

            assert_tokens(&id, &[Token::Str("t1")]);
        }
    }
}
