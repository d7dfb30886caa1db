use std::collections::BTreeMap;
use std::slice::Iter;
use std::vec::IntoIter;

use crate::{DateNumber, Matches, TournamentId, Winner};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Points gained by the home and away team for each outcome: a home win is `(3, 0)`, a draw
/// `(1, 1)` and an away win `(0, 3)`.
pub const RESULT_TO_POINTS: [(&str, (u32, u32)); 3] = [("h", (3, 0)), ("d", (1, 1)), ("a", (0, 3))];

fn points_for_label(label: &str) -> Option<(u32, u32)> {
    RESULT_TO_POINTS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, points)| *points)
}

/// Points one team gained in one match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointsRecord {
    pub id: TournamentId,
    pub date_number: DateNumber,
    pub team: String,
    pub points: u32,
}

/// Points each team gained in each match they played in.
///
/// Every match becomes two consecutive rows, the home team's first. Rows are sorted by
/// `(id, date number)` with that per-match order preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PointsPerMatch {
    records: Vec<PointsRecord>,
}

impl PointsPerMatch {
    /// Converts `(id, date number, home, away, winner)` tuples into two rows per match.
    ///
    /// Matches whose winner label has no point mapping are logged and skipped. This is the
    /// only place where bad rows are tolerated instead of rejected; raw winner labels come
    /// straight from scraped data.
    pub fn from_home_away_winner(
        home_away_winner: &[(TournamentId, DateNumber, &str, &str, &str)],
    ) -> Self {
        log::debug!(
            "converting {} matches to points per match",
            home_away_winner.len()
        );

        let mut records = Vec::with_capacity(2 * home_away_winner.len());

        for (id, date_number, home, away, winner) in home_away_winner {
            let Some((home_points, away_points)) = points_for_label(winner) else {
                log::warn!(
                    "invalid winner label {winner:?} for {id} on date number {date_number}"
                );
                continue;
            };

            records.push(PointsRecord {
                id: id.clone(),
                date_number: *date_number,
                team: (*home).to_owned(),
                points: home_points,
            });
            records.push(PointsRecord {
                id: id.clone(),
                date_number: *date_number,
                team: (*away).to_owned(),
                points: away_points,
            });
        }

        records.sort_by(|a, b| (&a.id, a.date_number).cmp(&(&b.id, b.date_number)));

        Self { records }
    }

    /// Shorthand for converting a whole matches table.
    pub fn from_matches(matches: &Matches) -> Self {
        Self::from_home_away_winner(&matches.home_away_winner())
    }

    #[inline]
    pub fn records(&self) -> &[PointsRecord] {
        &self.records
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, PointsRecord> {
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

    /// The sorted team names of every tournament.
    pub fn team_names_per_id(&self) -> BTreeMap<TournamentId, Vec<String>> {
        let mut names: BTreeMap<TournamentId, Vec<String>> = BTreeMap::new();
        for record in &self.records {
            let teams = names.entry(record.id.clone()).or_default();
            if !teams.contains(&record.team) {
                teams.push(record.team.clone());
            }
        }

        for teams in names.values_mut() {
            teams.sort_unstable();
        }
        names
    }

    /// The number of matches of every tournament. Each match occupies two rows.
    pub fn number_of_matches_per_id(&self) -> BTreeMap<TournamentId, usize> {
        let mut counts: BTreeMap<TournamentId, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.id.clone()).or_insert(0) += 1;
        }

        for count in counts.values_mut() {
            *count /= 2;
        }
        counts
    }

    /// Total points of every team, per tournament, sorted by `(id, team)`.
    pub fn rankings(&self) -> BTreeMap<(TournamentId, String), u32> {
        let mut totals: BTreeMap<(TournamentId, String), u32> = BTreeMap::new();
        for record in &self.records {
            *totals
                .entry((record.id.clone(), record.team.clone()))
                .or_insert(0) += record.points;
        }
        totals
    }

    /// Estimates `[P(home win), P(draw), P(away win)]` for every tournament from the observed
    /// home and away point pairs.
    pub fn probabilities_per_id(&self) -> BTreeMap<TournamentId, [f64; 3]> {
        let mut tallies: BTreeMap<TournamentId, (usize, [usize; 3])> = BTreeMap::new();

        // Even rows of an id hold home points, odd rows away points.
        for pair in self.records.chunks_exact(2) {
            let (total, outcomes) = tallies.entry(pair[0].id.clone()).or_default();
            *total += 1;
            match (pair[0].points, pair[1].points) {
                (3, 0) => outcomes[0] += 1,
                (1, 1) => outcomes[1] += 1,
                (0, 3) => outcomes[2] += 1,
                _ => {}
            }
        }

        tallies
            .into_iter()
            .map(|(id, (total, outcomes))| {
                let probabilities = outcomes.map(|count| count as f64 / total as f64);
                (id, probabilities)
            })
            .collect()
    }
}

impl From<Vec<PointsRecord>> for PointsPerMatch {
    fn from(mut records: Vec<PointsRecord>) -> Self {
        records.sort_by(|a, b| (&a.id, a.date_number).cmp(&(&b.id, b.date_number)));
        Self { records }
    }
}

impl IntoIterator for PointsPerMatch {
    type Item = PointsRecord;
    type IntoIter = IntoIter<PointsRecord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointsPerMatch {
    type Item = &'a PointsRecord;
    type IntoIter = Iter<'a, PointsRecord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Winner {
    /// The `(home, away)` point pair of this outcome.
    #[inline]
    pub const fn points(&self) -> (u32, u32) {
        match self {
            Self::Home => (3, 0),
            Self::Draw => (1, 1),
            Self::Away => (0, 3),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{MatchRecord, Matches, TournamentId, Winner};

    use super::PointsPerMatch;

    fn id(s: &str) -> TournamentId {
        TournamentId::new(s)
    }

    fn sample() -> PointsPerMatch {
        let matches = Matches::new(vec![
            MatchRecord::new("t1", 0, "A", "B", Winner::Home),
            MatchRecord::new("t1", 0, "C", "D", Winner::Draw),
            MatchRecord::new("t1", 1, "B", "A", Winner::Away),
            MatchRecord::new("t1", 1, "D", "C", Winner::Home),
            MatchRecord::new("t0", 0, "X", "Y", Winner::Away),
        ])
        .unwrap();

        PointsPerMatch::from_matches(&matches)
    }

    #[test]
    fn test_two_rows_per_match_home_first() {
        let ppm = sample();
        assert_eq!(ppm.len(), 10);

        let rows: Vec<_> = ppm
            .iter()
            .map(|r| (r.id.as_str(), r.date_number, r.team.as_str(), r.points))
            .collect();
        assert_eq!(
            rows,
            [
                ("t0", 0, "X", 0),
                ("t0", 0, "Y", 3),
                ("t1", 0, "A", 3),
                ("t1", 0, "B", 0),
                ("t1", 0, "C", 1),
                ("t1", 0, "D", 1),
                ("t1", 1, "B", 0),
                ("t1", 1, "A", 3),
                ("t1", 1, "D", 3),
                ("t1", 1, "C", 0),
            ]
        );
    }

    #[test]
    fn test_invalid_label_is_skipped() {
        let rows = [
            (id("t1"), 0, "A", "B", "h"),
            (id("t1"), 1, "B", "A", "x"),
            (id("t1"), 2, "A", "B", "d"),
        ];

        let ppm = PointsPerMatch::from_home_away_winner(&rows);

        assert_eq!(ppm.len(), 4);
        assert!(ppm.iter().all(|r| r.date_number != 1));
    }

    #[test]
    fn test_team_names_are_sorted_per_id() {
        let names = sample().team_names_per_id();

        assert_eq!(names[&id("t1")], ["A", "B", "C", "D"]);
        assert_eq!(names[&id("t0")], ["X", "Y"]);
    }

    #[test]
    fn test_number_of_matches_halves_rows() {
        let counts = sample().number_of_matches_per_id();

        assert_eq!(counts[&id("t1")], 4);
        assert_eq!(counts[&id("t0")], 1);
    }

    #[test]
    fn test_rankings_sum_points() {
        let rankings = sample().rankings();

        assert_eq!(rankings[&(id("t1"), "A".to_owned())], 6);
        assert_eq!(rankings[&(id("t1"), "B".to_owned())], 0);
        assert_eq!(rankings[&(id("t1"), "C".to_owned())], 1);
        assert_eq!(rankings[&(id("t1"), "D".to_owned())], 4);
        assert_eq!(rankings[&(id("t0"), "Y".to_owned())], 3);
    }

    #[test]
    fn test_probabilities_per_id() {
        let probabilities = sample().probabilities_per_id();

        assert_eq!(probabilities[&id("t1")], [0.5, 0.25, 0.25]);
        assert_eq!(probabilities[&id("t0")], [0.0, 0.0, 1.0]);
    }
}
