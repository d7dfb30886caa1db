use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{DateNumber, Matches, TournamentId, PADDING_DATE_NUMBER};

/// For every tournament, the date numbers each ordered `(home, away)` pairing played on.
///
/// Within one tournament every pair's list is padded with [`PADDING_DATE_NUMBER`] to the
/// length of the tournament's most frequent pairing, so a synthetic schedule sized for the
/// worst pair consumes every list exactly. Pairs that never met are absent. Different
/// tournaments may have different list lengths.
///
/// Consumption pops from the back of a list; after [`create_shuffled_copy`] that is
/// effectively a uniformly random remaining occurrence.
///
/// [`create_shuffled_copy`]: Self::create_shuffled_copy
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchDateNumbers {
    date_numbers: BTreeMap<TournamentId, BTreeMap<(String, String), Vec<DateNumber>>>,
}

impl MatchDateNumbers {
    /// Builds the index from the real matches table.
    ///
    /// Date numbers are collected in table order (ascending, since [`Matches`] is sorted) and
    /// then padded per tournament.
    pub fn from_matches(matches: &Matches) -> Self {
        log::debug!("building match date numbers for {} rows", matches.len());

        let mut date_numbers: BTreeMap<TournamentId, BTreeMap<(String, String), Vec<DateNumber>>> =
            BTreeMap::new();

        for record in matches {
            date_numbers
                .entry(record.id.clone())
                .or_default()
                .entry((record.home.clone(), record.away.clone()))
                .or_default()
                .push(record.date_number);
        }

        for pairs in date_numbers.values_mut() {
            let max_len = pairs.values().map(Vec::len).max().unwrap_or(0);
            for list in pairs.values_mut() {
                list.resize(max_len, PADDING_DATE_NUMBER);
            }
        }

        Self { date_numbers }
    }

    /// Returns a copy in which every pair's list (padding included) was independently
    /// permuted.
    ///
    /// This is what injects randomness into which round each recurrence of a real pairing
    /// lands in; it is regenerated per permutation attempt.
    pub fn create_shuffled_copy<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut copy = self.clone();
        for pairs in copy.date_numbers.values_mut() {
            for list in pairs.values_mut() {
                list.shuffle(rng);
            }
        }
        copy
    }

    /// Returns the pair lists of one tournament.
    #[inline]
    pub fn get(&self, id: &TournamentId) -> Option<&BTreeMap<(String, String), Vec<DateNumber>>> {
        self.date_numbers.get(id)
    }

    /// Removes and returns the pair lists of one tournament, for in-place consumption.
    #[inline]
    pub(crate) fn take(
        &mut self,
        id: &TournamentId,
    ) -> Option<BTreeMap<(String, String), Vec<DateNumber>>> {
        self.date_numbers.remove(id)
    }

    /// Iterates over tournaments in sorted id order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&TournamentId, &BTreeMap<(String, String), Vec<DateNumber>>)> {
        self.date_numbers.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.date_numbers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.date_numbers.is_empty()
    }
}
