use std::slice::Iter;
use std::vec::IntoIter;

use crate::scheduler::TournamentSchedule;
use crate::{
    DateNumber, Error, MatchDateNumbers, Result, TournamentId, PADDING_DATE_NUMBER,
};

/// The composite key of one real match in its permuted position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub id: TournamentId,
    pub date_number: DateNumber,
    pub home: String,
    pub away: String,
}

/// The reconciliation of synthetic schedules against the real data: a flat list with one
/// [`MatchKey`] per real match, ordered by synthetic-round position.
///
/// The relative order of entries across different `(home, away)` pairs reflects synthetic
/// round order, not original match order; that reordering is the actual permutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedIndex {
    keys: Vec<MatchKey>,
}

impl OrderedIndex {
    /// Walks every tournament's synthetic rounds in order and maps each synthetic occurrence
    /// of a real `(home, away)` pair to one of the pair's real date numbers.
    ///
    /// Synthetic matches whose pair never occurs in the real data are skipped: the synthetic
    /// schedule is allowed to be a superset of the real matches. A consumed padding entry is
    /// also skipped; that slot only existed to size the schedule. Tournaments are processed in
    /// sorted id order, so a seeded schedule and a seeded shuffle fully determine the output.
    ///
    /// `date_numbers` should be a freshly shuffled copy; it is consumed by the walk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScheduleExhausted`] if the synthetic schedule contains more
    /// occurrences of a pair than its list holds, and [`Error::ScheduleTooShort`] if the walk
    /// ends with unconsumed real date numbers. Either way the synthetic schedule was sized
    /// wrongly, which is a contract violation of the caller composing the two inputs.
    pub fn from_schedule_and_date_numbers(
        schedule: &TournamentSchedule,
        mut date_numbers: MatchDateNumbers,
    ) -> Result<Self> {
        let mut keys = Vec::new();

        for (id, rounds) in schedule.iter() {
            let Some(mut pairs) = date_numbers.take(id) else {
                continue;
            };

            for round in rounds {
                for synthetic in round {
                    let key = (synthetic.home.clone(), synthetic.away.clone());
                    let Some(list) = pairs.get_mut(&key) else {
                        continue;
                    };

                    let date_number = list.pop().ok_or_else(|| Error::ScheduleExhausted {
                        id: id.clone(),
                        home: synthetic.home.clone(),
                        away: synthetic.away.clone(),
                    })?;

                    if date_number == PADDING_DATE_NUMBER {
                        continue;
                    }

                    keys.push(MatchKey {
                        id: id.clone(),
                        date_number,
                        home: synthetic.home.clone(),
                        away: synthetic.away.clone(),
                    });
                }
            }

            let remaining: usize = pairs
                .values()
                .map(|list| {
                    list.iter()
                        .filter(|date_number| **date_number != PADDING_DATE_NUMBER)
                        .count()
                })
                .sum();
            if remaining > 0 {
                return Err(Error::ScheduleTooShort {
                    id: id.clone(),
                    remaining,
                });
            }
        }

        log::debug!("built ordered index with {} match keys", keys.len());

        Ok(Self { keys })
    }

    #[inline]
    pub fn keys(&self) -> &[MatchKey] {
        &self.keys
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, MatchKey> {
        self.keys.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Vec<MatchKey>> for OrderedIndex {
    #[inline]
    fn from(keys: Vec<MatchKey>) -> Self {
        Self { keys }
    }
}

impl FromIterator<MatchKey> for OrderedIndex {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = MatchKey>,
    {
        let keys = iter.into_iter().collect();

        Self { keys }
    }
}

impl IntoIterator for OrderedIndex {
    type Item = MatchKey;
    type IntoIter = IntoIter<MatchKey>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a OrderedIndex {
    type Item = &'a MatchKey;
    type IntoIter = Iter<'a, MatchKey>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
