use std::collections::HashMap;

use crate::ordered_index::OrderedIndex;
use crate::{DateNumber, Error, MatchRecord, Matches, Result};

/// Re-indexes a real matches table into the ordering given by an [`OrderedIndex`].
#[derive(Clone, Debug)]
pub struct PermuteMatches<'a> {
    matches: &'a Matches,
}

impl<'a> PermuteMatches<'a> {
    #[inline]
    pub fn new(matches: &'a Matches) -> Self {
        Self { matches }
    }

    /// Builds the permuted table: the row behind each `(id, date number, home, away)` key is
    /// looked up and emitted in index order, then the date-number axis is restored.
    ///
    /// With `date_numbers = None` the original date-number column (in table order) is
    /// reapplied row-for-row onto the new ordering: the date number becomes a label of the new
    /// row position rather than a value tied to the row's content. A supplied axis overrides
    /// the column entirely, which lays the permutation out on a custom date axis.
    ///
    /// Every input row appears exactly once in the output and all non-key columns travel with
    /// their row unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMatch`] if the index references a key that is not in the table,
    /// which means the index was built from different data, and
    /// [`Error::DateNumberCountMismatch`] if the index or a supplied axis does not cover every
    /// row exactly once.
    pub fn permute(
        &self,
        ordered_index: &OrderedIndex,
        date_numbers: Option<&[DateNumber]>,
    ) -> Result<Matches> {
        log::info!(
            "permuting {} matches through {} index keys",
            self.matches.len(),
            ordered_index.len()
        );

        if ordered_index.len() != self.matches.len() {
            return Err(Error::DateNumberCountMismatch {
                expected: self.matches.len(),
                found: ordered_index.len(),
            });
        }

        let mut rows: HashMap<_, &MatchRecord> = self
            .matches
            .iter()
            .map(|record| {
                let key = (
                    record.id.clone(),
                    record.date_number,
                    record.home.clone(),
                    record.away.clone(),
                );
                (key, record)
            })
            .collect();

        let mut permuted = Vec::with_capacity(ordered_index.len());
        for key in ordered_index {
            let row = rows
                .remove(&(
                    key.id.clone(),
                    key.date_number,
                    key.home.clone(),
                    key.away.clone(),
                ))
                .ok_or_else(|| Error::UnknownMatch {
                    id: key.id.clone(),
                    date_number: key.date_number,
                    home: key.home.clone(),
                    away: key.away.clone(),
                })?;
            permuted.push(row.clone());
        }

        // Group the new ordering by id (stable, keeping the index order within each id) so
        // the date-number reassignment below lines the id blocks up with the sorted input.
        permuted.sort_by(|a, b| a.id.cmp(&b.id));

        let new_date_numbers: Vec<DateNumber> = match date_numbers {
            Some(axis) => {
                if axis.len() != permuted.len() {
                    return Err(Error::DateNumberCountMismatch {
                        expected: permuted.len(),
                        found: axis.len(),
                    });
                }
                axis.to_vec()
            }
            // The original column in table order; both sides are grouped by id in the same
            // sorted order, so the id blocks line up row-for-row.
            None => self.matches.iter().map(|record| record.date_number).collect(),
        };

        for (record, date_number) in permuted.iter_mut().zip(new_date_numbers) {
            record.date_number = date_number;
        }

        // Positional date-number reassignment may put two occurrences of the same pairing on
        // one date number; that is valid permutation output, so skip the ingestion check.
        Ok(Matches::from_permuted(permuted))
    }
}
