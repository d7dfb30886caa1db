use rand::Rng;

use crate::ordered_index::OrderedIndex;
use crate::permute::PermuteMatches;
use crate::scheduler::TournamentScheduler;
use crate::{DateNumber, MatchDateNumbers, Matches, Result};

/// Creates permuted copies of a real matches table.
///
/// Each permutation attempt builds a fresh shuffled date-number index and a fresh randomized
/// synthetic schedule, reconciles them into an [`OrderedIndex`] and re-indexes the table
/// through it. Attempts are independent; nothing is shared or mutated between them beyond the
/// RNG state.
#[derive(Debug)]
pub struct MatchesPermutations<'a> {
    matches: &'a Matches,
    scheduler: TournamentScheduler,
    date_numbers: MatchDateNumbers,
}

impl<'a> MatchesPermutations<'a> {
    /// Pairs a matches table with a scheduler whose schedules must contain at least all real
    /// matches of every tournament.
    pub fn new(matches: &'a Matches, scheduler: TournamentScheduler) -> Self {
        let date_numbers = MatchDateNumbers::from_matches(matches);

        Self {
            matches,
            scheduler,
            date_numbers,
        }
    }

    /// The standard composition: a double round-robin scheduler sized from the table itself.
    pub fn from_matches(matches: &'a Matches) -> Self {
        Self::new(matches, TournamentScheduler::from_matches(matches))
    }

    /// Creates one permutation of all tournaments, without renaming ids.
    pub fn create_one_permutation<R>(
        &self,
        date_numbers: Option<&[DateNumber]>,
        rng: &mut R,
    ) -> Result<Matches>
    where
        R: Rng,
    {
        let shuffled = self.date_numbers.create_shuffled_copy(rng);
        let schedule = self.scheduler.generate_schedule(rng)?;

        let index = OrderedIndex::from_schedule_and_date_numbers(&schedule, shuffled)?;
        PermuteMatches::new(self.matches).permute(&index, date_numbers)
    }

    /// Creates `n` permutations of all tournaments, concatenated into one table.
    ///
    /// The `i`-th permutation of tournament `{id}` gets the id `{id}@{i}`, so rows of
    /// different attempts never collide. With `date_numbers = None` every permutation keeps
    /// the original date-number axis; a supplied axis is applied to each permutation in turn.
    pub fn create_n_permutations<R>(
        &self,
        n: usize,
        date_numbers: Option<&[DateNumber]>,
        rng: &mut R,
    ) -> Result<Matches>
    where
        R: Rng,
    {
        log::info!("creating {} permutations of {} matches", n, self.matches.len());

        let mut records = Vec::with_capacity(n * self.matches.len());

        for i in 0..n {
            let permuted = self.create_one_permutation(date_numbers, rng)?;

            records.extend(permuted.into_iter().map(|mut record| {
                record.id = record.id.with_permutation(i);
                record
            }));
        }

        Ok(Matches::from_permuted(records))
    }
}
