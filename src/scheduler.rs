use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug, Formatter};

use rand::{Rng, RngCore};

use crate::randomize::RandomizeOptions;
use crate::round_robin::{DoubleRoundRobin, SecondPortion};
use crate::{Error, Matches, Result, Schedule, TournamentId};

/// The inputs a scheduling function gets for one tournament.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TournamentParams {
    pub team_names: Vec<String>,
    /// How many times the base schedule is repeated. Must equal the tournament's maximum
    /// same-pair repeat count for the reconciliation in [`OrderedIndex`] to drain every date
    /// number list exactly.
    ///
    /// [`OrderedIndex`]: crate::OrderedIndex
    pub num_schedules: usize,
}

/// A boxed per-tournament scheduling function.
pub type ScheduleFn = Box<dyn Fn(&TournamentParams, &mut dyn RngCore) -> Schedule<String>>;

/// Where the scheduling function of each tournament comes from: one function for every id, or
/// an explicit per-id mapping.
pub enum ScheduleSource {
    Uniform(ScheduleFn),
    PerId(HashMap<TournamentId, ScheduleFn>),
}

impl ScheduleSource {
    /// The default source: a randomized double round-robin per tournament, second portion
    /// mirroring the first so each repetition looks like a real two-legged competition.
    pub fn double_round_robin() -> Self {
        Self::Uniform(Box::new(|params, rng| {
            DoubleRoundRobin::from_team_names(params.team_names.clone()).get_full_schedule(
                params.num_schedules,
                &RandomizeOptions::all(),
                &SecondPortion::Flipped,
                rng,
            )
        }))
    }

    fn resolve(&self, id: &TournamentId) -> Result<&ScheduleFn> {
        match self {
            Self::Uniform(func) => Ok(func),
            Self::PerId(funcs) => funcs
                .get(id)
                .ok_or_else(|| Error::MissingScheduleSource(id.clone())),
        }
    }
}

impl Debug for ScheduleSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(_) => f.write_str("ScheduleSource::Uniform"),
            Self::PerId(funcs) => write!(f, "ScheduleSource::PerId({} ids)", funcs.len()),
        }
    }
}

/// One synthetic schedule per tournament id, in sorted id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TournamentSchedule {
    schedules: BTreeMap<TournamentId, Schedule<String>>,
}

impl TournamentSchedule {
    #[inline]
    pub fn get(&self, id: &TournamentId) -> Option<&Schedule<String>> {
        self.schedules.get(id)
    }

    /// Iterates over tournaments in sorted id order.
    pub fn iter(&self) -> impl Iterator<Item = (&TournamentId, &Schedule<String>)> {
        self.schedules.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

impl FromIterator<(TournamentId, Schedule<String>)> for TournamentSchedule {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (TournamentId, Schedule<String>)>,
    {
        let schedules = iter.into_iter().collect();

        Self { schedules }
    }
}

/// Drives schedule generation per tournament id: pairs each id's parameters with its
/// scheduling function and executes them.
///
/// The scheduler itself never sizes anything; [`TournamentScheduler::from_matches`] is the
/// composition that sizes `num_schedules` from the real data.
#[derive(Debug)]
pub struct TournamentScheduler {
    source: ScheduleSource,
    id_to_params: BTreeMap<TournamentId, TournamentParams>,
}

impl TournamentScheduler {
    pub fn new(
        source: ScheduleSource,
        id_to_params: BTreeMap<TournamentId, TournamentParams>,
    ) -> Self {
        Self {
            source,
            id_to_params,
        }
    }

    /// The standard composition: one double round-robin source per tournament in `matches`,
    /// with `num_schedules` sized to the tournament's maximum same-pair repeat count.
    pub fn from_matches(matches: &Matches) -> Self {
        let max_pair_counts = matches.max_pair_count_per_id();

        let id_to_params = matches
            .team_names_per_id()
            .into_iter()
            .map(|(id, team_names)| {
                let num_schedules = max_pair_counts.get(&id).copied().unwrap_or(0);
                (
                    id,
                    TournamentParams {
                        team_names,
                        num_schedules,
                    },
                )
            })
            .collect();

        Self::new(ScheduleSource::double_round_robin(), id_to_params)
    }

    #[inline]
    pub fn id_to_params(&self) -> &BTreeMap<TournamentId, TournamentParams> {
        &self.id_to_params
    }

    /// Generates one synthetic schedule per tournament, in sorted id order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingScheduleSource`] if a per-id source lacks a function for one of
    /// the configured tournaments.
    pub fn generate_schedule<R>(&self, rng: &mut R) -> Result<TournamentSchedule>
    where
        R: Rng,
    {
        log::info!(
            "generating synthetic schedules for {} tournaments",
            self.id_to_params.len()
        );

        self.id_to_params
            .iter()
            .map(|(id, params)| {
                let func = self.source.resolve(id)?;
                Ok((id.clone(), func(params, rng)))
            })
            .collect()
    }
}
