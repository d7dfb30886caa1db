use crate::{Round, Schedule, TeamPair};

/// Generates a single round-robin schedule for `num_teams` integer teams using the circle
/// method.
///
/// Team 0 is pinned to position 0; every iteration pairs position `i` with position
/// `n - 1 - i` and then rotates all other positions by one slot, until the initial arrangement
/// recurs. When `num_teams` is odd a bye slot is appended and matches involving it are dropped
/// from their round.
///
/// An even `num_teams` produces `num_teams - 1` rounds, an odd one `num_teams` rounds. The
/// output is deterministic: identical input always produces the identical schedule. Zero teams
/// produce an empty schedule and a single team produces one round with no matches.
///
/// See: <https://en.wikipedia.org/wiki/Round-robin_tournament#Circle_method>
pub fn circle_method(num_teams: usize) -> Schedule<usize> {
    log::debug!("generating circle-method schedule for {} teams", num_teams);

    if num_teams == 0 {
        return Schedule::new();
    }

    // `None` is the bye slot: it occupies a position but never plays.
    let mut positions: Vec<Option<usize>> = (0..num_teams).map(Some).collect();
    if num_teams % 2 != 0 {
        positions.push(None);
    }

    let len = positions.len();
    let initial = positions.clone();
    let mut rounds = Vec::with_capacity(len - 1);

    loop {
        let mut matches = Round::with_capacity(len / 2);
        for i in 0..len / 2 {
            if let (Some(home), Some(away)) = (positions[i], positions[len - 1 - i]) {
                matches.push(TeamPair::new(home, away));
            }
        }
        rounds.push(matches);

        // Rotate every position except 0 by one slot.
        if let Some(last) = positions.pop() {
            positions.insert(1, last);
        }

        if positions == initial {
            break;
        }
    }

    rounds.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::schedule;

    use super::circle_method;

    #[test]
    fn test_degenerate_team_counts() {
        assert_eq!(circle_method(0).len(), 0);

        let one_team = circle_method(1);
        assert_eq!(one_team.len(), 1);
        assert_eq!(one_team[0].len(), 0);
    }

    #[test]
    fn test_two_teams() {
        assert_eq!(circle_method(2), schedule![[(0, 1)]]);
    }

    #[test]
    fn test_four_teams() {
        assert_eq!(
            circle_method(4),
            schedule![
                [(0, 3), (1, 2)],
                [(0, 2), (3, 1)],
                [(0, 1), (2, 3)],
            ]
        );
    }

    #[test]
    fn test_odd_team_count_has_byes() {
        let schedule = circle_method(3);

        // Odd team counts need `num_teams` rounds, one match each because of the bye.
        assert_eq!(
            schedule,
            schedule![[(1, 2)], [(0, 2)], [(0, 1)]]
        );
    }

    #[test]
    fn test_every_pair_meets_exactly_once() {
        for num_teams in 2..=14 {
            let schedule = circle_method(num_teams);

            let expected_rounds = if num_teams % 2 == 0 {
                num_teams - 1
            } else {
                num_teams
            };
            assert_eq!(schedule.len(), expected_rounds);

            let mut pairs = HashSet::new();
            for round in &schedule {
                let mut seen_this_round = HashSet::new();
                for pair in round {
                    assert!(seen_this_round.insert(pair.home));
                    assert!(seen_this_round.insert(pair.away));

                    let unordered = (pair.home.min(pair.away), pair.home.max(pair.away));
                    assert!(pairs.insert(unordered), "pair met twice: {unordered:?}");
                }
            }

            assert_eq!(pairs.len(), num_teams * (num_teams - 1) / 2);
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(circle_method(9), circle_method(9));
    }
}
