use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::debug;

use crate::{import::ParsedCategory, random::RandomSource, shuffle::fisher_yates_shuffle};

use super::{empty_teams, AllocationSettings, Team};

/// Orders categories for dealing: largest member count first. Categories of
/// equal size are shuffled so no category is favoured on ties.
fn assignment_order<'a, R>(categories: &[&'a ParsedCategory], random: &mut R) -> Vec<&'a ParsedCategory>
where
    R: RandomSource + ?Sized,
{
    let mut buckets: BTreeMap<usize, Vec<&'a ParsedCategory>> = BTreeMap::new();
    for category in categories.iter().copied() {
        buckets.entry(category.members.len()).or_default().push(category);
    }

    buckets
        .into_values()
        .rev()
        .flat_map(|bucket| fisher_yates_shuffle(&bucket, &mut *random))
        .collect()
}

/// Deals the members of all categories round robin over a single cursor.
///
/// Categories are visited from largest to smallest and the cursor starts at a
/// random team, so team sizes differ by at most one and large categories are
/// spread over every team before smaller ones are placed.
pub fn allocate_category_teams<R>(
    categories: &[ParsedCategory],
    settings: &AllocationSettings,
    random: &mut R,
) -> Vec<Team>
where
    R: RandomSource + ?Sized,
{
    let categories = categories
        .iter()
        .filter(|category| !category.members.is_empty())
        .collect_vec();
    let total: usize = categories.iter().map(|c| c.members.len()).sum();
    let team_count = settings.resolve_team_count(total);
    if team_count == 0 {
        return vec![];
    }

    let ordered = assignment_order(&categories, random);
    let start = random.next_index(team_count);
    debug!(
        "Allocating {} participants from {} categories into {} teams, starting at team {}",
        total,
        ordered.len(),
        team_count,
        start
    );

    let mut teams = empty_teams(team_count);
    let members = ordered.iter().flat_map(|category| category.members.iter());
    for (offset, name) in members.enumerate() {
        teams[(start + offset) % team_count].push(name.clone());
    }
    teams
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{
        allocation::AllocationSettings,
        import::ParsedCategory,
        random::ReplayRandom,
    };

    use super::allocate_category_teams;

    fn category(id: u64, title: &str, members: &[&str]) -> ParsedCategory {
        ParsedCategory {
            id,
            title: title.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_largest_category_is_dealt_first() {
        let categories = vec![
            category(1, "B", &["b1"]),
            category(2, "A", &["a1", "a2", "a3", "a4"]),
        ];
        let mut random = ReplayRandom::constant(0.0);
        let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_count(2), &mut random);
        assert_eq!(teams, vec![vec!["a1", "a3", "b1"], vec!["a2", "a4"]]);
    }

    #[test]
    fn test_cursor_runs_across_categories() {
        let categories = vec![
            category(1, "A", &["a1", "a2", "a3"]),
            category(2, "B", &["b1", "b2"]),
        ];
        let mut random = ReplayRandom::constant(0.0);
        let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_count(2), &mut random);
        assert_eq!(teams, vec![vec!["a1", "a3", "b2"], vec!["a2", "b1"]]);
    }

    #[test]
    fn test_random_start_team() {
        let categories = vec![category(1, "A", &["a1", "a2", "a3"])];
        // One category consumes no shuffle draws, so 0.7 picks floor(0.7 * 3) = 2
        let mut random = ReplayRandom::constant(0.7);
        let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_count(3), &mut random);
        assert_eq!(teams, vec![vec!["a2"], vec!["a3"], vec!["a1"]]);
        assert_eq!(random.draws(), 1);
    }

    #[test]
    fn test_equal_sizes_are_shuffled() {
        let categories = vec![
            category(1, "A", &["a1", "a2"]),
            category(2, "B", &["b1", "b2"]),
        ];
        // The tie shuffle swaps A and B, then the start cursor is team 0
        let mut random = ReplayRandom::new(vec![0.0, 0.0]);
        let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_count(2), &mut random);
        assert_eq!(teams, vec![vec!["b1", "a1"], vec!["b2", "a2"]]);

        let mut random = ReplayRandom::new(vec![0.9, 0.0]);
        let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_count(2), &mut random);
        assert_eq!(teams, vec![vec!["a1", "b1"], vec!["a2", "b2"]]);
    }

    #[test]
    fn test_team_size_mode() {
        let categories = vec![
            category(1, "A", &["a1", "a2", "a3"]),
            category(2, "B", &["b1", "b2"]),
        ];
        let mut random = ReplayRandom::constant(0.0);
        let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_size(2), &mut random);
        assert_eq!(teams.len(), 3);
        assert!(teams.iter().all(|t| t.len() <= 2 && !t.is_empty()));
    }

    #[test]
    fn test_balanced_and_exhaustive() {
        let mut rng = StdRng::seed_from_u64(3);
        let categories = vec![
            category(1, "Pro", &["p1", "p2", "p3", "p4", "p5"]),
            category(2, "Mid", &["m1", "m2", "m3"]),
            category(3, "New", &["n1", "n2", "n3"]),
            category(4, "Empty", &[]),
        ];
        for k in 1..=11 {
            let teams = allocate_category_teams(&categories, &AllocationSettings::with_team_count(k), &mut rng);
            assert_eq!(teams.len(), k as usize);
            let sizes = teams.iter().map(|t| t.len()).collect_vec();
            assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
            assert_eq!(
                teams.concat().into_iter().sorted().collect_vec(),
                categories.iter().flat_map(|c| c.members.clone()).sorted().collect_vec()
            );
        }
    }

    #[test]
    fn test_replayed_randomness_is_deterministic() {
        let categories = (0..6)
            .map(|i| category(i, &format!("C{}", i), &["x", "y", "z"][..(i as usize % 3) + 1]))
            .collect_vec();
        let settings = AllocationSettings::with_team_count(3);
        let values = vec![0.42, 0.17, 0.93, 0.5, 0.01, 0.77];
        let first = allocate_category_teams(&categories, &settings, &mut ReplayRandom::new(values.clone()));
        let second = allocate_category_teams(&categories, &settings, &mut ReplayRandom::new(values));
        assert_eq!(first, second);
    }

    #[test]
    fn test_nothing_to_allocate() {
        let mut random = ReplayRandom::constant(0.5);
        assert!(allocate_category_teams(&[], &AllocationSettings::default(), &mut random).is_empty());
        let empty = vec![category(1, "A", &[])];
        assert!(allocate_category_teams(&empty, &AllocationSettings::default(), &mut random).is_empty());
        assert_eq!(random.draws(), 0);
    }
}
