use itertools::Itertools;
use tracing::debug;

use crate::{
    allocation::{allocate_category_teams, allocate_teams, AllocationSettings, Team},
    import::{count_participants, parse_categories, parse_participants, ParseOptions, ParsedCategory, RawCategory},
    random::RandomSource,
    shuffle::fisher_yates_shuffle,
};

/// Turns raw editor input into shuffled teams in one pass.
#[derive(Debug, Clone, Default)]
pub struct TeamGenerator {
    pub settings: AllocationSettings,
}

impl TeamGenerator {
    pub fn new(settings: AllocationSettings) -> Self {
        TeamGenerator { settings }
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            remove_duplicates: self.settings.remove_duplicates,
        }
    }

    /// Parses the categories, shuffles every category's members on its own and
    /// deals them into teams. Returns no teams if nobody was entered.
    pub fn generate<R>(&self, categories: &[RawCategory], random: &mut R) -> Vec<Team>
    where
        R: RandomSource + ?Sized,
    {
        let parsed = parse_categories(categories, &self.parse_options());
        if count_participants(&parsed) == 0 {
            debug!("No participants in {} categories", categories.len());
            return vec![];
        }

        let shuffled = parsed
            .into_iter()
            .map(|category| ParsedCategory {
                members: fisher_yates_shuffle(&category.members, &mut *random),
                ..category
            })
            .collect_vec();

        allocate_category_teams(&shuffled, &self.settings, random)
    }

    /// Same as [`TeamGenerator::generate`] for a single list without categories.
    pub fn generate_flat<R>(&self, raw_text: &str, random: &mut R) -> Vec<Team>
    where
        R: RandomSource + ?Sized,
    {
        let participants = parse_participants(raw_text, &self.parse_options());
        let shuffled = fisher_yates_shuffle(&participants, random);
        allocate_teams(&shuffled, &self.settings)
    }
}
