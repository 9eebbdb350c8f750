use tracing::{debug, info};

use team_split_engine::{
    default_category_title, parse_positive_integer, AllocationMode, RandomSource, Team, TeamGenerator,
};

use crate::{
    config::Config,
    report::groups_to_plain_text,
    state::{CategoryState, PersistedState},
    storage::{load_state, save_state, StateStore, StorageError},
};

pub const NO_PARTICIPANTS_MESSAGE: &str = "Enter at least one name in any category to create teams.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Generated(Vec<Team>),
    NoParticipants,
}

impl GenerateOutcome {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            GenerateOutcome::Generated(_) => None,
            GenerateOutcome::NoParticipants => Some(NO_PARTICIPANTS_MESSAGE),
        }
    }
}

/// The editor behind the team generator: holds the current categories and
/// settings, produces teams on request and saves after every change.
pub struct TeamSplitSession<S, R> {
    config: Config,
    state: PersistedState,
    store: S,
    random: R,
}

impl<S, R> TeamSplitSession<S, R>
where
    S: StateStore,
    R: RandomSource,
{
    /// Restores the last saved state. If it holds no teams yet, a first set is
    /// generated right away.
    pub fn open(store: S, config: Config, random: R) -> Result<Self, StorageError> {
        let state = load_state(&store, &config);
        let mut session = TeamSplitSession {
            config,
            state,
            store,
            random,
        };

        if session.state.groups.is_empty() {
            session.generate_teams()?;
        }
        Ok(session)
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn groups(&self) -> &[Team] {
        &self.state.groups
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        self.state.normalize_categories();
        save_state(&mut self.store, &self.state)
    }

    fn category_mut(&mut self, id: u64) -> Option<(usize, &mut CategoryState)> {
        self.state
            .categories
            .iter_mut()
            .enumerate()
            .find(|(_, category)| category.id == id)
    }

    pub fn add_category(&mut self) -> Result<u64, StorageError> {
        let id = self.state.next_category_id;
        let next_id = id.checked_add(1).ok_or(StorageError::CategoryIdsExhausted)?;
        let category = CategoryState::new(id, self.state.categories.len(), "");
        self.state.categories.push(category);
        self.state.next_category_id = next_id;
        self.persist()?;
        Ok(id)
    }

    /// Removes a category. The first category is permanent.
    pub fn remove_category(&mut self, id: u64) -> Result<bool, StorageError> {
        match self.state.categories.iter().position(|c| c.id == id) {
            Some(index) if index > 0 => {
                self.state.categories.remove(index);
                self.persist()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn update_category_title(&mut self, id: u64, title: &str) -> Result<bool, StorageError> {
        let Some((index, category)) = self.category_mut(id) else {
            return Ok(false);
        };
        category.title = if title.is_empty() {
            default_category_title(index)
        } else {
            title.to_string()
        };
        self.persist()?;
        Ok(true)
    }

    pub fn update_category_text(&mut self, id: u64, text: &str) -> Result<bool, StorageError> {
        let Some((_, category)) = self.category_mut(id) else {
            return Ok(false);
        };
        category.text = text.to_string();
        self.persist()?;
        Ok(true)
    }

    pub fn set_mode(&mut self, mode: AllocationMode) -> Result<(), StorageError> {
        self.state.mode = mode;
        self.persist()
    }

    pub fn set_team_count(&mut self, value: &str) -> Result<(), StorageError> {
        self.state.team_count = parse_positive_integer(value);
        self.persist()
    }

    pub fn set_team_size(&mut self, value: &str) -> Result<(), StorageError> {
        self.state.team_size = parse_positive_integer(value);
        self.persist()
    }

    pub fn set_remove_duplicates(&mut self, remove_duplicates: bool) -> Result<(), StorageError> {
        self.state.remove_duplicates = remove_duplicates;
        self.persist()
    }

    pub fn dismiss_tooltip(&mut self) -> Result<(), StorageError> {
        self.state.tooltip_dismissed = true;
        self.persist()
    }

    pub fn generate_teams(&mut self) -> Result<GenerateOutcome, StorageError> {
        let generator = TeamGenerator::new(self.state.settings());
        let groups = generator.generate(&self.state.raw_categories(), &mut self.random);

        let outcome = if groups.is_empty() {
            debug!("Nothing to allocate");
            GenerateOutcome::NoParticipants
        } else {
            info!(
                "Generated {} teams in {} mode",
                groups.len(),
                self.state.mode.as_str()
            );
            GenerateOutcome::Generated(groups.clone())
        };

        self.state.groups = groups;
        self.persist()?;
        Ok(outcome)
    }

    /// Drops all edits and starts over from the configured defaults.
    pub fn reset(&mut self) -> Result<GenerateOutcome, StorageError> {
        info!("Resetting to defaults");
        self.state = PersistedState::default_with(&self.config);
        self.generate_teams()
    }

    pub fn plain_text(&self) -> String {
        groups_to_plain_text(&self.state.groups)
    }
}
