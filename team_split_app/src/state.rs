use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use team_split_engine::{
    default_category_title, normalize_count, AllocationMode, AllocationSettings, RawCategory, Team,
};

use crate::config::Config;

pub const STATE_VERSION: u32 = 2;

/// Largest category id accepted from stored state. Older payloads were written
/// by a JavaScript editor, so ids beyond its safe integer range are not real.
pub const MAX_CATEGORY_ID: u64 = (1 << 53) - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryState {
    pub id: u64,
    pub title: String,
    pub text: String,
}

impl CategoryState {
    pub fn new(id: u64, index: usize, text: &str) -> Self {
        CategoryState {
            id,
            title: default_category_title(index),
            text: text.to_string(),
        }
    }
}

impl From<&CategoryState> for RawCategory {
    fn from(category: &CategoryState) -> Self {
        RawCategory {
            id: Some(category.id),
            title: Some(category.title.clone()),
            text: Some(category.text.clone()),
        }
    }
}

/// Everything the editor needs to come back to where it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub categories: Vec<CategoryState>,
    pub next_category_id: u64,
    pub mode: AllocationMode,
    pub team_count: usize,
    pub team_size: usize,
    pub remove_duplicates: bool,
    pub groups: Vec<Team>,
    pub tooltip_dismissed: bool,
}

impl PersistedState {
    pub fn default_with(config: &Config) -> Self {
        let settings = &config.default_settings;
        PersistedState {
            version: STATE_VERSION,
            categories: vec![CategoryState::new(1, 0, &config.default_names.join("\n"))],
            next_category_id: 2,
            mode: settings.mode,
            team_count: normalize_count(settings.team_count),
            team_size: normalize_count(settings.team_size),
            remove_duplicates: settings.remove_duplicates,
            groups: vec![],
            tooltip_dismissed: false,
        }
    }

    pub fn settings(&self) -> AllocationSettings {
        AllocationSettings {
            mode: self.mode,
            team_count: i64::try_from(self.team_count).unwrap_or(i64::MAX),
            team_size: i64::try_from(self.team_size).unwrap_or(i64::MAX),
            remove_duplicates: self.remove_duplicates,
        }
    }

    pub fn raw_categories(&self) -> Vec<RawCategory> {
        self.categories.iter().map(RawCategory::from).collect()
    }

    /// Makes the category list usable: never empty, titles filled in and the
    /// id counter ahead of every id in use.
    pub fn normalize_categories(&mut self) {
        if self.categories.is_empty() {
            self.categories = vec![CategoryState::new(1, 0, "")];
        }
        for (index, category) in self.categories.iter_mut().enumerate() {
            if category.title.trim().is_empty() {
                category.title = default_category_title(index);
            }
        }
        let max_id = self.categories.iter().map(|c| c.id).max().unwrap_or(0);
        self.next_category_id = self.next_category_id.max(max_id.saturating_add(1)).max(2);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut payload = self.clone();
        payload.version = STATE_VERSION;
        payload.team_count = payload.team_count.max(1);
        payload.team_size = payload.team_size.max(1);
        payload.groups = sanitize_groups(&serde_json::to_value(&self.groups)?);
        payload.normalize_categories();
        serde_json::to_string(&payload)
    }
}

/// Mirrors JavaScript truthiness, which is how older payloads were written.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn finite_count(value: Option<&Value>) -> Option<usize> {
    let number = value?.as_f64()?;
    if number.is_finite() {
        Some(normalize_count(number.trunc() as i64))
    } else {
        None
    }
}

fn stored_id(value: Option<&Value>) -> Option<u64> {
    value?.as_u64().filter(|id| *id <= MAX_CATEGORY_ID)
}

/// Renders a number the way the editor's `String(number)` did: integral
/// values without a fraction.
fn number_name(number: &serde_json::Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e21 => format!("{:.0}", value),
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

/// Falsy values (`0`, `false`, `null`, `""`) become empty names, as they did in
/// the editor. Nested arrays and objects are dropped.
fn group_member_name(value: &Value) -> String {
    match value {
        _ if !truthy(value) => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_name(n),
        Value::Bool(_) => "true".to_string(),
        _ => String::new(),
    }
}

/// Keeps only well formed groups: arrays of non-empty names.
pub fn sanitize_groups(value: &Value) -> Vec<Team> {
    let Some(groups) = value.as_array() else {
        return vec![];
    };

    groups
        .iter()
        .filter_map(Value::as_array)
        .map(|group| {
            group
                .iter()
                .map(group_member_name)
                .filter(|name| !name.is_empty())
                .collect_vec()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

fn parse_categories_value(value: &Value) -> Vec<CategoryState> {
    value
        .as_array()
        .map(|categories| {
            categories
                .iter()
                .enumerate()
                .map(|(index, category)| {
                    let title = category
                        .get("title")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|title| !title.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| default_category_title(index));
                    CategoryState {
                        id: stored_id(category.get("id")).unwrap_or(index as u64 + 1),
                        title,
                        text: category
                            .get("text")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string(),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Restores state from a stored blob. Missing, unreadable or partially broken
/// blobs never fail: every field that cannot be read falls back to its
/// default. Version 1 blobs kept a single `namesText`; it becomes the first
/// category.
pub fn parse_stored_state(raw: Option<&str>, config: &Config) -> PersistedState {
    let defaults = PersistedState::default_with(config);
    let Some(raw) = raw else {
        return defaults;
    };

    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(parsed @ Value::Object(_)) => parsed,
        Ok(_) => {
            warn!("Stored state is not an object, using defaults");
            return defaults;
        }
        Err(e) => {
            warn!("Failed to parse stored state, using defaults: {}", e);
            return defaults;
        }
    };

    let categories = match (parsed.get("categories"), parsed.get("namesText")) {
        (Some(categories), _) => parse_categories_value(categories),
        (None, Some(Value::String(names_text))) => {
            info!("Migrating version 1 state to categories");
            vec![CategoryState::new(1, 0, names_text)]
        }
        (None, _) => defaults.categories.clone(),
    };

    let mut state = PersistedState {
        version: STATE_VERSION,
        categories,
        next_category_id: stored_id(parsed.get("nextCategoryId"))
            .unwrap_or(defaults.next_category_id),
        mode: parsed
            .get("mode")
            .and_then(Value::as_str)
            .map(AllocationMode::from_lenient)
            .unwrap_or(AllocationMode::TeamCount),
        team_count: finite_count(parsed.get("teamCount")).unwrap_or(defaults.team_count),
        team_size: finite_count(parsed.get("teamSize")).unwrap_or(defaults.team_size),
        remove_duplicates: parsed.get("removeDuplicates").map(truthy).unwrap_or(false),
        groups: parsed.get("groups").map(sanitize_groups).unwrap_or_default(),
        tooltip_dismissed: parsed.get("tooltipDismissed").map(truthy).unwrap_or(false),
    };
    state.normalize_categories();
    state
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use team_split_engine::AllocationMode;

    use crate::config::Config;

    use super::{parse_stored_state, sanitize_groups, CategoryState, PersistedState};

    #[test]
    fn test_missing_blob_is_default() {
        let config = Config::default();
        let state = parse_stored_state(None, &config);
        assert_eq!(state, PersistedState::default_with(&config));
        assert_eq!(state.categories[0].title, "Category 1");
        assert_eq!(state.categories[0].text.lines().count(), 16);
        assert_eq!(state.team_count, 4);
        assert_eq!(state.team_size, 2);
    }

    #[test]
    fn test_garbage_blob_is_default() {
        let config = Config::default();
        assert_eq!(parse_stored_state(Some("{not json"), &config), PersistedState::default_with(&config));
        assert_eq!(parse_stored_state(Some("[1, 2]"), &config), PersistedState::default_with(&config));
    }

    #[test]
    fn test_version_one_names_become_a_category() {
        let raw = json!({
            "version": 1,
            "namesText": "Ann\nBen",
            "mode": "team-size",
            "teamCount": 3,
            "teamSize": 5,
            "removeDuplicates": true,
            "groups": [["Ann"], ["Ben"]],
            "tooltipDismissed": true
        })
        .to_string();
        let state = parse_stored_state(Some(&raw), &Config::default());
        assert_eq!(state.version, 2);
        assert_eq!(state.categories, vec![CategoryState::new(1, 0, "Ann\nBen")]);
        assert_eq!(state.next_category_id, 2);
        assert_eq!(state.mode, AllocationMode::TeamSize);
        assert_eq!((state.team_count, state.team_size), (3, 5));
        assert!(state.remove_duplicates);
        assert!(state.tooltip_dismissed);
        assert_eq!(state.groups, vec![vec!["Ann"], vec!["Ben"]]);
    }

    #[test]
    fn test_fields_are_coerced() {
        let raw = json!({
            "categories": [
                {"id": 5, "title": "  ", "text": "a"},
                {"title": "Keep", "text": 12},
                "junk"
            ],
            "nextCategoryId": 3,
            "mode": "sideways",
            "teamCount": "many",
            "teamSize": -4,
            "removeDuplicates": 1
        })
        .to_string();
        let state = parse_stored_state(Some(&raw), &Config::default());
        assert_eq!(state.categories.len(), 3);
        assert_eq!(state.categories[0].title, "Category 1");
        assert_eq!((state.categories[1].id, state.categories[1].title.as_str()), (2, "Keep"));
        assert_eq!(state.categories[1].text, "");
        assert_eq!(state.categories[2].id, 3);
        assert_eq!(state.next_category_id, 6);
        assert_eq!(state.mode, AllocationMode::TeamCount);
        assert_eq!(state.team_count, 4);
        assert_eq!(state.team_size, 1);
        assert!(state.remove_duplicates);
    }

    #[test]
    fn test_oversized_ids_fall_back_to_position() {
        let raw = json!({
            "categories": [
                {"id": u64::MAX, "title": "A", "text": "x"},
                {"id": 9_007_199_254_740_992u64, "title": "B", "text": "y"}
            ],
            "nextCategoryId": u64::MAX
        })
        .to_string();
        let state = parse_stored_state(Some(&raw), &Config::default());
        assert_eq!(state.categories.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(state.next_category_id, 3);
    }

    #[test]
    fn test_normalize_saturates_at_largest_id() {
        let mut state = PersistedState::default_with(&Config::default());
        state.categories[0].id = u64::MAX;
        state.normalize_categories();
        assert_eq!(state.next_category_id, u64::MAX);
    }

    #[test]
    fn test_empty_categories_get_a_fallback() {
        let state = parse_stored_state(Some(r#"{"categories": []}"#), &Config::default());
        assert_eq!(state.categories, vec![CategoryState::new(1, 0, "")]);
        assert_eq!(state.next_category_id, 2);
    }

    #[test]
    fn test_sanitize_groups() {
        let groups = sanitize_groups(&json!([["  Ann ", "", null, 7], "loose", [], [false, " "], ["Ben"]]));
        assert_eq!(groups, vec![vec!["Ann", "7"], vec!["Ben"]]);

        let groups = sanitize_groups(&json!([[0, 7.0, 2.5, -0.0, true, {"a": 1}]]));
        assert_eq!(groups, vec![vec!["7", "2.5", "true"]]);
        assert!(sanitize_groups(&json!({"a": 1})).is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default();
        let mut state = PersistedState::default_with(&config);
        state.groups = vec![vec!["Bruce".into(), " ".into()], vec![]];
        state.tooltip_dismissed = true;

        let json = state.to_json().unwrap();
        let restored = parse_stored_state(Some(&json), &config);
        assert_eq!(restored.groups, vec![vec!["Bruce"]]);
        assert_eq!(restored.categories, state.categories);
        assert!(restored.tooltip_dismissed);
        assert!(json.contains("\"nextCategoryId\":2"));
        assert!(json.contains("\"mode\":\"team-count\""));
    }
}
