use std::path::PathBuf;

use team_split_engine::AllocationSettings;

pub const CONFIG_ENV_VAR: &str = "TEAM_SPLIT_CONFIG";

#[derive(Debug, serde::Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub logging_config: String,
    pub state_path: Option<PathBuf>,
    pub default_settings: AllocationSettings,
    #[serde(default = "default_names")]
    pub default_names: Vec<String>,
}

fn default_names() -> Vec<String> {
    [
        "Bruce", "Richard", "Jason", "Damian", "Alfred", "Lucius", "James", "Barbara", "Selina",
        "Pamela", "Harvey", "Rachel", "Oswald", "Edward", "Jonathan", "Tim",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging_config: "info,team_split_engine=debug".into(),
            state_path: None,
            default_settings: AllocationSettings::default(),
            default_names: default_names(),
        }
    }
}

impl Config {
    pub fn from_yaml(source: &str) -> Result<Config, anyhow::Error> {
        Ok(serde_yaml::from_str::<Config>(source)?)
    }

    /// Where the file store keeps the state if no explicit path is configured.
    pub fn resolved_state_path(&self) -> Option<PathBuf> {
        match &self.state_path {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir().map(|dir| dir.join("team-split").join("state.json")),
        }
    }
}

pub(crate) fn read_config_inner() -> Result<Config, anyhow::Error> {
    let config_path = std::env::var(CONFIG_ENV_VAR)?;
    let config = std::fs::read_to_string(config_path)?;
    Config::from_yaml(&config)
}

pub fn read_config() -> Config {
    match read_config_inner() {
        Ok(config) => config,
        Err(e) => {
            //Print to stderr, since logging is set up from the config
            eprintln!("Warning: Failed to read config: {}", e);
            Config::default()
        }
    }
}
