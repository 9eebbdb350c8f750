use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub remove_duplicates: bool,
}

/// Category input as it comes from the editor. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl RawCategory {
    pub fn new(id: u64, title: &str, text: &str) -> Self {
        RawCategory {
            id: Some(id),
            title: Some(title.to_string()),
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCategory {
    pub id: u64,
    pub title: String,
    pub members: Vec<String>,
}

pub fn default_category_title(index: usize) -> String {
    format!("Category {}", index + 1)
}
