use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task identifier.
///
/// Fresh ids are creation timestamps in milliseconds. Lists written by other
/// tools may carry any JSON number (negative, fractional) or a string; both
/// are kept in their original form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(serde_json::Number),
    Text(String),
}

impl TaskId {
    /// The id as an unsigned integer, when it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TaskId::Number(n) => n.as_u64(),
            TaskId::Text(_) => None,
        }
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Number(n.into())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Personal,
    Study,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Study];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Study => "study",
        }
    }

    /// Label shown in the category selector and on task badges.
    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "💼 Work",
            Category::Personal => "🏠 Personal",
            Category::Study => "📚 Study",
        }
    }

    /// Next category in selector order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Category::Work => Category::Personal,
            Category::Personal => Category::Study,
            Category::Study => Category::Work,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}' (expected work, personal or study)", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub category: Category,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            category,
        }
    }
}
