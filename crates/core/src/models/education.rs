use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    Basics,
    Defi,
    Nft,
    Trading,
    Security,
}

impl std::str::FromStr for TopicCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basics" => Ok(TopicCategory::Basics),
            "defi" => Ok(TopicCategory::Defi),
            "nft" => Ok(TopicCategory::Nft),
            "trading" => Ok(TopicCategory::Trading),
            "security" => Ok(TopicCategory::Security),
            other => Err(format!("Unknown topic category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("Unknown difficulty: {other}")),
        }
    }
}

/// One entry of the educational hub.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationalTopic {
    pub id: &'static str,
    pub title: &'static str,
    pub category: TopicCategory,
    pub difficulty: Difficulty,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlossaryTerm {
    pub term: &'static str,
    pub definition: &'static str,
}
