//! Program data: the static records the site renders and the assistant is
//! grounded on (pricing, curriculum, rights, timeline, FAQ, eligibility, ...).
//!
//! Every field defaults to empty so a partial `program.toml` still loads;
//! the context builder renders an empty section for anything missing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Program data bundled with the binary.
const BUNDLED_PROGRAM: &str = include_str!("../assets/program.toml");

/// All program records supplied by the surrounding application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramData {
    /// Recruitment goal, one line per statement
    pub mission: Vec<String>,

    /// Introductory copy (the "why this exists" block)
    pub intro: IntroText,

    /// Deadlines, training dates, deposit and similar headline facts
    pub key_facts: Vec<KeyFact>,

    /// Headline numbers shown on the landing page
    pub hero_stats: Vec<HeroStat>,

    pub eligibility: Eligibility,

    pub pricing: Vec<PricingPlan>,

    /// Free-form note appended under the pricing list
    pub pricing_note: String,

    /// Trainee → intern → pro progression and pay bands
    pub career_path: Vec<CareerStep>,

    pub why_join: Vec<Reason>,

    pub curriculum: Vec<CurriculumDay>,

    pub rights: Vec<RightsStage>,

    pub timeline: Vec<TimelineEvent>,

    pub application_steps: Vec<ProcessStep>,

    /// Where the application form lives
    pub application_url: String,

    pub faq: Vec<FaqItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroText {
    pub question: String,
    pub answer: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFact {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroStat {
    pub num: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Eligibility {
    pub target: String,
    pub condition: String,
    pub jobs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPlan {
    pub name: String,
    pub price: String,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub highlight: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerStep {
    pub step: u32,
    pub title: String,
    pub subtitle: String,
    pub desc: String,
    pub sub_desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reason {
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumDay {
    pub date: String,
    pub time: String,
    pub title: String,
    /// "online" or "physical"
    pub kind: String,
    pub desc: String,
    pub items: Vec<CurriculumItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumItem {
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RightsStage {
    pub title: String,
    pub role: String,
    pub badge: String,
    pub items: Vec<RightsItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RightsItem {
    pub text: String,
    /// Substring of `text` the site renders emphasised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessStep {
    pub step: String,
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    /// Category label, "其他" when the item has none.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("其他")
    }
}

impl ProgramData {
    /// Parse program data from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load program data from a file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The program data shipped with the binary.
    ///
    /// Falls back to empty data (and a warning) if the bundled file does not
    /// parse, so the assistant can still start.
    pub fn bundled() -> Self {
        Self::from_toml(BUNDLED_PROGRAM).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Bundled program data failed to parse, using empty data");
            Self::default()
        })
    }

    /// Raw text of the bundled program file (for `init`).
    pub fn bundled_toml() -> &'static str {
        BUNDLED_PROGRAM
    }

    /// Distinct FAQ categories in first-seen order.
    pub fn faq_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for item in &self.faq {
            let category = item.category_or_default();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Names of record groups that carry no data.
    pub fn empty_sections(&self) -> Vec<&'static str> {
        let mut empty = Vec::new();
        if self.mission.is_empty() {
            empty.push("mission");
        }
        if self.intro == IntroText::default() {
            empty.push("intro");
        }
        if self.key_facts.is_empty() {
            empty.push("key_facts");
        }
        if self.eligibility == Eligibility::default() {
            empty.push("eligibility");
        }
        if self.pricing.is_empty() {
            empty.push("pricing");
        }
        if self.career_path.is_empty() {
            empty.push("career_path");
        }
        if self.why_join.is_empty() {
            empty.push("why_join");
        }
        if self.curriculum.is_empty() {
            empty.push("curriculum");
        }
        if self.rights.is_empty() {
            empty.push("rights");
        }
        if self.timeline.is_empty() {
            empty.push("timeline");
        }
        if self.application_steps.is_empty() && self.application_url.is_empty() {
            empty.push("application");
        }
        if self.faq.is_empty() {
            empty.push("faq");
        }
        empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_program_parses() {
        let program = ProgramData::from_toml(BUNDLED_PROGRAM).unwrap();
        assert!(!program.pricing.is_empty());
        assert!(!program.faq.is_empty());
        assert!(!program.timeline.is_empty());
        assert!(program.empty_sections().is_empty());
    }

    #[test]
    fn partial_program_fills_defaults() {
        let program = ProgramData::from_toml(
            r#"
application_url = "https://example.org/apply"

[[faq]]
question = "需要教學經驗嗎？"
answer = "不需要。"
"#,
        )
        .unwrap();
        assert_eq!(program.faq.len(), 1);
        assert!(program.pricing.is_empty());
        assert!(program.empty_sections().contains(&"pricing"));
        assert!(!program.empty_sections().contains(&"faq"));
        assert!(!program.empty_sections().contains(&"application"));
    }

    #[test]
    fn faq_categories_in_first_seen_order() {
        let program = ProgramData {
            faq: vec![
                FaqItem {
                    category: Some("費用".into()),
                    question: "a".into(),
                    answer: "a".into(),
                },
                FaqItem {
                    category: None,
                    question: "b".into(),
                    answer: "b".into(),
                },
                FaqItem {
                    category: Some("費用".into()),
                    question: "c".into(),
                    answer: "c".into(),
                },
            ],
            ..ProgramData::default()
        };
        assert_eq!(program.faq_categories(), vec!["費用", "其他"]);
    }

    #[test]
    fn missing_program_file_is_an_error() {
        let result = ProgramData::load_from(Path::new("/nonexistent/program.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn load_program_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("program.toml");
        std::fs::write(&path, "mission = [\"招募引導師\"]\n").unwrap();
        let program = ProgramData::load_from(&path).unwrap();
        assert_eq!(program.mission, vec!["招募引導師".to_string()]);
    }
}
