//! Knowledge context: the grounding text sent with every request.
//!
//! Assembled from [`ProgramData`] and [`PersonaConfig`] into labeled sections
//! in a fixed order. Assembly is deterministic: identical inputs always
//! produce byte-identical output, and no conversation data is ever included.
//! Missing records never fail; the section is emitted with an empty body.

use std::sync::{Arc, OnceLock};

use atombot_config::{PersonaConfig, ProgramData};

/// Section labels, in the order they appear in the context.
pub const SECTION_ORDER: &[&str] = &[
    "ROLE",
    "MISSION",
    "CORE VALUE",
    "KEY INFO",
    "ELIGIBILITY",
    "PRICING",
    "CAREER PATH & PAY",
    "WHY JOIN",
    "CURRICULUM",
    "RIGHTS & OBLIGATIONS",
    "TIMELINE",
    "HOW TO APPLY",
    "FAQ",
    "TONE",
];

/// Build the grounding context.
pub fn build_context(program: &ProgramData, persona: &PersonaConfig) -> String {
    let bodies = [
        role(persona),
        program.mission.join("\n"),
        core_value(program),
        key_info(program),
        eligibility(program),
        pricing(program),
        career_path(program),
        why_join(program),
        curriculum(program),
        rights(program),
        timeline(program),
        how_to_apply(program),
        faq(program),
        tone(persona),
    ];

    SECTION_ORDER
        .iter()
        .zip(bodies.iter())
        .map(|(label, body)| format!("[{label}]\n{body}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `text (detail)`, or just `text` when the detail is empty.
fn with_detail(text: String, detail: &str) -> String {
    if detail.is_empty() {
        text
    } else {
        format!("{text} ({detail})")
    }
}

fn non_empty_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn role(persona: &PersonaConfig) -> String {
    let mut lines = Vec::new();
    if !persona.assistant_name.is_empty() {
        lines.push(format!(
            "You are {}, the admissions assistant for \"{} {}\".",
            persona.assistant_name, persona.app_name, persona.program_name
        ));
    }
    if !persona.program_title.is_empty() {
        lines.push(format!(
            "Applicants are recruited to become \"{}\".",
            persona.program_title
        ));
    }
    lines.push("Answer only from the information below.".into());
    lines.join("\n")
}

fn core_value(program: &ProgramData) -> String {
    let intro = &program.intro;
    non_empty_lines([
        intro.question.as_str(),
        intro.answer.as_str(),
        intro.desc.as_str(),
    ])
}

fn key_info(program: &ProgramData) -> String {
    let facts = program
        .key_facts
        .iter()
        .map(|f| format!("- {}: {}", f.label, f.value));
    let stats = program
        .hero_stats
        .iter()
        .map(|s| format!("- {} {}", s.num, s.label));
    facts.chain(stats).collect::<Vec<_>>().join("\n")
}

fn eligibility(program: &ProgramData) -> String {
    let e = &program.eligibility;
    let mut lines = Vec::new();
    if !e.target.is_empty() {
        lines.push(format!("- Who: {}", e.target));
    }
    if !e.condition.is_empty() {
        lines.push(format!("- Requirement: {}", e.condition));
    }
    if !e.jobs.is_empty() {
        lines.push(format!("- Roles after training: {}", e.jobs.join(", ")));
    }
    lines.join("\n")
}

fn pricing(program: &ProgramData) -> String {
    let mut lines: Vec<String> = program
        .pricing
        .iter()
        .map(|p| with_detail(format!("- {}: {}", p.name, p.price), &p.note))
        .collect();
    if !program.pricing_note.is_empty() {
        lines.push(format!("Note: {}", program.pricing_note));
    }
    lines.join("\n")
}

fn career_path(program: &ProgramData) -> String {
    program
        .career_path
        .iter()
        .map(|c| {
            let head = with_detail(format!("{}. {}", c.step, c.title), &c.subtitle);
            let mut line = format!("{head}: {}", c.desc);
            if !c.sub_desc.is_empty() {
                line.push(' ');
                line.push_str(&c.sub_desc);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn why_join(program: &ProgramData) -> String {
    program
        .why_join
        .iter()
        .map(|r| format!("- {}: {}", r.title, r.desc))
        .collect::<Vec<_>>()
        .join("\n")
}

fn curriculum(program: &ProgramData) -> String {
    let mut lines = Vec::new();
    for day in &program.curriculum {
        lines.push(format!(
            "- {} {}: {} [{}]",
            day.date, day.time, day.title, day.kind
        ));
        for item in &day.items {
            lines.push(format!("  - {}: {}", item.title, item.desc));
        }
    }
    lines.join("\n")
}

fn rights(program: &ProgramData) -> String {
    program
        .rights
        .iter()
        .map(|stage| {
            let mut block = format!("[{}]", stage.title);
            for item in &stage.items {
                block.push('\n');
                block.push_str(&item.text);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn timeline(program: &ProgramData) -> String {
    program
        .timeline
        .iter()
        .map(|t| with_detail(format!("- {}: {}", t.date, t.title), &t.desc))
        .collect::<Vec<_>>()
        .join("\n")
}

fn how_to_apply(program: &ProgramData) -> String {
    let mut lines: Vec<String> = program
        .application_steps
        .iter()
        .map(|s| format!("{}. {}: {}", s.step, s.title, s.desc))
        .collect();
    if !program.application_url.is_empty() {
        lines.push(format!("Apply here: {}", program.application_url));
    }
    lines.join("\n")
}

fn faq(program: &ProgramData) -> String {
    program
        .faq
        .iter()
        .map(|f| format!("Q: {}\nA: {}", f.question, f.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn tone(persona: &PersonaConfig) -> String {
    let mut lines = Vec::new();
    if !persona.language.is_empty() {
        lines.push(format!("Use {}.", persona.language));
    }
    lines.extend(persona.tone.iter().cloned());
    lines.join("\n")
}

/// Lazily built, cached knowledge context for one conversation owner.
pub struct KnowledgeContext {
    program: Arc<ProgramData>,
    persona: PersonaConfig,
    cached: OnceLock<Arc<str>>,
}

impl KnowledgeContext {
    pub fn new(program: impl Into<Arc<ProgramData>>, persona: PersonaConfig) -> Self {
        Self {
            program: program.into(),
            persona,
            cached: OnceLock::new(),
        }
    }

    /// The context text, built on first call.
    pub fn get(&self) -> Arc<str> {
        self.cached
            .get_or_init(|| {
                let text = build_context(&self.program, &self.persona);
                tracing::debug!(chars = text.chars().count(), "Knowledge context built");
                Arc::from(text)
            })
            .clone()
    }

    pub fn program(&self) -> &ProgramData {
        &self.program
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }
}

impl std::fmt::Debug for KnowledgeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeContext")
            .field("built", &self.cached.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atombot_config::{FaqItem, PricingPlan, RightsItem, RightsStage, TimelineEvent};

    fn label_positions(context: &str) -> Vec<usize> {
        SECTION_ORDER
            .iter()
            .map(|label| context.find(&format!("[{label}]\n")).unwrap())
            .collect()
    }

    #[test]
    fn build_is_deterministic() {
        let program = ProgramData::bundled();
        let persona = PersonaConfig::default();
        let a = build_context(&program, &persona);
        let b = build_context(&program, &persona);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let context = build_context(&ProgramData::bundled(), &PersonaConfig::default());
        let positions = label_positions(&context);
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert!(context.starts_with("[ROLE]\n"));
    }

    #[test]
    fn empty_program_yields_empty_sections() {
        let context = build_context(&ProgramData::default(), &PersonaConfig::default());
        label_positions(&context);
        assert!(context.contains("[PRICING]\n\n\n[CAREER PATH & PAY]"));
        assert!(context.contains("[FAQ]\n\n\n[TONE]"));
    }

    #[test]
    fn record_line_formats() {
        let program = ProgramData {
            pricing: vec![
                PricingPlan {
                    name: "早鳥方案".into(),
                    price: "NT$3,600".into(),
                    note: "3/2 前".into(),
                    ..PricingPlan::default()
                },
                PricingPlan {
                    name: "保證金".into(),
                    price: "NT$1,000".into(),
                    ..PricingPlan::default()
                },
            ],
            timeline: vec![TimelineEvent {
                date: "2/8".into(),
                title: "開放報名".into(),
                desc: "線上表單".into(),
            }],
            rights: vec![RightsStage {
                title: "培訓期".into(),
                items: vec![
                    RightsItem {
                        text: "全勤退還保證金".into(),
                        highlight: None,
                    },
                    RightsItem {
                        text: "取得結業證書".into(),
                        highlight: None,
                    },
                ],
                ..RightsStage::default()
            }],
            faq: vec![
                FaqItem {
                    category: None,
                    question: "Q1".into(),
                    answer: "A1".into(),
                },
                FaqItem {
                    category: None,
                    question: "Q2".into(),
                    answer: "A2".into(),
                },
            ],
            ..ProgramData::default()
        };
        let context = build_context(&program, &PersonaConfig::default());

        assert!(context.contains("[PRICING]\n- 早鳥方案: NT$3,600 (3/2 前)\n- 保證金: NT$1,000\n"));
        assert!(context.contains("[TIMELINE]\n- 2/8: 開放報名 (線上表單)\n"));
        assert!(context.contains("[RIGHTS & OBLIGATIONS]\n[培訓期]\n全勤退還保證金\n取得結業證書\n"));
        assert!(context.contains("[FAQ]\nQ: Q1\nA: A1\n\nQ: Q2\nA: A2\n"));
    }

    #[test]
    fn bundled_program_mentions_key_facts() {
        let context = build_context(&ProgramData::bundled(), &PersonaConfig::default());
        assert!(context.contains("- 7/17 09:30–17:30: 引導技術工作坊 [physical]"));
        assert!(context.contains("NT$1000"));
        assert!(context.contains("Use Traditional Chinese"));
    }

    #[test]
    fn knowledge_context_is_cached() {
        let knowledge = KnowledgeContext::new(ProgramData::bundled(), PersonaConfig::default());
        let first = knowledge.get();
        let second = knowledge.get();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            &*first,
            build_context(knowledge.program(), knowledge.persona())
        );
    }
}
