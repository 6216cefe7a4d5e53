// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Smart Database agent
//!
//! Analyses job postings and candidate profiles and, besides its own analysis,
//! emits a `guidance` object keyed by downstream agent id. Guidance is advisory
//! data for whoever sequences the pipeline; this handler never calls the
//! agents it advises.
//!
//! All derivations are deterministic: seniority comes from title keywords and
//! stated years of experience, skills from explicit lists plus a glossary scan.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::culture_matcher::detect_dimensions;
use super::glossary::{self, find_word, normalize, TermCategory};
use crate::domain::envelope::{AgentRequest, HandlerOutput};
use crate::domain::handler::{ActionSet, AgentHandler, HandlerError};

static YEARS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years|yrs)\b").expect("years pattern is valid")
});

/// Number of skills carried into search strings and outreach guidance
const TOP_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Staff,
    Principal,
    Manager,
    Director,
    Executive,
}

impl Seniority {
    fn label(&self) -> &'static str {
        match self {
            Seniority::Intern => "Intern",
            Seniority::Junior => "Junior",
            Seniority::Mid => "Mid-level",
            Seniority::Senior => "Senior",
            Seniority::Lead => "Lead",
            Seniority::Staff => "Staff",
            Seniority::Principal => "Principal",
            Seniority::Manager => "Manager",
            Seniority::Director => "Director",
            Seniority::Executive => "Executive",
        }
    }

    fn from_years(years: u32) -> Self {
        match years {
            0..=1 => Seniority::Junior,
            2..=4 => Seniority::Mid,
            5..=9 => Seniority::Senior,
            _ => Seniority::Staff,
        }
    }
}

// Checked top-down; the first level with a keyword present wins
static SENIORITY_KEYWORDS: &[(Seniority, &[&str])] = &[
    (Seniority::Executive, &["chief", "cto", "ceo", "cfo", "vp", "vice president"]),
    (Seniority::Director, &["director", "head of"]),
    (Seniority::Manager, &["manager"]),
    (Seniority::Principal, &["principal"]),
    (Seniority::Staff, &["staff"]),
    (Seniority::Lead, &["lead", "tech lead"]),
    (Seniority::Senior, &["senior", "sr"]),
    (Seniority::Junior, &["junior", "jr", "entry level", "graduate"]),
    (Seniority::Intern, &["intern", "internship"]),
];

fn seniority_from_title(title: &str) -> Option<Seniority> {
    let haystack = normalize(title);
    SENIORITY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| find_word(&haystack, w).is_some()))
        .map(|(level, _)| *level)
}

/// Largest "N years" figure mentioned in the text.
fn years_mentioned(text: &str) -> Option<u32> {
    YEARS_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
}

/// Title with seniority qualifiers stripped ("Senior Backend Engineer" -> "Backend Engineer").
fn core_role(title: &str) -> String {
    let qualifiers = ["senior", "sr", "sr.", "junior", "jr", "jr.", "principal", "staff", "lead", "intern"];
    let role: Vec<&str> = title
        .split_whitespace()
        .filter(|word| !qualifiers.contains(&word.to_lowercase().trim_matches(',')))
        .collect();
    if role.is_empty() {
        title.trim().to_string()
    } else {
        role.join(" ")
    }
}

/// Explicit skills (canonicalised through the glossary) followed by skills
/// mentioned in free text, without duplicates.
fn collect_skills(explicit: &[String], free_text: &[&str]) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    let mut push = |skill: String| {
        if !skill.is_empty() && !skills.iter().any(|s| s.eq_ignore_ascii_case(&skill)) {
            skills.push(skill);
        }
    };

    for skill in explicit {
        match glossary::find(skill) {
            Some(entry) => push(entry.term.to_string()),
            None => push(skill.trim().to_string()),
        }
    }
    for text in free_text {
        for entry in glossary::extract(text) {
            push(entry.term.to_string());
        }
    }
    skills
}

fn skill_categories(skills: &[String]) -> BTreeMap<TermCategory, Vec<String>> {
    let mut categories: BTreeMap<TermCategory, Vec<String>> = BTreeMap::new();
    for skill in skills {
        if let Some(entry) = glossary::find(skill) {
            categories.entry(entry.category).or_default().push(skill.clone());
        }
    }
    categories
}

fn glossary_terms(skills: &[String]) -> Vec<&String> {
    skills.iter().filter(|s| glossary::find(s).is_some()).collect()
}

fn quote(term: &str) -> String {
    if term.contains(' ') {
        format!("\"{}\"", term)
    } else {
        term.to_string()
    }
}

fn boolean_search(role: &str, skills: &[String]) -> String {
    let top: Vec<String> = skills.iter().take(TOP_SKILLS).map(|s| quote(s)).collect();
    if top.is_empty() {
        format!("\"{}\"", role)
    } else {
        format!("\"{}\" AND ({})", role, top.join(" OR "))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
enum SmartDatabaseAction {
    #[serde(rename_all = "camelCase")]
    AnalyzeJob {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        skills: Vec<String>,
        #[serde(default)]
        job_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AnalyzeCandidate {
        headline: String,
        #[serde(default)]
        summary: String,
        #[serde(default)]
        skills: Vec<String>,
        #[serde(default)]
        candidate_id: Option<String>,
    },
}

impl ActionSet for SmartDatabaseAction {
    const ACTIONS: &'static [&'static str] = &["analyze_job", "analyze_candidate"];
}

#[derive(Debug, Default)]
pub struct SmartDatabaseHandler;

impl SmartDatabaseHandler {
    pub fn new() -> Self {
        Self
    }

    fn analyze_job(
        &self,
        title: &str,
        description: &str,
        skills: &[String],
        job_id: Option<String>,
        request: &AgentRequest,
    ) -> Result<Value, HandlerError> {
        if title.trim().is_empty() {
            return Err(HandlerError::InvalidParams {
                action: "analyze_job".to_string(),
                reason: "title must not be empty".to_string(),
            });
        }

        let years_required = years_mentioned(description);
        let seniority = seniority_from_title(title)
            .or_else(|| years_required.map(Seniority::from_years))
            .unwrap_or(Seniority::Mid);
        let role = core_role(title);
        let key_skills = collect_skills(skills, &[title, description]);
        let company_values = detect_dimensions(description);

        let mut search_keywords = vec![role.clone()];
        search_keywords.extend(key_skills.iter().take(TOP_SKILLS).cloned());
        let boolean = boolean_search(&role, &key_skills);

        let mut recruiter = Map::new();
        recruiter.insert("seniority".into(), json!(seniority));
        recruiter.insert("searchKeywords".into(), json!(search_keywords));
        recruiter.insert("booleanSearch".into(), json!(boolean));
        if let Some(stage) = request.context.stage {
            recruiter.insert("stage".into(), json!(stage));
        }

        let guidance = json!({
            "recruiter": recruiter,
            "culture-matcher": { "companyValues": company_values },
            "dictionary-bot": { "termsToDefine": glossary_terms(&key_skills) },
        });

        Ok(json!({
            "jobId": job_id.or_else(|| request.context.job_id.clone()),
            "role": role,
            "seniority": seniority,
            "yearsRequired": years_required,
            "keySkills": key_skills,
            "skillCategories": skill_categories(&key_skills),
            "searchKeywords": search_keywords,
            "booleanSearch": boolean,
            "guidance": guidance,
        }))
    }

    fn analyze_candidate(
        &self,
        headline: &str,
        summary: &str,
        skills: &[String],
        candidate_id: Option<String>,
        request: &AgentRequest,
    ) -> Result<Value, HandlerError> {
        if headline.trim().is_empty() {
            return Err(HandlerError::InvalidParams {
                action: "analyze_candidate".to_string(),
                reason: "headline must not be empty".to_string(),
            });
        }

        let years_experience = years_mentioned(summary).or_else(|| years_mentioned(headline));
        let seniority = seniority_from_title(headline)
            .or_else(|| years_experience.map(Seniority::from_years))
            .unwrap_or(Seniority::Mid);
        let candidate_skills = collect_skills(skills, &[headline, summary]);
        let candidate_values = detect_dimensions(summary);

        let highlight: Vec<&String> = candidate_skills.iter().take(3).collect();
        let outreach_angle = if highlight.is_empty() {
            format!("{} {}", seniority.label(), core_role(headline))
        } else {
            let names: Vec<&str> = highlight.iter().map(|s| s.as_str()).collect();
            format!("{} profile with {} experience", seniority.label(), names.join(", "))
        };

        let guidance = json!({
            "recruiter": {
                "seniority": seniority,
                "highlightSkills": highlight,
                "outreachAngle": outreach_angle,
            },
            "culture-matcher": { "candidateValues": candidate_values },
            "dictionary-bot": { "termsToDefine": glossary_terms(&candidate_skills) },
        });

        Ok(json!({
            "candidateId": candidate_id.or_else(|| request.context.candidate_id.clone()),
            "seniority": seniority,
            "yearsExperience": years_experience,
            "skills": candidate_skills,
            "skillCategories": skill_categories(&candidate_skills),
            "cultureValues": candidate_values,
            "guidance": guidance,
        }))
    }
}

#[async_trait]
impl AgentHandler for SmartDatabaseHandler {
    async fn handle(&self, request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
        let data = match SmartDatabaseAction::parse(request)? {
            SmartDatabaseAction::AnalyzeJob {
                title,
                description,
                skills,
                job_id,
            } => self.analyze_job(&title, &description, &skills, job_id, request)?,
            SmartDatabaseAction::AnalyzeCandidate {
                headline,
                summary,
                skills,
                candidate_id,
            } => self.analyze_candidate(&headline, &summary, &skills, candidate_id, request)?,
        };
        Ok(HandlerOutput::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{InvocationContext, PipelineStage};

    #[test]
    fn test_seniority_detection() {
        assert_eq!(seniority_from_title("Senior Backend Engineer"), Some(Seniority::Senior));
        assert_eq!(seniority_from_title("VP of Engineering"), Some(Seniority::Executive));
        assert_eq!(seniority_from_title("Staff Engineer, Platform"), Some(Seniority::Staff));
        assert_eq!(seniority_from_title("Software Engineer"), None);
        assert_eq!(seniority_from_title("Leader of nothing"), None);
    }

    #[test]
    fn test_years_mentioned_takes_maximum() {
        assert_eq!(years_mentioned("3+ years of Go, 7 yrs total"), Some(7));
        assert_eq!(years_mentioned("no experience stated"), None);
    }

    #[test]
    fn test_core_role_strips_qualifiers() {
        assert_eq!(core_role("Senior Backend Engineer"), "Backend Engineer");
        assert_eq!(core_role("Lead"), "Lead");
    }

    #[tokio::test]
    async fn test_analyze_job_emits_guidance_for_downstream_agents() {
        let handler = SmartDatabaseHandler::new();
        let request = AgentRequest::new("analyze_job")
            .with_param("title", "Senior Platform Engineer")
            .with_param(
                "description",
                "Run our Kubernetes fleet on AWS. We value ownership and mentorship. 6+ years required.",
            )
            .with_param("skills", json!(["rust", "Terraform"]))
            .with_context(InvocationContext::for_job("job-7").with_stage(PipelineStage::Sourcing));

        let output = handler.handle(&request).await.unwrap();
        let data = output.data;

        assert_eq!(data["jobId"], "job-7");
        assert_eq!(data["seniority"], "senior");
        assert_eq!(data["yearsRequired"], 6);
        assert_eq!(data["role"], "Platform Engineer");
        assert_eq!(data["keySkills"], json!(["Rust", "Terraform", "Kubernetes", "AWS"]));
        assert_eq!(
            data["booleanSearch"],
            "\"Platform Engineer\" AND (Rust OR Terraform OR Kubernetes OR AWS)"
        );
        assert_eq!(data["guidance"]["recruiter"]["stage"], "sourcing");
        assert_eq!(
            data["guidance"]["culture-matcher"]["companyValues"],
            json!(["autonomy", "learning"])
        );
        assert_eq!(
            data["guidance"]["dictionary-bot"]["termsToDefine"],
            json!(["Rust", "Terraform", "Kubernetes", "AWS"])
        );
    }

    #[tokio::test]
    async fn test_analyze_candidate_infers_seniority_from_years() {
        let handler = SmartDatabaseHandler::new();
        let request = AgentRequest::new("analyze_candidate")
            .with_param("headline", "Backend developer")
            .with_param("summary", "12 years building Java and Kafka systems; I love teamwork.")
            .with_param("candidateId", "cand-1");

        let data = handler.handle(&request).await.unwrap().data;
        assert_eq!(data["candidateId"], "cand-1");
        assert_eq!(data["seniority"], "staff");
        assert_eq!(data["skills"], json!(["Java", "Kafka"]));
        assert_eq!(data["cultureValues"], json!(["collaboration"]));
        assert_eq!(
            data["guidance"]["recruiter"]["outreachAngle"],
            "Staff profile with Java, Kafka experience"
        );
    }

    #[tokio::test]
    async fn test_same_request_yields_same_data() {
        let handler = SmartDatabaseHandler::new();
        let request = AgentRequest::new("analyze_job").with_param("title", "Data Engineer");

        let first = handler.handle(&request).await.unwrap();
        let second = handler.handle(&request).await.unwrap();
        assert_eq!(first, second);
    }
}
