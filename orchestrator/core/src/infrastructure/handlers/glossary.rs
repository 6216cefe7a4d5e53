// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Built-in recruiting/technology glossary shared by the dictionary and
// smart-database agents. Matching is a deterministic whole-word scan over
// canonical names and aliases; there is no fuzzy or model-based extraction.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermCategory {
    Language,
    Framework,
    Infrastructure,
    Data,
    Practice,
    Recruiting,
}

#[derive(Debug)]
pub struct GlossaryEntry {
    pub term: &'static str,
    pub aliases: &'static [&'static str],
    pub category: TermCategory,
    pub definition: &'static str,
    pub related: &'static [&'static str],
}

impl GlossaryEntry {
    pub fn surface_forms(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.term).chain(self.aliases.iter().copied())
    }
}

pub static GLOSSARY: &[GlossaryEntry] = &[
    GlossaryEntry {
        term: "Kubernetes",
        aliases: &["k8s"],
        category: TermCategory::Infrastructure,
        definition: "Open-source container orchestration platform that automates deployment, scaling and management of containerized workloads.",
        related: &["Docker", "Helm", "Terraform"],
    },
    GlossaryEntry {
        term: "Docker",
        aliases: &["containers"],
        category: TermCategory::Infrastructure,
        definition: "Tooling for packaging applications and their dependencies into portable container images.",
        related: &["Kubernetes"],
    },
    GlossaryEntry {
        term: "Helm",
        aliases: &[],
        category: TermCategory::Infrastructure,
        definition: "Package manager for Kubernetes that templates and versions application manifests as charts.",
        related: &["Kubernetes"],
    },
    GlossaryEntry {
        term: "Terraform",
        aliases: &["iac", "infrastructure as code"],
        category: TermCategory::Infrastructure,
        definition: "Declarative infrastructure-as-code tool for provisioning cloud resources from versioned configuration.",
        related: &["AWS", "GCP"],
    },
    GlossaryEntry {
        term: "AWS",
        aliases: &["amazon web services"],
        category: TermCategory::Infrastructure,
        definition: "Amazon's public cloud platform offering compute, storage, networking and managed services.",
        related: &["GCP", "Azure", "Terraform"],
    },
    GlossaryEntry {
        term: "GCP",
        aliases: &["google cloud", "google cloud platform"],
        category: TermCategory::Infrastructure,
        definition: "Google's public cloud platform.",
        related: &["AWS", "Azure"],
    },
    GlossaryEntry {
        term: "Azure",
        aliases: &["microsoft azure"],
        category: TermCategory::Infrastructure,
        definition: "Microsoft's public cloud platform.",
        related: &["AWS", "GCP"],
    },
    GlossaryEntry {
        term: "CI/CD",
        aliases: &["continuous integration", "continuous delivery", "continuous deployment"],
        category: TermCategory::Practice,
        definition: "Practice of automatically building, testing and releasing every change through a pipeline.",
        related: &["DevOps"],
    },
    GlossaryEntry {
        term: "DevOps",
        aliases: &["site reliability engineering", "sre"],
        category: TermCategory::Practice,
        definition: "Engineering culture and tooling that unifies software development and operations to ship reliably and often.",
        related: &["CI/CD", "Kubernetes"],
    },
    GlossaryEntry {
        term: "Microservices",
        aliases: &["microservice", "service-oriented architecture"],
        category: TermCategory::Practice,
        definition: "Architecture style that splits a system into small, independently deployable services.",
        related: &["Kubernetes", "gRPC"],
    },
    GlossaryEntry {
        term: "gRPC",
        aliases: &[],
        category: TermCategory::Framework,
        definition: "High-performance RPC framework using HTTP/2 and Protocol Buffers.",
        related: &["Microservices"],
    },
    GlossaryEntry {
        term: "Rust",
        aliases: &["rustlang"],
        category: TermCategory::Language,
        definition: "Systems programming language focused on memory safety and performance without a garbage collector.",
        related: &["C++", "Golang"],
    },
    GlossaryEntry {
        term: "Golang",
        aliases: &["go lang"],
        category: TermCategory::Language,
        definition: "Go, a statically typed compiled language from Google designed for simple concurrent network services.",
        related: &["Rust", "Microservices"],
    },
    GlossaryEntry {
        term: "Python",
        aliases: &[],
        category: TermCategory::Language,
        definition: "General-purpose dynamic language widely used for backend services, scripting and data science.",
        related: &["Django", "Machine Learning"],
    },
    GlossaryEntry {
        term: "Java",
        aliases: &[],
        category: TermCategory::Language,
        definition: "Statically typed JVM language common in enterprise backend systems.",
        related: &["Spring", "Kotlin"],
    },
    GlossaryEntry {
        term: "Kotlin",
        aliases: &[],
        category: TermCategory::Language,
        definition: "Modern JVM language interoperable with Java, standard for Android development.",
        related: &["Java"],
    },
    GlossaryEntry {
        term: "TypeScript",
        aliases: &["ts"],
        category: TermCategory::Language,
        definition: "Typed superset of JavaScript that compiles to plain JavaScript.",
        related: &["JavaScript", "React", "Node.js"],
    },
    GlossaryEntry {
        term: "JavaScript",
        aliases: &["js", "ecmascript"],
        category: TermCategory::Language,
        definition: "Dynamic language of the web browser, also used server-side through Node.js.",
        related: &["TypeScript", "Node.js"],
    },
    GlossaryEntry {
        term: "C++",
        aliases: &["cpp"],
        category: TermCategory::Language,
        definition: "Compiled systems language offering low-level control with high-level abstractions.",
        related: &["Rust"],
    },
    GlossaryEntry {
        term: "React",
        aliases: &["reactjs", "react.js"],
        category: TermCategory::Framework,
        definition: "JavaScript library for building component-based user interfaces.",
        related: &["TypeScript", "Next.js"],
    },
    GlossaryEntry {
        term: "Next.js",
        aliases: &["nextjs"],
        category: TermCategory::Framework,
        definition: "React framework providing server-side rendering, routing and API routes.",
        related: &["React"],
    },
    GlossaryEntry {
        term: "Node.js",
        aliases: &["nodejs", "node"],
        category: TermCategory::Framework,
        definition: "JavaScript runtime for building server-side applications.",
        related: &["JavaScript", "TypeScript"],
    },
    GlossaryEntry {
        term: "Django",
        aliases: &[],
        category: TermCategory::Framework,
        definition: "Batteries-included Python web framework.",
        related: &["Python"],
    },
    GlossaryEntry {
        term: "Spring",
        aliases: &["spring boot"],
        category: TermCategory::Framework,
        definition: "Java application framework for dependency injection and web services.",
        related: &["Java"],
    },
    GlossaryEntry {
        term: "PostgreSQL",
        aliases: &["postgres"],
        category: TermCategory::Data,
        definition: "Open-source relational database known for standards compliance and extensibility.",
        related: &["SQL"],
    },
    GlossaryEntry {
        term: "SQL",
        aliases: &[],
        category: TermCategory::Data,
        definition: "Declarative language for querying and manipulating relational data.",
        related: &["PostgreSQL"],
    },
    GlossaryEntry {
        term: "Kafka",
        aliases: &["apache kafka"],
        category: TermCategory::Data,
        definition: "Distributed event streaming platform for high-throughput log-based messaging.",
        related: &["Microservices"],
    },
    GlossaryEntry {
        term: "Machine Learning",
        aliases: &["ml"],
        category: TermCategory::Data,
        definition: "Building models that learn patterns from data to make predictions or decisions.",
        related: &["Python"],
    },
    GlossaryEntry {
        term: "Boolean Search",
        aliases: &["boolean string", "x-ray search"],
        category: TermCategory::Recruiting,
        definition: "Sourcing technique combining keywords with AND, OR and NOT operators to narrow candidate searches.",
        related: &["Sourcing"],
    },
    GlossaryEntry {
        term: "Sourcing",
        aliases: &["talent sourcing"],
        category: TermCategory::Recruiting,
        definition: "Proactively identifying and engaging candidates who have not applied.",
        related: &["Boolean Search", "Passive Candidate"],
    },
    GlossaryEntry {
        term: "Passive Candidate",
        aliases: &["passive candidates"],
        category: TermCategory::Recruiting,
        definition: "A professional who is not actively job hunting but may be open to the right opportunity.",
        related: &["Sourcing"],
    },
    GlossaryEntry {
        term: "ATS",
        aliases: &["applicant tracking system"],
        category: TermCategory::Recruiting,
        definition: "Software that manages job postings, applications and candidate pipelines.",
        related: &["Time to Hire"],
    },
    GlossaryEntry {
        term: "Time to Hire",
        aliases: &["time-to-hire", "time to fill"],
        category: TermCategory::Recruiting,
        definition: "Days elapsed between a candidate entering the pipeline and accepting an offer.",
        related: &["ATS"],
    },
    GlossaryEntry {
        term: "Culture Fit",
        aliases: &["culture add"],
        category: TermCategory::Recruiting,
        definition: "Alignment between a candidate's working values and the norms of the hiring team.",
        related: &[],
    },
];

/// Lowercase and collapse whitespace so lookups ignore formatting.
pub fn normalize(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn find(term: &str) -> Option<&'static GlossaryEntry> {
    let wanted = normalize(term);
    if wanted.is_empty() {
        return None;
    }
    GLOSSARY
        .iter()
        .find(|entry| entry.surface_forms().any(|form| normalize(form) == wanted))
}

/// Position of the first whole-word occurrence of `needle` in `haystack`.
/// Both must already be normalized.
pub fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.match_indices(needle).map(|(at, _)| at).find(|&at| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + needle.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Glossary entries mentioned in `text`, in order of first mention.
pub fn extract(text: &str) -> Vec<&'static GlossaryEntry> {
    let haystack = normalize(text);
    let mut hits: Vec<(usize, &'static GlossaryEntry)> = GLOSSARY
        .iter()
        .filter_map(|entry| {
            entry
                .surface_forms()
                .filter_map(|form| find_word(&haystack, &normalize(form)))
                .min()
                .map(|at| (at, entry))
        })
        .collect();
    hits.sort_by_key(|(at, _)| *at);
    hits.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_and_alias_insensitive() {
        assert_eq!(find("kubernetes").unwrap().term, "Kubernetes");
        assert_eq!(find("  K8S ").unwrap().term, "Kubernetes");
        assert_eq!(find("Postgres").unwrap().term, "PostgreSQL");
        assert!(find("").is_none());
        assert!(find("cobol").is_none());
    }

    #[test]
    fn test_extract_respects_word_boundaries() {
        let found: Vec<&str> = extract("Senior Rust engineer (Kubernetes, c++), no trust issues")
            .into_iter()
            .map(|e| e.term)
            .collect();
        assert_eq!(found, vec!["Rust", "Kubernetes", "C++"]);
    }

    #[test]
    fn test_glossary_terms_are_unique() {
        let mut forms: Vec<String> = GLOSSARY
            .iter()
            .flat_map(|e| e.surface_forms())
            .map(normalize)
            .collect();
        let total = forms.len();
        forms.sort();
        forms.dedup();
        assert_eq!(forms.len(), total);
    }
}
