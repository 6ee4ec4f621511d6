//! Project type classification.
//!
//! The classifier reads sources on its own rather than reusing the package
//! model, so it is unaffected by `include_test_files`. Rules are evaluated in
//! order and the first match wins.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::analysis::get_analyzer;

use super::options::AnalysisOptions;
use super::types::ProjectType;
use super::walker::{is_test_file, walk_go_files};

/// Calls that start a network server.
pub const SERVER_SIGNATURES: &[&str] = &[
    "http.ListenAndServe",
    "http.ListenAndServeTLS",
    "http.Serve(",
    "gin.Default(",
    "gin.New(",
    "echo.New(",
    "fiber.New(",
    "mux.NewRouter(",
    "chi.NewRouter(",
    "grpc.NewServer(",
    "net.Listen(",
];

/// Root-level entries that indicate a deployable service layout.
pub const SERVICE_MARKERS: &[&str] = &[
    "cmd",
    "internal",
    "pkg",
    "api",
    "proto",
    "deployments",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "k8s",
    "kubernetes",
    "helm",
];

/// What the classifier looked at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFacts {
    /// Non-test files declaring `package main` with a `func main()`.
    pub entry_points: Vec<PathBuf>,
    /// The single entry point calls a known server API.
    pub serves_network: bool,
    /// The root carries at least one of `SERVICE_MARKERS`.
    pub service_layout: bool,
}

#[derive(Debug, Clone, Copy)]
enum Condition {
    MultipleEntryPoints,
    NoEntryPoint,
    ServerWithServiceLayout,
    Server,
    SingleEntryPoint,
}

impl Condition {
    fn holds(self, facts: &ProjectFacts) -> bool {
        match self {
            Condition::MultipleEntryPoints => facts.entry_points.len() > 1,
            Condition::NoEntryPoint => facts.entry_points.is_empty(),
            Condition::ServerWithServiceLayout => facts.serves_network && facts.service_layout,
            Condition::Server => facts.serves_network,
            Condition::SingleEntryPoint => facts.entry_points.len() == 1,
        }
    }
}

const RULES: &[(Condition, ProjectType)] = &[
    (Condition::MultipleEntryPoints, ProjectType::Monorepo),
    (Condition::NoEntryPoint, ProjectType::Library),
    (Condition::ServerWithServiceLayout, ProjectType::Microservice),
    (Condition::Server, ProjectType::WebService),
    (Condition::SingleEntryPoint, ProjectType::Cli),
];

/// Apply the decision table to gathered facts.
pub fn classify_facts(facts: &ProjectFacts) -> ProjectType {
    RULES
        .iter()
        .find(|(condition, _)| condition.holds(facts))
        .map(|(_, project_type)| *project_type)
        .unwrap_or_default()
}

/// Scan the module for the facts the decision table needs.
pub fn gather_facts(root: &Path, options: &AnalysisOptions) -> anyhow::Result<ProjectFacts> {
    let analyzer = get_analyzer("go").ok_or_else(|| anyhow!("no Go analyzer registered"))?;
    let mut facts = ProjectFacts::default();

    for entry in walk_go_files(root, options) {
        let path = entry?;
        if is_test_file(&path) {
            continue;
        }
        let source = fs::read(&path)?;
        // files that do not parse are skipped by the walker too
        let declares_main = analyzer
            .analyze(&path, &source)
            .map(|f| !f.has_parse_errors && f.declares_entry_point())
            .unwrap_or(false);
        if declares_main {
            facts.entry_points.push(path);
        }
    }

    if let [only] = facts.entry_points.as_slice() {
        let content = fs::read_to_string(only)?;
        facts.serves_network = SERVER_SIGNATURES.iter().any(|sig| content.contains(sig));
    }
    facts.service_layout = SERVICE_MARKERS.iter().any(|m| root.join(m).exists());

    Ok(facts)
}

/// Classify the module at `root`. Any I/O failure yields `Unknown`.
pub fn detect_project_type(root: &Path, options: &AnalysisOptions) -> ProjectType {
    match gather_facts(root, options) {
        Ok(facts) => {
            let project_type = classify_facts(&facts);
            debug!(
                entry_points = facts.entry_points.len(),
                serves_network = facts.serves_network,
                service_layout = facts.service_layout,
                %project_type,
                "classified project"
            );
            project_type
        }
        Err(e) => {
            warn!(error = %e, "project classification failed");
            ProjectType::Unknown
        }
    }
}
