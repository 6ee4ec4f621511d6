//! Dependency analysis: who imports each requirement, and what the module
//! cache knows about it.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::BaseDirs;
use tracing::debug;
use walkdir::WalkDir;

use super::manifest::GoManifest;
use super::types::{DependencyInfo, PackageInfo};

/// License file names probed in a module directory, in order.
const LICENSE_FILES: &[&str] = &[
    "LICENSE",
    "LICENSE.md",
    "LICENSE.txt",
    "LICENCE",
    "LICENCE.md",
    "COPYING",
];

/// Ordered (marker, SPDX id) pairs; first marker found in the text wins.
const LICENSE_MARKERS: &[(&str, &str)] = &[
    ("Apache License", "Apache-2.0"),
    ("Mozilla Public License", "MPL-2.0"),
    ("GNU LESSER GENERAL PUBLIC LICENSE", "LGPL"),
    ("GNU AFFERO GENERAL PUBLIC LICENSE", "AGPL-3.0"),
    ("GNU GENERAL PUBLIC LICENSE", "GPL"),
    ("ISC License", "ISC"),
    ("This is free and unencumbered software", "Unlicense"),
    ("Permission is hereby granted, free of charge", "MIT"),
    ("Neither the name", "BSD-3-Clause"),
    ("Redistribution and use in source and binary forms", "BSD-2-Clause"),
];

/// Cross-reference requirements with the packages that import them and
/// attach module cache details.
///
/// A module missing from the cache keeps `None` for size, license and
/// timestamp. Any other I/O error fails the whole analysis; the caller then
/// keeps the plain manifest list.
pub fn analyze_dependencies(
    manifest: &GoManifest,
    packages: &[PackageInfo],
) -> anyhow::Result<Vec<DependencyInfo>> {
    let cache = module_cache_dir();
    debug!(cache = ?cache, "module cache");

    let mut dependencies = manifest.requirements.clone();
    let mut importers: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); dependencies.len()];
    for package in packages {
        for import in &package.external_imports {
            if let Some(owner) = owning_requirement(&dependencies, import) {
                importers[owner].insert(package.import_path.as_str());
            }
        }
    }

    for (dep, users) in dependencies.iter_mut().zip(importers) {
        dep.importers = users.into_iter().map(String::from).collect();
        if let Some(cache) = &cache {
            enrich_from_cache(dep, cache)?;
        }
    }
    Ok(dependencies)
}

/// Index of the requirement that provides `import_path`.
///
/// Modules nest (`cloud.google.com/go` and `cloud.google.com/go/storage`);
/// the longest matching module path owns the import.
pub fn owning_requirement(requirements: &[DependencyInfo], import_path: &str) -> Option<usize> {
    requirements
        .iter()
        .enumerate()
        .filter(|(_, dep)| dep.provides(import_path))
        .max_by_key(|(_, dep)| dep.path.len())
        .map(|(index, _)| index)
}

/// The module download cache: GOMODCACHE, else the first GOPATH entry's
/// `pkg/mod`, else `~/go/pkg/mod`.
pub fn module_cache_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("GOMODCACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(gopath) = env::var_os("GOPATH").filter(|v| !v.is_empty()) {
        if let Some(first) = env::split_paths(&gopath).next() {
            return Some(first.join("pkg").join("mod"));
        }
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join("go").join("pkg").join("mod"))
}

/// Module cache encoding: every uppercase letter becomes `!` plus lowercase.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Directory of `path@version` inside the cache.
pub fn cached_module_dir(cache: &Path, dep: &DependencyInfo) -> PathBuf {
    cache.join(format!(
        "{}@{}",
        escape_module_path(&dep.path),
        escape_module_path(&dep.version)
    ))
}

fn enrich_from_cache(dep: &mut DependencyInfo, cache: &Path) -> anyhow::Result<()> {
    let dir = cached_module_dir(cache, dep);
    let metadata = match fs::metadata(&dir) {
        Ok(m) if m.is_dir() => m,
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    dep.last_updated = metadata.modified().ok().map(DateTime::<Utc>::from);
    dep.size = Some(directory_size(&dir)?);
    dep.license = detect_license(&dir)?;
    Ok(())
}

fn directory_size(dir: &Path) -> anyhow::Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

/// Identify the license of a module directory from its license file.
pub fn detect_license(dir: &Path) -> anyhow::Result<Option<String>> {
    for name in LICENSE_FILES {
        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => return Ok(Some(classify_license(&text).to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            // binary or non-UTF-8 license file
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Ok(Some("Unknown".to_string()))
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}

/// Map license text to an SPDX-like identifier.
pub fn classify_license(text: &str) -> &'static str {
    let id = LICENSE_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, id)| *id)
        .unwrap_or("Unknown");
    match id {
        "GPL" if text.contains("Version 3") => "GPL-3.0",
        "GPL" => "GPL-2.0",
        "LGPL" if text.contains("Version 3") => "LGPL-3.0",
        "LGPL" => "LGPL-2.1",
        other => other,
    }
}
