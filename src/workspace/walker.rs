//! Source walker: turns the Go files under a module root into packages.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::analysis::{get_analyzer, DeclarationKind, FileFacts};

use super::manifest::GoManifest;
use super::options::AnalysisOptions;
use super::types::{
    FieldInfo, FunctionInfo, InterfaceInfo, MethodInfo, PackageInfo, ParseFailure, StructInfo,
};

/// Directory holding vendored dependencies.
pub const VENDOR_DIR: &str = "vendor";

/// Packages and skipped files produced by one walk.
#[derive(Debug, Default)]
pub struct PackageModel {
    pub packages: Vec<PackageInfo>,
    pub parse_failures: Vec<ParseFailure>,
}

/// Whether a file name follows the Go test file convention.
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with("_test.go"))
        .unwrap_or(false)
}

/// Path relative to the root with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Iterate over every `.go` file the options allow, in file-name order.
///
/// Hidden directories, `testdata`, and `_`-prefixed directories are never
/// entered, matching what the go tool ignores.
pub fn walk_go_files<'a>(
    root: &'a Path,
    options: &AnalysisOptions,
) -> impl Iterator<Item = walkdir::Result<PathBuf>> + 'a {
    let exclude_vendor = options.exclude_vendor;
    let excluded = build_globset(&options.excluded_paths);

    let mut walker = WalkDir::new(root).sort_by_file_name();
    if options.max_depth > 0 {
        // files directly in a directory sit one level below it
        walker = walker.max_depth(options.max_depth + 1);
    }

    walker
        .into_iter()
        .filter_entry(move |e| keep_entry(root, e, exclude_vendor, &excluded))
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => {
                let is_go = e.path().extension().map(|x| x == "go").unwrap_or(false);
                is_go.then(|| Ok(e.into_path()))
            }
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
}

fn keep_entry(root: &Path, e: &DirEntry, exclude_vendor: bool, excluded: &GlobSet) -> bool {
    if e.depth() == 0 {
        return true;
    }
    let name = e.file_name().to_string_lossy();
    if e.file_type().is_dir() {
        if name.starts_with('.') || name.starts_with('_') || name == "testdata" {
            return false;
        }
        if exclude_vendor && name == VENDOR_DIR {
            return false;
        }
    }
    if !excluded.is_empty() && excluded.is_match(relative_path(root, e.path())) {
        return false;
    }
    true
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "exclude patterns unusable, excluding nothing");
        GlobSet::empty()
    })
}

/// Walk the module and build one `PackageInfo` per directory with Go files.
///
/// Unreadable or unparseable files are recorded in `parse_failures` and
/// skipped; the walk always continues.
pub fn build_package_model(
    root: &Path,
    manifest: &GoManifest,
    options: &AnalysisOptions,
) -> PackageModel {
    let mut model = PackageModel::default();
    let Some(analyzer) = get_analyzer("go") else {
        return model;
    };

    let paths: Vec<PathBuf> = walk_go_files(root, options)
        .filter_map(|entry| match entry {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                None
            }
        })
        .filter(|p| options.include_test_files || !is_test_file(p))
        .collect();

    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut imports: Vec<BTreeSet<String>> = Vec::new();

    for path in paths {
        let is_test = is_test_file(&path);
        let rel = relative_path(root, &path);
        let outcome = fs::read(&path)
            .map_err(anyhow::Error::from)
            .and_then(|source| analyzer.analyze(&path, &source));
        let facts = match outcome {
            Ok(facts) if !facts.has_parse_errors => facts,
            Ok(facts) => {
                let message = facts
                    .parse_error
                    .unwrap_or_else(|| "syntax error".to_string());
                warn!(file = %rel, %message, "skipping file that does not parse");
                model.parse_failures.push(ParseFailure { file: rel, message });
                continue;
            }
            Err(e) => {
                warn!(file = %rel, error = %e, "skipping file");
                model.parse_failures.push(ParseFailure {
                    file: rel,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let dir = path.parent().unwrap_or(root).to_path_buf();
        let slot = *index.entry(dir.clone()).or_insert_with(|| {
            model.packages.push(PackageInfo {
                import_path: import_path_for(root, &dir, &manifest.module_path),
                path: dir.clone(),
                ..PackageInfo::default()
            });
            imports.push(BTreeSet::new());
            model.packages.len() - 1
        });

        debug!(file = %rel, package = ?facts.package, "analyzed");
        let package = &mut model.packages[slot];
        add_file(package, &rel, &facts, is_test);
        imports[slot].extend(facts.imports.iter().map(|i| i.path.clone()));
    }

    for (package, seen) in model.packages.iter_mut().zip(imports) {
        package.external_imports = seen
            .iter()
            .filter(|i| manifest.is_external(i))
            .cloned()
            .collect();
        package.imports = seen.into_iter().collect();
        link_methods(package);
    }

    model.packages.sort_by(|a, b| a.path.cmp(&b.path));
    model
}

/// Import path of a package directory.
fn import_path_for(root: &Path, dir: &Path, module_path: &str) -> String {
    let rel = relative_path(root, dir);
    match (module_path.is_empty(), rel.is_empty()) {
        (_, true) => module_path.to_string(),
        (true, false) => rel,
        (false, false) => format!("{}/{}", module_path, rel),
    }
}

fn add_file(package: &mut PackageInfo, rel: &str, facts: &FileFacts, is_test: bool) {
    let file_package = facts.package.clone().unwrap_or_default();

    // External test packages (`foo_test`) never name the directory's package.
    let names_directory = !is_test || !file_package.ends_with("_test");
    if package.name.is_empty() || (names_directory && package.name.ends_with("_test")) {
        package.name = file_package.clone();
    }
    if !is_test && file_package == "main" {
        package.is_entry_point = true;
    }

    package.file_count += 1;
    package.line_count += facts.line_count;
    if is_test {
        package.test_files.push(rel.to_string());
    }

    for decl in &facts.declarations {
        match decl.kind {
            DeclarationKind::Function | DeclarationKind::Method => {
                let signature = decl.signature.clone().unwrap_or_default();
                let plain = decl.receiver.is_none();
                package.functions.push(FunctionInfo {
                    name: decl.name.clone(),
                    package: file_package.clone(),
                    receiver: decl.receiver.clone(),
                    file: rel.to_string(),
                    exported: decl.exported,
                    start_line: decl.span.start_line,
                    end_line: decl.span.end_line,
                    params: signature.params,
                    results: signature.results,
                    is_test: is_test
                        && plain
                        && (decl.name.starts_with("Test") || decl.name.starts_with("Fuzz")),
                    is_benchmark: is_test && plain && decl.name.starts_with("Benchmark"),
                    complexity: decl.complexity(),
                });
            }
            DeclarationKind::Struct => package.structs.push(StructInfo {
                name: decl.name.clone(),
                package: file_package.clone(),
                file: rel.to_string(),
                line: decl.span.start_line,
                exported: decl.exported,
                fields: decl
                    .fields
                    .iter()
                    .map(|f| FieldInfo {
                        name: f.name.clone(),
                        type_string: f.type_string.clone(),
                        tag: f.tag.clone(),
                        embedded: f.embedded,
                    })
                    .collect(),
                methods: Vec::new(),
            }),
            DeclarationKind::Interface => package.interfaces.push(InterfaceInfo {
                name: decl.name.clone(),
                package: file_package.clone(),
                file: rel.to_string(),
                line: decl.span.start_line,
                exported: decl.exported,
                methods: decl
                    .methods
                    .iter()
                    .map(|m| MethodInfo {
                        name: m.name.clone(),
                        signature: m.signature.render(),
                    })
                    .collect(),
                embedded: decl.embedded.clone(),
            }),
        }
    }
}

/// Attach methods to the structs named by their receivers.
fn link_methods(package: &mut PackageInfo) {
    for func in &package.functions {
        let Some(receiver) = func.receiver.as_deref() else {
            continue;
        };
        if let Some(st) = package.structs.iter_mut().find(|s| s.name == receiver) {
            st.methods.push(func.name.clone());
        }
    }
}
