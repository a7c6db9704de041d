//! Entry name resolution.

use std::path::{Component, Path, MAIN_SEPARATOR};

use limbo_common::{HashList, Project, ProjectManager};

use crate::Result;

/// Suffix marking a zlib-compressed container entry.
pub const CONTAINER_SUFFIX: &str = ".d";

/// Directory unknown entries are extracted under.
pub const UNKNOWN_DIR: &str = "__UNKNOWN";

/// The active project and its loaded names.
///
/// Built once before extraction and passed to the extractor by reference.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    project: Option<Project>,
    names: HashList,
}

impl ProjectContext {
    pub fn new(project: Option<Project>, names: HashList) -> Self {
        Self { project, names }
    }

    /// Context with names only and no project.
    pub fn from_names(names: HashList) -> Self {
        Self::new(None, names)
    }

    /// Load the manager's active project and every list matching `pattern`.
    pub fn load(manager: &ProjectManager, pattern: &str) -> Result<Self> {
        let names = manager.load_lists(pattern)?;
        Ok(Self::new(manager.active_project().cloned(), names))
    }

    #[inline]
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    #[inline]
    pub fn names(&self) -> &HashList {
        &self.names
    }

    /// Resolve a name hash against the loaded names.
    #[inline]
    pub fn resolve(&self, name_hash: u32) -> Option<String> {
        resolve(name_hash, &self.names)
    }
}

/// Turn a name hash into a relative output path.
///
/// Separators are converted to the platform's and a single leading
/// separator is dropped. Returns `None` for unknown hashes.
pub fn resolve(name_hash: u32, names: &HashList) -> Option<String> {
    names.get(name_hash).map(to_relative_path)
}

fn to_relative_path(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect();

    match name.strip_prefix(MAIN_SEPARATOR) {
        Some(rest) => rest.to_string(),
        None => name,
    }
}

/// Check that `name` stays inside whatever root it is joined to.
///
/// Only plain components are allowed: no root, drive prefix, `.` or `..`.
pub fn is_contained(name: &str) -> bool {
    let mut components = Path::new(name).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// Output name for an entry without a known path.
pub fn unknown_name(name_hash: u32) -> String {
    format!("{}{}{:08X}", UNKNOWN_DIR, MAIN_SEPARATOR, name_hash)
}

/// Strip the container suffix, returning the real file name.
///
/// Returns `None` when `name` is not a container name.
pub fn container_stem(name: &str) -> Option<&str> {
    name.strip_suffix(CONTAINER_SUFFIX)
        .filter(|stem| !stem.is_empty() && !stem.ends_with(MAIN_SEPARATOR))
}
