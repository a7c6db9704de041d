//! Project selection and name list loading.
//!
//! A projects root holds one directory per game project and a
//! `current.txt` naming the active one:
//!
//! ```text
//! projects/
//!   current.txt        -> "LIMBO"
//!   LIMBO/
//!     files/
//!       game.filelist
//!       sounds.filelist
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::{HashList, Result};

/// File in the projects root naming the active project.
pub const CURRENT_PROJECT_FILE: &str = "current.txt";

/// Sub-directory of a project holding its name lists.
pub const LISTS_DIR: &str = "files";

/// A single project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    path: PathBuf,
}

impl Project {
    /// Open a project directory directly.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self { name, path }
    }

    /// Project name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project directory.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory searched for name lists.
    pub fn lists_path(&self) -> PathBuf {
        let lists = self.path.join(LISTS_DIR);
        if lists.is_dir() {
            lists
        } else {
            self.path.clone()
        }
    }

    /// Load every list matching `pattern` (e.g. `*.filelist`).
    pub fn load_lists(&self, pattern: &str) -> Result<HashList> {
        let dir = self.lists_path();
        let full = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            pattern
        );

        let mut list = HashList::new();
        for entry in glob::glob(&full)? {
            match entry {
                Ok(path) if path.is_file() => {
                    list.load_file(&path)?;
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping unreadable list {}: {}", e.path().display(), e),
            }
        }

        log::debug!("project {} has {} known names", self.name, list.len());
        Ok(list)
    }
}

/// Locates the active project under a projects root.
#[derive(Debug, Clone)]
pub struct ProjectManager {
    root: PathBuf,
    active: Option<Project>,
}

impl ProjectManager {
    /// Read the projects root.
    ///
    /// A missing `current.txt`, or one naming a directory that does not
    /// exist, leaves the manager without an active project.
    pub fn load<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        let current = root.join(CURRENT_PROJECT_FILE);

        let active = match fs::read_to_string(&current) {
            Ok(text) => {
                let name = text.lines().next().unwrap_or("").trim();
                let path = root.join(name);
                if !name.is_empty() && path.is_dir() {
                    Some(Project::new(path))
                } else {
                    log::debug!("active project {:?} not found under {}", name, root.display());
                    None
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self { root, active })
    }

    /// Projects root directory.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active project, if any.
    #[inline]
    pub fn active_project(&self) -> Option<&Project> {
        self.active.as_ref()
    }

    /// Load the active project's lists, or an empty list without one.
    pub fn load_lists(&self, pattern: &str) -> Result<HashList> {
        match &self.active {
            Some(project) => project.load_lists(pattern),
            None => Ok(HashList::new()),
        }
    }
}
