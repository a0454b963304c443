//! On-disk project layout: `metadata.json` next to `scheme.html`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::PackageError;
use crate::project::Project;

pub const METADATA_FILE: &str = "metadata.json";
pub const SCHEME_FILE: &str = "scheme.html";
pub const API_FILE: &str = "api.js";

/// Reads the project stored in `dir`.
pub fn load(dir: &Path) -> Result<Project, PackageError> {
    let metadata = read(&dir.join(METADATA_FILE))?;
    let scheme = read(&dir.join(SCHEME_FILE))?;

    let mut project = Project::from_sources(&scheme, &metadata)?;
    project.path = Some(dir.to_path_buf());
    info!(path = %dir.display(), name = %project.name, "project opened");
    Ok(project)
}

/// Writes the project back to the directory it came from.
pub fn save(project: &Project) -> Result<(), PackageError> {
    let dir = project.path.as_deref().ok_or(PackageError::NoPath)?;
    write_files(project, dir)
}

/// Writes the project into `dir` and remembers it as the project location.
pub fn save_to(project: &mut Project, dir: &Path) -> Result<(), PackageError> {
    fs::create_dir_all(dir).map_err(|source| PackageError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    write_files(project, dir)?;
    project.path = Some(dir.to_path_buf());
    Ok(())
}

fn write_files(project: &Project, dir: &Path) -> Result<(), PackageError> {
    let (scheme, metadata) = project.save()?;
    write(&dir.join(SCHEME_FILE), &scheme)?;
    write(&dir.join(METADATA_FILE), &metadata)?;
    info!(path = %dir.display(), name = %project.name, "project saved");
    Ok(())
}

fn read(path: &Path) -> Result<String, PackageError> {
    fs::read_to_string(path).map_err(|source| PackageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), PackageError> {
    fs::write(path, contents).map_err(|source| PackageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Which section of the file list an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileGroup {
    Project,
    Preload,
    Server,
}

impl FileGroup {
    pub const ALL: [FileGroup; 3] = [FileGroup::Project, FileGroup::Preload, FileGroup::Server];

    pub const fn label(&self) -> &'static str {
        match self {
            FileGroup::Project => "Project",
            FileGroup::Preload => "Preload",
            FileGroup::Server => "Server",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectFile {
    pub group: FileGroup,
    pub label: String,
    /// Location on disk, when the project has one.
    pub path: Option<PathBuf>,
    pub mime: &'static str,
}

/// Files that make up the project package.
pub fn project_files(project: &Project) -> Vec<ProjectFile> {
    let locate = |name: &str| project.path.as_ref().map(|dir| dir.join(name));
    let mut files = vec![
        ProjectFile {
            group: FileGroup::Project,
            label: METADATA_FILE.to_string(),
            path: locate(METADATA_FILE),
            mime: "application/json",
        },
        ProjectFile {
            group: FileGroup::Project,
            label: SCHEME_FILE.to_string(),
            path: locate(SCHEME_FILE),
            mime: "text/html",
        },
    ];
    files.extend(project.metadata.preload.iter().map(|entry| ProjectFile {
        group: FileGroup::Preload,
        label: entry.src.clone(),
        path: if entry.is_remote() {
            None
        } else {
            locate(&entry.src)
        },
        mime: entry.mime(),
    }));
    files.push(ProjectFile {
        group: FileGroup::Server,
        label: API_FILE.to_string(),
        path: locate(API_FILE),
        mime: "application/javascript",
    });
    files
}
