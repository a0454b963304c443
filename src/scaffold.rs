//! Creating a new project directory from a template.

use std::fs;
use std::io;
use std::path::{Component, Path};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ScaffoldError;
use crate::package::{API_FILE, METADATA_FILE, SCHEME_FILE};
use crate::project::PreloadEntry;

/// Token replaced by the project name in every copied text file.
pub const PLACEHOLDER: &str = "EXAMPLE";

/// Produces a fresh project directory. Knows nothing about the document
/// inside; it only copies files.
pub trait Scaffold {
    fn create_project(
        &self,
        name: &str,
        template_root: &Path,
        destination: &Path,
    ) -> Result<(), ScaffoldError>;
}

/// Copies `metadata.json`, each local preload file, `scheme.html` and
/// `api.js` from a template directory, substituting the placeholder.
#[derive(Clone, Debug)]
pub struct TemplateScaffold {
    pub placeholder: String,
}

impl Default for TemplateScaffold {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TemplateMetadata {
    #[serde(default)]
    preload: Vec<PreloadEntry>,
}

fn io_err<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> ScaffoldError + 'a {
    move |source| ScaffoldError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// Reads a template file; a missing file reads as `fallback`.
fn read_or(path: &Path, fallback: &str) -> Result<String, ScaffoldError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "template file missing");
            Ok(fallback.to_string())
        }
        Err(e) => Err(io_err("failed to read", path)(e)),
    }
}

/// Only plain relative paths stay inside the destination.
fn is_contained(src: &str) -> bool {
    let path = Path::new(src);
    !src.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl TemplateScaffold {
    fn substitute(&self, content: &str, name: &str) -> String {
        content.replace(&self.placeholder, name)
    }

    fn copy_text(
        &self,
        name: &str,
        template_root: &Path,
        destination: &Path,
        src: &str,
    ) -> Result<(), ScaffoldError> {
        let content = read_or(&template_root.join(src), "")?;
        let target = destination.join(src);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_err("failed to create", parent))?;
        }
        fs::write(&target, self.substitute(&content, name))
            .map_err(io_err("failed to write", &target))
    }
}

impl Scaffold for TemplateScaffold {
    fn create_project(
        &self,
        name: &str,
        template_root: &Path,
        destination: &Path,
    ) -> Result<(), ScaffoldError> {
        match fs::remove_dir_all(destination) {
            Ok(()) => debug!(path = %destination.display(), "cleared destination"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err("failed to clear", destination)(e)),
        }
        fs::create_dir_all(destination).map_err(io_err("failed to create", destination))?;

        let metadata = self.substitute(&read_or(&template_root.join(METADATA_FILE), "{}")?, name);
        let target = destination.join(METADATA_FILE);
        fs::write(&target, &metadata).map_err(io_err("failed to write", &target))?;
        let template: TemplateMetadata = serde_json::from_str(&metadata)?;

        let files = template
            .preload
            .iter()
            .map(|entry| (entry.src.as_str(), entry.is_remote()))
            .chain([(SCHEME_FILE, false)]);
        for (src, remote) in files {
            if remote {
                debug!(src, "skipping remote preload");
                continue;
            }
            if !is_contained(src) {
                warn!(src, "skipping preload outside the project");
                continue;
            }
            self.copy_text(name, template_root, destination, src)?;
        }

        let api = template_root.join(API_FILE);
        if api.is_file() {
            let target = destination.join(API_FILE);
            fs::copy(&api, &target).map_err(io_err("failed to copy", &api))?;
        }

        info!(name, path = %destination.display(), "project scaffolded");
        Ok(())
    }
}
