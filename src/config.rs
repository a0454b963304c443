//! Command-line configuration of the designer binary.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "window-designer")]
#[command(about = "Visual designer for application window schemes")]
pub struct Config {
    /// Project directory to open at start
    #[arg(value_name = "PROJECT")]
    pub project: Option<PathBuf>,

    /// Template directory used for new projects
    #[arg(long, value_name = "DIR", default_value = "template")]
    pub template: PathBuf,

    /// Directory new projects are created in
    #[arg(long, value_name = "DIR", default_value = "packages")]
    pub projects_root: PathBuf,

    /// Tracing filter, overridden by RUST_LOG when set
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: None,
            template: PathBuf::from("template"),
            projects_root: PathBuf::from("packages"),
            log: "info".to_string(),
        }
    }
}

impl Config {
    /// Where a project called `name` is scaffolded.
    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.projects_root.join(name)
    }
}
