use std::path::PathBuf;

pub const REPOSITORY_ENV: &str = "DEPLINK_REPOSITORY";
pub const CLASSPATH_ENV: &str = "DEPLINK_CLASSPATH";

/// Runtime configuration shared by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the Maven-layout local repository.
    pub repository: PathBuf,
    /// Resolution-only classpath entries appended after the checked archives.
    pub extra_classpath: Vec<PathBuf>,
}

impl Settings {
    pub fn new(repository: Option<PathBuf>) -> Self {
        Self {
            repository: repository.unwrap_or_else(default_repository),
            extra_classpath: Vec::new(),
        }
    }

    pub fn with_extra_classpath(mut self, entries: Vec<PathBuf>) -> Self {
        self.extra_classpath = entries;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(None)
    }
}

/// `~/.m2/repository`, or `.m2/repository` relative to the working directory
/// when no home directory is known.
pub fn default_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".m2")
        .join("repository")
}
