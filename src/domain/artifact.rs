use crate::domain::error::ResolutionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// `group:artifact[:extension[:classifier]]:version`
fn coordinate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^: ]+):([^: ]+)(:([^: ]*)(:([^: ]+))?)?:([^: ]+)$")
            .expect("coordinate regex")
    })
}

/// A package coordinate. Equality is over the coordinate only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub extension: String,
    pub classifier: Option<String>,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            extension: "jar".to_string(),
            classifier: None,
        }
    }

    /// Mediation key: `group:artifact`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    pub fn with_extension(&self, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            classifier: None,
            ..self.clone()
        }
    }

    /// Version ranges (`[1.0,2.0)`) and unresolved properties are not concrete versions.
    pub fn has_concrete_version(&self) -> bool {
        !self.version.is_empty()
            && !self.version.starts_with('[')
            && !self.version.starts_with('(')
            && !self.version.contains("${")
    }
}

impl FromStr for Artifact {
    type Err = ResolutionError;

    fn from_str(coordinate: &str) -> Result<Self, Self::Err> {
        let caps = coordinate_regex().captures(coordinate.trim()).ok_or_else(|| {
            ResolutionError::InvalidCoordinate {
                coordinate: coordinate.to_string(),
                reason: "expected <groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>"
                    .to_string(),
            }
        })?;
        let extension = caps
            .get(4)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("jar");
        Ok(Self {
            group_id: caps[1].to_string(),
            artifact_id: caps[2].to_string(),
            version: caps[7].to_string(),
            extension: extension.to_string(),
            classifier: caps.get(6).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
    System,
    Import,
}

impl Scope {
    pub fn parse(value: Option<&str>) -> Scope {
        match value.map(str::trim) {
            Some("runtime") => Scope::Runtime,
            Some("provided") => Scope::Provided,
            Some("test") => Scope::Test,
            Some("system") => Scope::System,
            Some("import") => Scope::Import,
            _ => Scope::Compile,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        }
    }

    /// Effective scope of a dependency declared with `child` scope by a node
    /// whose own scope is `parent`.
    pub fn derive(parent: Scope, child: Scope) -> Scope {
        match (parent, child) {
            (_, Scope::System | Scope::Test) => child,
            (Scope::Compile, _) => child,
            (Scope::Test | Scope::Runtime, _) => parent,
            (Scope::System | Scope::Provided, _) => Scope::Provided,
            _ => Scope::Runtime,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `group:artifact` pattern removed from a dependency's subtree; `*` matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        (self.group_id == "*" || self.group_id == artifact.group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact.artifact_id)
    }
}

/// A declared dependency: coordinate plus scope, optional flag and exclusions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub artifact: Artifact,
    pub scope: Scope,
    pub optional: bool,
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(artifact: Artifact, scope: Scope) -> Self {
        Self {
            artifact,
            scope,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn excluding(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }
}

/// The effective declaration of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub artifact: Option<Artifact>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
}
