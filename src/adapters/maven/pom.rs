//! Serde model of the parts of a `pom.xml` that affect dependency resolution.
//!
//! Everything else (build, profiles, reporting, ...) is ignored by the deserializer.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: HashMap<String, String>,
    pub dependency_management: Option<DependencyManagement>,
    pub dependencies: DependencyList,
}

impl Pom {
    pub fn parse(xml: &str) -> Result<Pom, quick_xml::DeError> {
        quick_xml::de::from_str(xml)
    }

    pub fn managed_dependencies(&self) -> &[PomDependency] {
        self.dependency_management
            .as_ref()
            .map(|m| m.dependencies.items.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DependencyManagement {
    pub dependencies: DependencyList,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyList {
    #[serde(default, rename = "dependency")]
    pub items: Vec<PomDependency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    pub exclusions: ExclusionList,
}

impl PomDependency {
    /// Management key: `group:artifact:type[:classifier]`.
    pub fn management_key(&self) -> String {
        let mut key = format!(
            "{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.kind.as_deref().unwrap_or("jar")
        );
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            key.push(':');
            key.push_str(classifier);
        }
        key
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExclusionList {
    #[serde(default, rename = "exclusion")]
    pub items: Vec<PomExclusion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: String,
}
