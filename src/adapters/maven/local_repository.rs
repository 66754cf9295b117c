use super::pom::{Pom, PomDependency};
use crate::domain::artifact::{Artifact, ArtifactDescriptor, Dependency, Exclusion, Scope};
use crate::domain::error::ResolutionError;
use crate::domain::ports::ArtifactDescriptorReader;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

const MAX_INTERPOLATION_PASSES: usize = 16;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex"))
}

/// Model after parent inheritance, before interpolation.
struct InheritedModel {
    group_id: String,
    artifact_id: String,
    version: String,
    parent: Option<(String, String, String)>,
    properties: HashMap<String, String>,
    dependencies: Vec<PomDependency>,
    managed: Vec<PomDependency>,
}

/// Interpolated model with dependency management applied.
#[derive(Debug)]
struct EffectiveModel {
    dependencies: Vec<Dependency>,
    managed: Vec<Dependency>,
}

/// Artifact metadata read from a Maven-layout directory (e.g. `~/.m2/repository`).
///
/// Effective models are memoised for the lifetime of the instance.
pub struct LocalRepository {
    root: PathBuf,
    models: RwLock<HashMap<String, Arc<EffectiveModel>>>,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            models: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<group as dirs>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<extension>`
    pub fn artifact_path(&self, artifact: &Artifact) -> PathBuf {
        let mut file_name = format!("{}-{}", artifact.artifact_id, artifact.version);
        if let Some(classifier) = &artifact.classifier {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        file_name.push('.');
        file_name.push_str(&artifact.extension);

        let mut path = self.root.clone();
        path.extend(artifact.group_id.split('.'));
        path.push(&artifact.artifact_id);
        path.push(&artifact.version);
        path.push(file_name);
        path
    }

    fn read_pom(&self, group_id: &str, artifact_id: &str, version: &str) -> Result<Pom, ResolutionError> {
        let pom_artifact = Artifact::new(group_id, artifact_id, version).with_extension("pom");
        let path = self.artifact_path(&pom_artifact);
        let xml = match std::fs::read_to_string(&path) {
            Ok(xml) => xml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResolutionError::ArtifactNotFound {
                    artifact: pom_artifact.to_string(),
                    location: path,
                });
            }
            Err(source) => return Err(ResolutionError::Io { path, source }),
        };
        tracing::trace!(path = %path.display(), "reading pom");
        Pom::parse(&xml).map_err(|e| ResolutionError::MalformedDescriptor {
            artifact: pom_artifact.to_string(),
            reason: e.to_string(),
        })
    }

    fn inherited_model(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        lineage: &mut Vec<String>,
    ) -> Result<InheritedModel, ResolutionError> {
        let key = format!("{}:{}:{}", group_id, artifact_id, version);
        if lineage.contains(&key) {
            return Err(ResolutionError::ParentCycle { artifact: key });
        }
        lineage.push(key);

        let pom = self.read_pom(group_id, artifact_id, version)?;
        let parent = match &pom.parent {
            Some(p) => Some(self.inherited_model(
                p.group_id.trim(),
                p.artifact_id.trim(),
                p.version.trim(),
                lineage,
            )?),
            None => None,
        };
        lineage.pop();

        Ok(inherit(pom, parent, group_id, artifact_id, version))
    }

    fn effective_model(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        imports: &mut Vec<String>,
    ) -> Result<Arc<EffectiveModel>, ResolutionError> {
        let key = format!("{}:{}:{}", group_id, artifact_id, version);
        if let Some(model) = self
            .models
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(model));
        }
        if imports.contains(&key) {
            return Err(ResolutionError::MalformedDescriptor {
                artifact: key,
                reason: "dependency management import cycle".to_string(),
            });
        }
        imports.push(key.clone());

        let inherited = self.inherited_model(group_id, artifact_id, version, &mut Vec::new())?;
        let context = interpolation_context(&inherited);
        let interpolate_all =
            |deps: &[PomDependency]| deps.iter().map(|d| interpolate_dependency(d, &context)).collect::<Vec<_>>();

        let mut managed = Vec::new();
        let mut managed_keys = HashSet::new();
        let mut imported = Vec::new();
        for entry in interpolate_all(&inherited.managed) {
            let is_import = entry.scope.as_deref() == Some("import")
                && entry.kind.as_deref() == Some("pom");
            if is_import {
                let bom_version = entry.version.clone().unwrap_or_default();
                if !is_concrete(&bom_version) {
                    return Err(ResolutionError::UnsupportedVersion {
                        artifact: format!("{}:{}", entry.group_id, entry.artifact_id),
                        version: bom_version,
                    });
                }
                let bom = self.effective_model(&entry.group_id, &entry.artifact_id, &bom_version, imports)?;
                imported.extend(bom.managed.iter().cloned());
            } else if managed_keys.insert(entry.management_key()) {
                managed.push(entry);
            }
        }

        let mut dependencies = Vec::new();
        for declared in interpolate_all(&inherited.dependencies) {
            let managed_entry = managed
                .iter()
                .find(|m| m.management_key() == declared.management_key());
            let mut declared = apply_management(declared, managed_entry);
            if declared.version.is_none()
                && let Some(m) = imported.iter().find(|m| same_key(m, &declared))
            {
                declared.version = Some(m.artifact.version.clone());
                if declared.scope.is_none() {
                    declared.scope = Some(m.scope.as_str().to_string());
                }
            }
            dependencies.push(to_dependency(&declared, &key)?);
        }

        let mut managed_dependencies = Vec::new();
        for entry in managed.iter().filter(|m| m.version.is_some()) {
            managed_dependencies.push(to_dependency(entry, &key)?);
        }
        for entry in imported {
            let entry_key = management_key_of(&entry);
            if managed_keys.insert(entry_key) {
                managed_dependencies.push(entry);
            }
        }

        imports.pop();
        let model = Arc::new(EffectiveModel {
            dependencies,
            managed: managed_dependencies,
        });
        self.models
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, Arc::clone(&model));
        Ok(model)
    }
}

impl ArtifactDescriptorReader for LocalRepository {
    fn read_descriptor(&self, artifact: &Artifact) -> Result<ArtifactDescriptor, ResolutionError> {
        if !artifact.has_concrete_version() {
            return Err(ResolutionError::UnsupportedVersion {
                artifact: artifact.key(),
                version: artifact.version.clone(),
            });
        }
        let model = self.effective_model(
            &artifact.group_id,
            &artifact.artifact_id,
            &artifact.version,
            &mut Vec::new(),
        )?;
        Ok(ArtifactDescriptor {
            artifact: Some(artifact.clone()),
            dependencies: model.dependencies.clone(),
            managed_dependencies: model.managed.clone(),
        })
    }

    fn locate_artifact(&self, artifact: &Artifact) -> Result<PathBuf, ResolutionError> {
        let path = self.artifact_path(artifact);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ResolutionError::ArtifactNotFound {
                artifact: artifact.to_string(),
                location: path,
            })
        }
    }
}

fn inherit(
    pom: Pom,
    parent: Option<InheritedModel>,
    group_id: &str,
    artifact_id: &str,
    version: &str,
) -> InheritedModel {
    let managed_own = pom.managed_dependencies().to_vec();
    let Pom {
        parent: parent_ref,
        properties,
        dependencies,
        ..
    } = pom;

    let mut model = parent.unwrap_or_else(|| InheritedModel {
        group_id: String::new(),
        artifact_id: String::new(),
        version: String::new(),
        parent: None,
        properties: HashMap::new(),
        dependencies: Vec::new(),
        managed: Vec::new(),
    });
    model.parent = parent_ref.map(|p| {
        (
            p.group_id.trim().to_string(),
            p.artifact_id.trim().to_string(),
            p.version.trim().to_string(),
        )
    });
    model.group_id = group_id.to_string();
    model.artifact_id = artifact_id.to_string();
    model.version = version.to_string();
    model.properties.extend(properties);

    // Own declarations first; inherited ones the child does not redeclare follow.
    let inherited_deps = std::mem::take(&mut model.dependencies);
    let own_keys: HashSet<String> = dependencies.items.iter().map(PomDependency::management_key).collect();
    model.dependencies = dependencies.items;
    model
        .dependencies
        .extend(inherited_deps.into_iter().filter(|d| !own_keys.contains(&d.management_key())));

    let inherited_managed = std::mem::take(&mut model.managed);
    let own_keys: HashSet<String> = managed_own.iter().map(PomDependency::management_key).collect();
    model.managed = managed_own;
    model
        .managed
        .extend(inherited_managed.into_iter().filter(|d| !own_keys.contains(&d.management_key())));
    model
}

fn interpolation_context(model: &InheritedModel) -> HashMap<String, String> {
    let mut context = model.properties.clone();
    for prefix in ["project", "pom"] {
        context.insert(format!("{prefix}.groupId"), model.group_id.clone());
        context.insert(format!("{prefix}.artifactId"), model.artifact_id.clone());
        context.insert(format!("{prefix}.version"), model.version.clone());
        if let Some((g, a, v)) = &model.parent {
            context.insert(format!("{prefix}.parent.groupId"), g.clone());
            context.insert(format!("{prefix}.parent.artifactId"), a.clone());
            context.insert(format!("{prefix}.parent.version"), v.clone());
        }
    }
    context
        .entry("version".to_string())
        .or_insert_with(|| model.version.clone());
    context
        .entry("groupId".to_string())
        .or_insert_with(|| model.group_id.clone());
    context
}

/// Replaces `${name}` placeholders; unknown ones are left as written.
pub(crate) fn interpolate(value: &str, context: &HashMap<String, String>) -> String {
    let mut current = value.trim().to_string();
    for _ in 0..MAX_INTERPOLATION_PASSES {
        if !current.contains("${") {
            break;
        }
        let next = placeholder_regex()
            .replace_all(&current, |caps: &Captures| {
                context
                    .get(caps[1].trim())
                    .map(|v| v.trim().to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn interpolate_dependency(dep: &PomDependency, context: &HashMap<String, String>) -> PomDependency {
    let field = |v: &Option<String>| {
        v.as_deref()
            .map(|s| interpolate(s, context))
            .filter(|s| !s.is_empty())
    };
    let mut out = PomDependency {
        group_id: interpolate(&dep.group_id, context),
        artifact_id: interpolate(&dep.artifact_id, context),
        version: field(&dep.version),
        kind: field(&dep.kind),
        classifier: field(&dep.classifier),
        scope: field(&dep.scope),
        optional: field(&dep.optional),
        exclusions: dep.exclusions.clone(),
    };
    for exclusion in &mut out.exclusions.items {
        exclusion.group_id = interpolate(&exclusion.group_id, context);
        exclusion.artifact_id = interpolate(&exclusion.artifact_id, context);
    }
    out
}

fn apply_management(mut declared: PomDependency, managed: Option<&PomDependency>) -> PomDependency {
    let Some(managed) = managed else {
        return declared;
    };
    if declared.version.is_none() {
        declared.version = managed.version.clone();
    }
    if declared.scope.is_none() {
        declared.scope = managed.scope.clone();
    }
    if declared.optional.is_none() {
        declared.optional = managed.optional.clone();
    }
    if declared.exclusions.items.is_empty() {
        declared.exclusions = managed.exclusions.clone();
    }
    declared
}

fn same_key(managed: &Dependency, declared: &PomDependency) -> bool {
    managed.artifact.group_id == declared.group_id
        && managed.artifact.artifact_id == declared.artifact_id
        && managed.artifact.classifier.as_deref() == declared.classifier.as_deref()
}

fn management_key_of(dep: &Dependency) -> String {
    let mut key = format!(
        "{}:{}:{}",
        dep.artifact.group_id, dep.artifact.artifact_id, dep.artifact.extension
    );
    if let Some(classifier) = &dep.artifact.classifier {
        key.push(':');
        key.push_str(classifier);
    }
    key
}

fn is_concrete(version: &str) -> bool {
    Artifact::new("g", "a", version).has_concrete_version()
}

/// Maps a POM `type` to the file extension and implied classifier.
fn extension_of(kind: Option<&str>) -> (&str, Option<&'static str>) {
    match kind.unwrap_or("jar") {
        "test-jar" => ("jar", Some("tests")),
        "bundle" | "maven-plugin" | "ejb" | "ejb-client" | "java-source" | "javadoc" => ("jar", None),
        other => (other, None),
    }
}

fn to_dependency(dep: &PomDependency, owner: &str) -> Result<Dependency, ResolutionError> {
    if dep.group_id.is_empty() || dep.artifact_id.is_empty() {
        return Err(ResolutionError::MalformedDescriptor {
            artifact: owner.to_string(),
            reason: "dependency without groupId or artifactId".to_string(),
        });
    }
    let scope = Scope::parse(dep.scope.as_deref());
    let Some(version) = dep.version.clone() else {
        return Err(ResolutionError::MalformedDescriptor {
            artifact: owner.to_string(),
            reason: format!("dependency {}:{} has no version", dep.group_id, dep.artifact_id),
        });
    };
    if !is_concrete(&version) && !matches!(scope, Scope::Test | Scope::Provided) {
        return Err(ResolutionError::UnsupportedVersion {
            artifact: format!("{}:{}", dep.group_id, dep.artifact_id),
            version,
        });
    }

    let (extension, implied_classifier) = extension_of(dep.kind.as_deref());
    let artifact = Artifact {
        group_id: dep.group_id.clone(),
        artifact_id: dep.artifact_id.clone(),
        version,
        extension: extension.to_string(),
        classifier: dep
            .classifier
            .clone()
            .or_else(|| implied_classifier.map(str::to_string)),
    };
    Ok(Dependency {
        artifact,
        scope,
        optional: dep.optional.as_deref() == Some("true"),
        exclusions: dep
            .exclusions
            .items
            .iter()
            .map(|e| Exclusion::new(e.group_id.trim(), e.artifact_id.trim()))
            .collect(),
    })
}
