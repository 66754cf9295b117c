//! Static linkage checking: which method references made by a set of
//! archives resolve to nothing on a classpath built from those archives.

use crate::classfile::{ClassFile, class_file_path};
use crate::domain::class_dumper;
use crate::domain::classpath::{ClassLookup, Classpath};
use crate::domain::error::LinkageError;
use crate::domain::ports::{ArchiveOpener, ClassArchive, ClassRepository};
use crate::domain::signature::FullyQualifiedMethodSignature;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct LinkageChecker {
    opener: Arc<dyn ArchiveOpener>,
}

impl LinkageChecker {
    pub fn new(opener: Arc<dyn ArchiveOpener>) -> Self {
        Self { opener }
    }

    /// Method references from the archive's classes whose target class is
    /// not part of the archive.
    pub fn list_external_method_references(
        &self,
        archive_path: &Path,
    ) -> Result<Vec<FullyQualifiedMethodSignature>, LinkageError> {
        let archive = self.opener.open(archive_path)?;
        external_method_references(archive.as_ref())
    }

    /// References from `references` that resolve to nothing on `classpath`.
    pub fn find_unresolved_references(
        &self,
        classpath: &[PathBuf],
        references: &[FullyQualifiedMethodSignature],
    ) -> Result<Vec<FullyQualifiedMethodSignature>, LinkageError> {
        let classpath = Classpath::open(self.opener.as_ref(), classpath)?;
        ResolutionContext::new().find_unresolved(&classpath, references)
    }

    /// Checks the archives against each other.
    pub fn generate_static_linkage_report(
        &self,
        archive_paths: &[PathBuf],
    ) -> Result<Vec<FullyQualifiedMethodSignature>, LinkageError> {
        self.check(archive_paths, &[])
    }

    /// Like [`Self::generate_static_linkage_report`], with `extra_classpath`
    /// appended after the inputs for resolution only. Extra entries are never scanned.
    pub fn check(
        &self,
        inputs: &[PathBuf],
        extra_classpath: &[PathBuf],
    ) -> Result<Vec<FullyQualifiedMethodSignature>, LinkageError> {
        // Opening every input first makes an unreadable file fail the batch
        // before any extraction work starts.
        let archives = inputs
            .iter()
            .map(|path| self.opener.open(path))
            .collect::<Result<Vec<_>, _>>()?;

        let per_archive = archives
            .par_iter()
            .map(|archive| external_method_references(archive.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        let mut references = Vec::new();
        for reference in per_archive.into_iter().flatten() {
            if seen.insert(reference.clone()) {
                references.push(reference);
            }
        }
        tracing::debug!(
            archives = inputs.len(),
            external_references = references.len(),
            "collected external method references"
        );

        let mut entries = archives;
        for path in extra_classpath {
            entries.push(self.opener.open(path)?);
        }
        let classpath = Classpath::new(entries);

        let unresolved = ResolutionContext::new().find_unresolved(&classpath, &references)?;
        tracing::info!(
            archives = inputs.len(),
            checked = references.len(),
            unresolved = unresolved.len(),
            "static linkage check finished"
        );
        Ok(unresolved)
    }
}

/// Top-level class of a binary name: everything before the first `$`.
fn top_level_name(binary_name: &str) -> &str {
    binary_name.split('$').next().unwrap_or(binary_name)
}

/// Groups the archive's class names into top-level families, in entry order.
/// Nested class files without their top-level class are ignored.
fn class_families(archive: &dyn ClassArchive) -> Vec<(String, Vec<String>)> {
    let mut top_level: Vec<String> = Vec::new();
    let mut nested: HashMap<String, Vec<String>> = HashMap::new();

    for name in archive.class_names() {
        let top = top_level_name(&name);
        if top.len() == name.len() {
            top_level.push(name);
        } else {
            let top = top.to_string();
            nested.entry(top).or_default().push(name);
        }
    }

    top_level
        .into_iter()
        .map(|top| {
            let members = nested.remove(&top).unwrap_or_default();
            (top, members)
        })
        .collect()
}

fn decode_from_archive(
    archive: &dyn ClassArchive,
    binary_name: &str,
) -> Result<ClassFile, LinkageError> {
    let bytes = archive
        .read_class(binary_name)?
        .ok_or_else(|| LinkageError::Archive {
            path: archive.location().to_path_buf(),
            reason: format!("listed entry {} cannot be read", class_file_path(binary_name)),
        })?;
    ClassFile::parse(&bytes).map_err(|source| LinkageError::ClassDecode {
        class_name: binary_name.to_string(),
        source,
    })
}

fn decode_error(class_name: &str, source: crate::classfile::ClassFormatError) -> LinkageError {
    LinkageError::ClassDecode {
        class_name: class_name.to_string(),
        source,
    }
}

/// External method references of one archive, deduplicated in first-seen order.
///
/// Every top-level class is decoded together with the nested class files of
/// its family. A reference is internal when its target is a top-level class
/// of the archive or appears in a family's inner-class tables.
pub fn external_method_references(
    archive: &dyn ClassArchive,
) -> Result<Vec<FullyQualifiedMethodSignature>, LinkageError> {
    let mut internal_names: HashSet<String> = HashSet::new();
    let mut references: Vec<FullyQualifiedMethodSignature> = Vec::new();

    for (top_level, members) in class_families(archive) {
        let class = decode_from_archive(archive, &top_level)?;
        let class_name = class.class_name();
        internal_names.insert(class_name.clone());
        internal_names.extend(
            class_dumper::inner_class_names(&class).map_err(|e| decode_error(&class_name, e))?,
        );
        references.extend(
            class_dumper::method_references(&class).map_err(|e| decode_error(&class_name, e))?,
        );

        for member in members {
            let nested = decode_from_archive(archive, &member)?;
            internal_names.insert(nested.class_name());
            internal_names.extend(
                class_dumper::inner_class_names(&nested).map_err(|e| decode_error(&member, e))?,
            );
            references.extend(
                class_dumper::method_references(&nested).map_err(|e| decode_error(&member, e))?,
            );
        }
    }

    let mut seen = HashSet::new();
    let external: Vec<_> = references
        .into_iter()
        .filter(|r| !internal_names.contains(&r.class_name))
        .filter(|r| seen.insert(r.clone()))
        .collect();

    tracing::debug!(
        archive = %archive.location().display(),
        internal_classes = internal_names.len(),
        external_references = external.len(),
        "scanned archive"
    );
    Ok(external)
}

/// Caches shared by all lookups of one resolution pass.
///
/// The pass is the single writer; a parallel caller must wrap the context in
/// a mutex, since every `resolve` call may read what the previous one wrote.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    missing_classes: HashSet<String>,
    loaded_classes: HashSet<String>,
    available_methods: HashSet<FullyQualifiedMethodSignature>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known_missing(&self, class_name: &str) -> bool {
        self.missing_classes.contains(class_name)
    }

    pub fn is_known_available(&self, reference: &FullyQualifiedMethodSignature) -> bool {
        self.available_methods.contains(reference)
    }

    /// Whether `reference` resolves through `repository`. Each class name is
    /// looked up at most once per context.
    pub fn resolve(
        &mut self,
        repository: &dyn ClassRepository,
        reference: &FullyQualifiedMethodSignature,
    ) -> Result<bool, LinkageError> {
        if reference.targets_array() {
            return Ok(true);
        }
        if self.missing_classes.contains(&reference.class_name) {
            return Ok(false);
        }
        if self.available_methods.contains(reference) {
            return Ok(true);
        }
        if self.loaded_classes.contains(&reference.class_name) {
            return Ok(false);
        }

        match repository.find_class(&reference.class_name)? {
            ClassLookup::NotFound => {
                tracing::debug!(class = %reference.class_name, "class not found on classpath");
                self.missing_classes.insert(reference.class_name.clone());
                Ok(false)
            }
            ClassLookup::Found(class) => {
                self.loaded_classes.insert(reference.class_name.clone());
                self.available_methods.extend(
                    class_dumper::declared_methods(&class)
                        .into_iter()
                        .map(|signature| FullyQualifiedMethodSignature {
                            class_name: reference.class_name.clone(),
                            signature,
                        }),
                );
                Ok(self.available_methods.contains(reference))
            }
        }
    }

    /// The unresolved subset of `references`, each reported once, in input order.
    pub fn find_unresolved(
        &mut self,
        repository: &dyn ClassRepository,
        references: &[FullyQualifiedMethodSignature],
    ) -> Result<Vec<FullyQualifiedMethodSignature>, LinkageError> {
        let mut reported = HashSet::new();
        let mut unresolved = Vec::new();
        for reference in references {
            if !self.resolve(repository, reference)? && reported.insert(reference.clone()) {
                unresolved.push(reference.clone());
            }
        }
        Ok(unresolved)
    }
}
