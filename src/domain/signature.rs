use serde::{Deserialize, Serialize};
use std::fmt;

/// A method identified by name and raw descriptor, e.g. `("append", "(I)Ljava/lang/StringBuilder;")`.
///
/// Identity is descriptor-level: two overloads differing only in return type are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub descriptor: String,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// A method signature bound to the binary (dotted) name of the class it targets.
/// This is the unit of linkage resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FullyQualifiedMethodSignature {
    pub class_name: String,
    pub signature: MethodSignature,
}

impl FullyQualifiedMethodSignature {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            signature: MethodSignature::new(name, descriptor),
        }
    }

    pub fn method_name(&self) -> &str {
        &self.signature.name
    }

    pub fn descriptor(&self) -> &str {
        &self.signature.descriptor
    }

    /// Array types (`[I`, `[Ljava.lang.String;`) have no class file; their
    /// methods (`clone`, those of `Object`) are provided by the VM.
    pub fn targets_array(&self) -> bool {
        self.class_name.starts_with('[')
    }
}

impl fmt::Display for FullyQualifiedMethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Class: '{}', method: '{}' with descriptor {}",
            self.class_name, self.signature.name, self.signature.descriptor
        )
    }
}
