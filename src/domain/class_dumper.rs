//! Extraction of declared methods, call targets and inner-class tables from
//! decoded classes.

use crate::classfile::bytecode::Instructions;
use crate::classfile::{ClassFile, ClassFormatError, to_binary_name};
use crate::domain::signature::{FullyQualifiedMethodSignature, MethodSignature};
use std::collections::HashSet;

/// Every method the class itself declares, constructors and static initialisers included.
pub fn declared_methods(class: &ClassFile) -> Vec<MethodSignature> {
    class
        .methods
        .iter()
        .map(|m| MethodSignature::new(m.name.clone(), m.descriptor.clone()))
        .collect()
}

/// Declared methods bound to the class's binary name.
pub fn methods_on_class(class: &ClassFile) -> Vec<FullyQualifiedMethodSignature> {
    let class_name = class.class_name();
    declared_methods(class)
        .into_iter()
        .map(|signature| FullyQualifiedMethodSignature {
            class_name: class_name.clone(),
            signature,
        })
        .collect()
}

/// Targets of every `invokevirtual`/`invokespecial`/`invokestatic`/`invokeinterface`
/// in every method body, synthetic and bridge methods included.
/// Deduplicated, in first-seen order.
pub fn method_references(
    class: &ClassFile,
) -> Result<Vec<FullyQualifiedMethodSignature>, ClassFormatError> {
    let pool = &class.constant_pool;
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for method in &class.methods {
        let Some(code) = method.code(pool)? else {
            continue;
        };
        for instruction in Instructions::new(&code.code) {
            let Some(index) = instruction?.invoke_target() else {
                continue;
            };
            let target = pool.method_ref(index)?;
            let reference = FullyQualifiedMethodSignature::new(
                to_binary_name(target.class_name),
                target.name,
                target.descriptor,
            );
            if seen.insert(reference.clone()) {
                references.push(reference);
            }
        }
    }
    Ok(references)
}

/// Binary names from the class's `InnerClasses` table that belong to it.
///
/// A row is kept when it has no outer class, or when its outer class is the
/// class under inspection; rows describing nesting inside other classes are
/// dropped.
pub fn inner_class_names(class: &ClassFile) -> Result<HashSet<String>, ClassFormatError> {
    let pool = &class.constant_pool;
    let this_name = class.class_name();
    let mut names = HashSet::new();

    for entry in class.inner_classes()? {
        if entry.outer_class_info_index > 0 {
            let outer = to_binary_name(pool.class_name(entry.outer_class_info_index)?);
            if outer != this_name {
                continue;
            }
        }
        names.insert(to_binary_name(pool.class_name(entry.inner_class_info_index)?));
    }
    Ok(names)
}
