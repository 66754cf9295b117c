//! Extraction of declared methods, call targets and inner-class tables from assembled classes.

mod common;

use common::fixtures::{Call, ClassBuilder};
use common::mock::InMemoryArchive;
use dependency_linkage::classfile::{ACC_BRIDGE, ACC_SYNTHETIC, ClassFile};
use dependency_linkage::domain::class_dumper::{
    declared_methods, inner_class_names, method_references, methods_on_class,
};
use dependency_linkage::domain::linkage::external_method_references;
use dependency_linkage::domain::signature::{FullyQualifiedMethodSignature, MethodSignature};

#[test]
fn test_declared_methods_include_constructors() {
    let bytes = ClassBuilder::new("com.example.Widget")
        .method("<init>", "()V")
        .method("size", "()I")
        .method_calling("<clinit>", "()V", &[])
        .build();
    let class = ClassFile::parse(&bytes).unwrap();

    assert_eq!(class.class_name(), "com.example.Widget");
    assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
    assert_eq!(
        declared_methods(&class),
        vec![
            MethodSignature::new("<init>", "()V"),
            MethodSignature::new("size", "()I"),
            MethodSignature::new("<clinit>", "()V"),
        ]
    );
    assert!(
        methods_on_class(&class)
            .contains(&FullyQualifiedMethodSignature::new("com.example.Widget", "size", "()I"))
    );
}

#[test]
fn test_method_references_cover_all_invoke_kinds_in_order() {
    let bytes = ClassBuilder::new("com.example.Caller")
        .method_calling(
            "run",
            "()V",
            &[
                Call::special("java.lang.Object", "<init>", "()V"),
                Call::virtual_call("java.lang.StringBuilder", "append", "(I)Ljava/lang/StringBuilder;"),
                Call::static_call("com.google.common.base.Preconditions", "checkNotNull", "(Ljava/lang/Object;)Ljava/lang/Object;"),
                Call::interface("java.util.List", "size", "()I"),
            ],
        )
        .build();
    let class = ClassFile::parse(&bytes).unwrap();

    let references = method_references(&class).unwrap();
    let rendered: Vec<String> = references
        .iter()
        .map(|r| format!("{}.{}{}", r.class_name, r.method_name(), r.descriptor()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            "java.lang.Object.<init>()V",
            "java.lang.StringBuilder.append(I)Ljava/lang/StringBuilder;",
            "com.google.common.base.Preconditions.checkNotNull(Ljava/lang/Object;)Ljava/lang/Object;",
            "java.util.List.size()I",
        ]
    );
}

#[test]
fn test_method_references_deduplicated_across_methods() {
    let call = Call::static_call("org.lib.Util", "helper", "()V");
    let bytes = ClassBuilder::new("com.example.Repeat")
        .method_calling("a", "()V", &[call.clone(), call.clone()])
        .method_calling("b", "()V", &[call])
        .build();
    let class = ClassFile::parse(&bytes).unwrap();

    assert_eq!(
        method_references(&class).unwrap(),
        vec![FullyQualifiedMethodSignature::new("org.lib.Util", "helper", "()V")]
    );
}

#[test]
fn test_abstract_methods_have_no_references() {
    let bytes = ClassBuilder::new("com.example.Shape")
        .method("area", "()D")
        .build();
    let class = ClassFile::parse(&bytes).unwrap();
    assert!(method_references(&class).unwrap().is_empty());
}

#[test]
fn test_inner_class_names_keep_own_members_only() {
    let bytes = ClassBuilder::new("com.example.Outer")
        .inner_class("com.example.Outer$Inner", Some("com.example.Outer"))
        .inner_class("com.example.Outer$1", None)
        .inner_class("java.util.Map$Entry", Some("java.util.Map"))
        .build();
    let class = ClassFile::parse(&bytes).unwrap();

    let mut names: Vec<String> = inner_class_names(&class).unwrap().into_iter().collect();
    names.sort();
    assert_eq!(names, vec!["com.example.Outer$1", "com.example.Outer$Inner"]);
}

#[test]
fn test_class_without_inner_classes() {
    let bytes = ClassBuilder::new("com.example.Plain").build();
    let class = ClassFile::parse(&bytes).unwrap();
    assert!(inner_class_names(&class).unwrap().is_empty());
}

#[test]
fn test_truncated_class_is_rejected() {
    let bytes = ClassBuilder::new("com.example.Broken")
        .method_calling("run", "()V", &[Call::static_call("a.B", "c", "()V")])
        .build();
    assert!(ClassFile::parse(&bytes[..bytes.len() - 3]).is_err());
    assert!(ClassFile::parse(b"not a class").is_err());
}

#[test]
fn test_method_references_include_synthetic_bridge_methods() {
    let bridge_only = FullyQualifiedMethodSignature::new(
        "com.example.Handler",
        "handle",
        "(Ljava/lang/String;)V",
    );
    let bytes = ClassBuilder::new("com.example.StringHandler")
        .method("handle", "(Ljava/lang/String;)V")
        .method_calling_with_flags(
            "handle",
            "(Ljava/lang/Object;)V",
            0x0001 | ACC_SYNTHETIC | ACC_BRIDGE,
            &[Call::virtual_call("com.example.Handler", "handle", "(Ljava/lang/String;)V")],
        )
        .build();
    let class = ClassFile::parse(&bytes).unwrap();

    let bridge = &class.methods[1];
    assert!(bridge.is_synthetic());
    assert!(bridge.is_bridge());
    assert!(!class.methods[0].is_synthetic());

    assert_eq!(method_references(&class).unwrap(), vec![bridge_only.clone()]);

    let archive = InMemoryArchive::new(
        "/handlers.jar",
        vec![("com.example.StringHandler".to_string(), bytes)],
    );
    assert_eq!(external_method_references(&archive).unwrap(), vec![bridge_only]);
}
