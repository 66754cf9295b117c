//! Test fixture generators for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use dependency_linkage::adapters::maven::LocalRepository;
use dependency_linkage::domain::artifact::Artifact;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;
const ACC_STATIC: u16 = 0x0008;

const INVOKEVIRTUAL: u8 = 0xb6;
const INVOKESPECIAL: u8 = 0xb7;
const INVOKESTATIC: u8 = 0xb8;
const INVOKEINTERFACE: u8 = 0xb9;
const RETURN: u8 = 0xb1;
const NOP: u8 = 0x00;

fn internal(name: &str) -> String {
    name.replace('.', "/")
}

/// A call site emitted into a method body.
#[derive(Debug, Clone)]
pub struct Call {
    opcode: u8,
    class_name: String,
    name: String,
    descriptor: String,
}

impl Call {
    pub fn virtual_call(class_name: &str, name: &str, descriptor: &str) -> Self {
        Self::new(INVOKEVIRTUAL, class_name, name, descriptor)
    }

    pub fn special(class_name: &str, name: &str, descriptor: &str) -> Self {
        Self::new(INVOKESPECIAL, class_name, name, descriptor)
    }

    pub fn static_call(class_name: &str, name: &str, descriptor: &str) -> Self {
        Self::new(INVOKESTATIC, class_name, name, descriptor)
    }

    pub fn interface(class_name: &str, name: &str, descriptor: &str) -> Self {
        Self::new(INVOKEINTERFACE, class_name, name, descriptor)
    }

    fn new(opcode: u8, class_name: &str, name: &str, descriptor: &str) -> Self {
        Self {
            opcode,
            class_name: class_name.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

#[derive(Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    name_and_types: HashMap<(String, String), u16>,
    member_refs: HashMap<(u8, String, String, String), u16>,
}

impl PoolBuilder {
    fn next_index(&mut self) -> u16 {
        self.count += 1;
        self.count
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&idx) = self.utf8.get(value) {
            return idx;
        }
        let idx = self.next_index();
        self.bytes.push(1);
        self.bytes.extend((value.len() as u16).to_be_bytes());
        self.bytes.extend(value.as_bytes());
        self.utf8.insert(value.to_string(), idx);
        idx
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = internal(name);
        if let Some(&idx) = self.classes.get(&name) {
            return idx;
        }
        let name_idx = self.utf8(&name);
        let idx = self.next_index();
        self.bytes.push(7);
        self.bytes.extend(name_idx.to_be_bytes());
        self.classes.insert(name, idx);
        idx
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let key = (name.to_string(), descriptor.to_string());
        if let Some(&idx) = self.name_and_types.get(&key) {
            return idx;
        }
        let name_idx = self.utf8(name);
        let descriptor_idx = self.utf8(descriptor);
        let idx = self.next_index();
        self.bytes.push(12);
        self.bytes.extend(name_idx.to_be_bytes());
        self.bytes.extend(descriptor_idx.to_be_bytes());
        self.name_and_types.insert(key, idx);
        idx
    }

    fn method_ref(&mut self, interface: bool, class_name: &str, name: &str, descriptor: &str) -> u16 {
        let tag = if interface { 11 } else { 10 };
        let key = (
            tag,
            internal(class_name),
            name.to_string(),
            descriptor.to_string(),
        );
        if let Some(&idx) = self.member_refs.get(&key) {
            return idx;
        }
        let class_idx = self.class(class_name);
        let nat_idx = self.name_and_type(name, descriptor);
        let idx = self.next_index();
        self.bytes.push(tag);
        self.bytes.extend(class_idx.to_be_bytes());
        self.bytes.extend(nat_idx.to_be_bytes());
        self.member_refs.insert(key, idx);
        idx
    }

    /// A two-slot constant, to exercise index bookkeeping.
    fn long(&mut self, value: i64) -> u16 {
        let idx = self.next_index();
        self.next_index();
        self.bytes.push(5);
        self.bytes.extend(value.to_be_bytes());
        idx
    }
}

/// Assembles minimal, well-formed class files.
///
/// ```ignore
/// let bytes = ClassBuilder::new("com.example.Foo")
///     .method_calling("run", "()V", &[Call::static_call("com.example.Bar", "go", "()V")])
///     .build();
/// ```
pub struct ClassBuilder {
    pool: PoolBuilder,
    this_class: u16,
    super_class: u16,
    methods: Vec<Vec<u8>>,
    inner_classes: Vec<[u16; 4]>,
}

impl ClassBuilder {
    /// A public class extending `java.lang.Object`.
    pub fn new(class_name: &str) -> Self {
        let mut pool = PoolBuilder::default();
        let this_class = pool.class(class_name);
        let super_class = pool.class("java.lang.Object");
        // keeps Long/Double slot handling on the decoding path of every fixture
        pool.long(0x0102_0304_0506_0708);
        Self {
            pool,
            this_class,
            super_class,
            methods: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    /// A method without a body.
    pub fn method(mut self, name: &str, descriptor: &str) -> Self {
        let name_idx = self.pool.utf8(name);
        let descriptor_idx = self.pool.utf8(descriptor);
        let mut bytes = Vec::new();
        bytes.extend(ACC_PUBLIC.to_be_bytes());
        bytes.extend(name_idx.to_be_bytes());
        bytes.extend(descriptor_idx.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        self.methods.push(bytes);
        self
    }

    /// A static method whose body performs `calls` in order, then returns.
    pub fn method_calling(self, name: &str, descriptor: &str, calls: &[Call]) -> Self {
        self.method_calling_with_flags(name, descriptor, ACC_PUBLIC | ACC_STATIC, calls)
    }

    /// Like [`Self::method_calling`], with explicit method access flags.
    pub fn method_calling_with_flags(
        mut self,
        name: &str,
        descriptor: &str,
        access_flags: u16,
        calls: &[Call],
    ) -> Self {
        let mut code = Vec::new();
        for call in calls {
            let idx = self.pool.method_ref(
                call.opcode == INVOKEINTERFACE,
                &call.class_name,
                &call.name,
                &call.descriptor,
            );
            code.push(call.opcode);
            code.extend(idx.to_be_bytes());
            if call.opcode == INVOKEINTERFACE {
                code.push(1);
                code.push(0);
            }
            code.push(NOP);
        }
        code.push(RETURN);

        let code_name_idx = self.pool.utf8("Code");
        let name_idx = self.pool.utf8(name);
        let descriptor_idx = self.pool.utf8(descriptor);

        let mut attribute = Vec::new();
        attribute.extend(4u16.to_be_bytes()); // max_stack
        attribute.extend(4u16.to_be_bytes()); // max_locals
        attribute.extend((code.len() as u32).to_be_bytes());
        attribute.extend(&code);
        attribute.extend(0u16.to_be_bytes()); // exception table
        attribute.extend(0u16.to_be_bytes()); // attributes

        let mut bytes = Vec::new();
        bytes.extend(access_flags.to_be_bytes());
        bytes.extend(name_idx.to_be_bytes());
        bytes.extend(descriptor_idx.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(code_name_idx.to_be_bytes());
        bytes.extend((attribute.len() as u32).to_be_bytes());
        bytes.extend(attribute);
        self.methods.push(bytes);
        self
    }

    /// An `InnerClasses` row; `outer` is `None` for local and anonymous classes.
    pub fn inner_class(mut self, inner: &str, outer: Option<&str>) -> Self {
        let inner_idx = self.pool.class(inner);
        let outer_idx = outer.map(|o| self.pool.class(o)).unwrap_or(0);
        let simple = inner.rsplit('$').next().unwrap_or(inner);
        let name_idx = if outer.is_some() { self.pool.utf8(simple) } else { 0 };
        self.inner_classes
            .push([inner_idx, outer_idx, name_idx, ACC_PUBLIC | ACC_STATIC]);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let inner_classes_name = if self.inner_classes.is_empty() {
            None
        } else {
            Some(self.pool.utf8("InnerClasses"))
        };

        let mut out = Vec::new();
        out.extend(0xCAFE_BABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(52u16.to_be_bytes());
        out.extend((self.pool.count + 1).to_be_bytes());
        out.extend(&self.pool.bytes);
        out.extend((ACC_PUBLIC | ACC_SUPER).to_be_bytes());
        out.extend(self.this_class.to_be_bytes());
        out.extend(self.super_class.to_be_bytes());
        out.extend(0u16.to_be_bytes()); // interfaces
        out.extend(0u16.to_be_bytes()); // fields
        out.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            out.extend(method);
        }

        match inner_classes_name {
            Some(name_idx) => {
                out.extend(1u16.to_be_bytes());
                out.extend(name_idx.to_be_bytes());
                let len = 2 + 8 * self.inner_classes.len();
                out.extend((len as u32).to_be_bytes());
                out.extend((self.inner_classes.len() as u16).to_be_bytes());
                for row in &self.inner_classes {
                    for field in row {
                        out.extend(field.to_be_bytes());
                    }
                }
            }
            None => out.extend(0u16.to_be_bytes()),
        }
        out
    }
}

/// Writes a jar holding `classes` (binary name, class bytes) in the given order.
pub fn write_jar(path: &Path, classes: &[(&str, Vec<u8>)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
    writer.write_all(b"Manifest-Version: 1.0\n").unwrap();
    for (name, bytes) in classes {
        writer
            .start_file(format!("{}.class", internal(name)), options)
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// A temporary Maven-layout repository.
pub struct RepositoryFixture {
    dir: TempDir,
}

impl RepositoryFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn repository(&self) -> LocalRepository {
        LocalRepository::new(self.root())
    }

    pub fn path_of(&self, coordinate: &str) -> PathBuf {
        let artifact: Artifact = coordinate.parse().unwrap();
        self.repository().artifact_path(&artifact)
    }

    /// Writes the POM of `coordinate` with the given `<dependency>` elements.
    pub fn pom(&self, coordinate: &str, dependencies: &[String]) -> &Self {
        self.pom_with(coordinate, dependencies, "")
    }

    /// Writes the POM of `coordinate`; `extra` is inserted verbatim into `<project>`.
    pub fn pom_with(&self, coordinate: &str, dependencies: &[String], extra: &str) -> &Self {
        let artifact: Artifact = coordinate.parse().unwrap();
        let path = self
            .repository()
            .artifact_path(&artifact.with_extension("pom"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<project>\n  <modelVersion>4.0.0</modelVersion>\n  \
             <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  <version>{}</version>\n  \
             {}\n  <dependencies>{}</dependencies>\n</project>\n",
            artifact.group_id,
            artifact.artifact_id,
            artifact.version,
            extra,
            dependencies.concat()
        );
        std::fs::write(path, xml).unwrap();
        self
    }

    pub fn jar(&self, coordinate: &str, classes: &[(&str, Vec<u8>)]) -> &Self {
        write_jar(&self.path_of(coordinate), classes);
        self
    }
}

impl Default for RepositoryFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A `<dependency>` element for `group:artifact:version`; `extra` is inserted verbatim.
pub fn dependency_xml(coordinate: &str, extra: &str) -> String {
    let artifact: Artifact = coordinate.parse().unwrap();
    format!(
        "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>{}</dependency>",
        artifact.group_id, artifact.artifact_id, artifact.version, extra
    )
}
