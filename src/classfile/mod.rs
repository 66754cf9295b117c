//! JVM class-file decoder.
//!
//! Decodes the parts of the class-file format the linkage checker consumes:
//! the constant pool, declared members, attributes (with typed views for
//! `Code` and `InnerClasses`) and an instruction walker for method bodies.
//! Nothing here interprets bytecode semantics beyond instruction boundaries.

pub mod attributes;
pub mod bytecode;
pub mod constant_pool;
pub mod reader;

use attributes::{ATTR_CODE, ATTR_INNER_CLASSES, Attribute, CodeAttribute, InnerClassEntry};
use constant_pool::ConstantPool;
use reader::ByteReader;
use thiserror::Error;

pub const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_BRIDGE: u16 = 0x0040;

#[derive(Debug, Error)]
pub enum ClassFormatError {
    #[error("bad magic number 0x{0:08x}")]
    BadMagic(u32),
    #[error("unexpected end of class data at offset {offset} (wanted {wanted} bytes)")]
    Truncated { offset: usize, wanted: usize },
    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: usize },
    #[error("invalid constant pool index {index} (expected {expected})")]
    BadConstantIndex { index: u16, expected: &'static str },
    #[error("constant pool entry {index} is {found}, expected {expected}")]
    ConstantTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },
    #[error("invalid bytecode at offset {offset}: {reason}")]
    InvalidBytecode { offset: usize, reason: &'static str },
    #[error("{0} trailing bytes after class data")]
    TrailingBytes(usize),
}

/// A field or method declaration.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<Attribute>,
}

impl MemberInfo {
    fn parse(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Self, ClassFormatError> {
        let access_flags = reader.u16()?;
        let name = pool.utf8(reader.u16()?)?.to_string();
        let descriptor = pool.utf8(reader.u16()?)?.to_string();
        let attributes = Attribute::parse_all(reader, pool)?;
        Ok(Self {
            access_flags,
            name,
            descriptor,
            attributes,
        })
    }

    pub fn is_synthetic(&self) -> bool {
        self.access_flags & ACC_SYNTHETIC != 0
    }

    pub fn is_bridge(&self) -> bool {
        self.access_flags & ACC_BRIDGE != 0
    }

    /// The decoded method body, if this member has one.
    pub fn code(&self, pool: &ConstantPool) -> Result<Option<CodeAttribute>, ClassFormatError> {
        self.attributes
            .iter()
            .find(|a| a.name == ATTR_CODE)
            .map(|a| CodeAttribute::decode(a, pool))
            .transpose()
    }
}

/// A decoded class file.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    /// Internal (`/`-separated) name.
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFormatError> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(ClassFormatError::BadMagic(magic));
        }
        let minor_version = reader.u16()?;
        let major_version = reader.u16()?;
        let constant_pool = ConstantPool::parse(&mut reader)?;
        let access_flags = reader.u16()?;
        let this_class = constant_pool.class_name(reader.u16()?)?.to_string();
        let super_class = match reader.u16()? {
            0 => None,
            index => Some(constant_pool.class_name(index)?.to_string()),
        };

        let interface_count = reader.u16()? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            interfaces.push(constant_pool.class_name(reader.u16()?)?.to_string());
        }

        let field_count = reader.u16()? as usize;
        let fields = (0..field_count)
            .map(|_| MemberInfo::parse(&mut reader, &constant_pool))
            .collect::<Result<Vec<_>, _>>()?;

        let method_count = reader.u16()? as usize;
        let methods = (0..method_count)
            .map(|_| MemberInfo::parse(&mut reader, &constant_pool))
            .collect::<Result<Vec<_>, _>>()?;

        let attributes = Attribute::parse_all(&mut reader, &constant_pool)?;
        if !reader.is_empty() {
            return Err(ClassFormatError::TrailingBytes(reader.remaining()));
        }

        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Binary name in dotted form, e.g. `com.example.Outer$Inner`.
    pub fn class_name(&self) -> String {
        to_binary_name(&self.this_class)
    }

    /// Rows of the `InnerClasses` attribute; empty when absent.
    pub fn inner_classes(&self) -> Result<Vec<InnerClassEntry>, ClassFormatError> {
        let mut entries = Vec::new();
        for attribute in self.attributes.iter().filter(|a| a.name == ATTR_INNER_CLASSES) {
            entries.extend(attributes::decode_inner_classes(attribute)?);
        }
        Ok(entries)
    }
}

/// Converts an internal name (`a/b/C$D`) to binary form (`a.b.C$D`).
pub fn to_binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Converts a binary class name to the path of its class-file entry.
pub fn class_file_path(binary_name: &str) -> String {
    format!("{}.class", binary_name.replace('.', "/"))
}
