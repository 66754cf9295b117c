use super::ClassFormatError;
use super::reader::ByteReader;

pub const CONSTANT_UTF8: u8 = 1;
pub const CONSTANT_INTEGER: u8 = 3;
pub const CONSTANT_FLOAT: u8 = 4;
pub const CONSTANT_LONG: u8 = 5;
pub const CONSTANT_DOUBLE: u8 = 6;
pub const CONSTANT_CLASS: u8 = 7;
pub const CONSTANT_STRING: u8 = 8;
pub const CONSTANT_FIELDREF: u8 = 9;
pub const CONSTANT_METHODREF: u8 = 10;
pub const CONSTANT_INTERFACE_METHODREF: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;
pub const CONSTANT_METHOD_HANDLE: u8 = 15;
pub const CONSTANT_METHOD_TYPE: u8 = 16;
pub const CONSTANT_DYNAMIC: u8 = 17;
pub const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
pub const CONSTANT_MODULE: u8 = 19;
pub const CONSTANT_PACKAGE: u8 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Fieldref { class_index: u16, name_and_type_index: u16 },
    Methodref { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodref { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
    /// Index 0 and the second slot of a Long/Double.
    Unusable,
}

impl Constant {
    fn tag_name(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::Class { .. } => "Class",
            Constant::String { .. } => "String",
            Constant::Fieldref { .. } => "Fieldref",
            Constant::Methodref { .. } => "Methodref",
            Constant::InterfaceMethodref { .. } => "InterfaceMethodref",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::MethodHandle { .. } => "MethodHandle",
            Constant::MethodType { .. } => "MethodType",
            Constant::Dynamic { .. } => "Dynamic",
            Constant::InvokeDynamic { .. } => "InvokeDynamic",
            Constant::Module { .. } => "Module",
            Constant::Package { .. } => "Package",
            Constant::Unusable => "Unusable",
        }
    }
}

/// A method or interface-method reference resolved through the pool.
/// `class_name` is in internal (`/`-separated) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub class_name: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, ClassFormatError> {
        let count = reader.u16()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let tag = reader.u8()?;
            let constant = match tag {
                CONSTANT_UTF8 => {
                    let len = reader.u16()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.take(len)?))
                }
                CONSTANT_INTEGER => Constant::Integer(reader.i32()?),
                CONSTANT_FLOAT => Constant::Float(f32::from_bits(reader.u32()?)),
                CONSTANT_LONG | CONSTANT_DOUBLE => {
                    let high = reader.u32()? as u64;
                    let low = reader.u32()? as u64;
                    let bits = (high << 32) | low;
                    let constant = if tag == CONSTANT_LONG {
                        Constant::Long(bits as i64)
                    } else {
                        Constant::Double(f64::from_bits(bits))
                    };
                    // 8-byte constants occupy two pool slots.
                    entries.push(constant);
                    entries.push(Constant::Unusable);
                    continue;
                }
                CONSTANT_CLASS => Constant::Class {
                    name_index: reader.u16()?,
                },
                CONSTANT_STRING => Constant::String {
                    string_index: reader.u16()?,
                },
                CONSTANT_FIELDREF | CONSTANT_METHODREF | CONSTANT_INTERFACE_METHODREF => {
                    let class_index = reader.u16()?;
                    let name_and_type_index = reader.u16()?;
                    match tag {
                        CONSTANT_FIELDREF => Constant::Fieldref {
                            class_index,
                            name_and_type_index,
                        },
                        CONSTANT_METHODREF => Constant::Methodref {
                            class_index,
                            name_and_type_index,
                        },
                        _ => Constant::InterfaceMethodref {
                            class_index,
                            name_and_type_index,
                        },
                    }
                }
                CONSTANT_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.u16()?,
                    descriptor_index: reader.u16()?,
                },
                CONSTANT_METHOD_HANDLE => Constant::MethodHandle {
                    reference_kind: reader.u8()?,
                    reference_index: reader.u16()?,
                },
                CONSTANT_METHOD_TYPE => Constant::MethodType {
                    descriptor_index: reader.u16()?,
                },
                CONSTANT_DYNAMIC => Constant::Dynamic {
                    bootstrap_method_attr_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                CONSTANT_INVOKE_DYNAMIC => Constant::InvokeDynamic {
                    bootstrap_method_attr_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                CONSTANT_MODULE => Constant::Module {
                    name_index: reader.u16()?,
                },
                CONSTANT_PACKAGE => Constant::Package {
                    name_index: reader.u16()?,
                },
                other => {
                    return Err(ClassFormatError::UnknownConstantTag {
                        tag: other,
                        index: entries.len(),
                    });
                }
            };
            entries.push(constant);
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn get(&self, index: u16) -> Result<&Constant, ClassFormatError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassFormatError::BadConstantIndex {
                index,
                expected: "usable entry",
            }),
            Some(constant) => Ok(constant),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    /// Internal (`/`-separated) name of a `CONSTANT_Class` entry.
    pub fn class_name(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), ClassFormatError> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(mismatch(index, "NameAndType", other)),
        }
    }

    /// Resolves a `Methodref` or `InterfaceMethodref` entry.
    pub fn method_ref(&self, index: u16) -> Result<MemberRef<'_>, ClassFormatError> {
        match self.get(index)? {
            Constant::Methodref {
                class_index,
                name_and_type_index,
            }
            | Constant::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => {
                let class_name = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok(MemberRef {
                    class_name,
                    name,
                    descriptor,
                })
            }
            other => Err(mismatch(index, "Methodref", other)),
        }
    }
}

fn mismatch(index: u16, expected: &'static str, found: &Constant) -> ClassFormatError {
    ClassFormatError::ConstantTypeMismatch {
        index,
        expected,
        found: found.tag_name(),
    }
}

/// Decodes the JVM's modified UTF-8: NUL is `C0 80` and supplementary
/// characters are stored as surrogate pairs of three-byte sequences.
pub fn decode_modified_utf8(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i] as u16;
        if b & 0x80 == 0 {
            units.push(b);
            i += 1;
        } else if b & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            let b2 = bytes[i + 1] as u16;
            units.push(((b & 0x1F) << 6) | (b2 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            let b2 = bytes[i + 1] as u16;
            let b3 = bytes[i + 2] as u16;
            units.push(((b & 0x0F) << 12) | ((b2 & 0x3F) << 6) | (b3 & 0x3F));
            i += 3;
        } else {
            units.push(0xFFFD);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes(entries: &[&[u8]], count: u16) -> Vec<u8> {
        let mut out = count.to_be_bytes().to_vec();
        for e in entries {
            out.extend_from_slice(e);
        }
        out
    }

    #[test]
    fn test_long_takes_two_slots() {
        let bytes = pool_bytes(
            &[
                &[CONSTANT_LONG, 0, 0, 0, 0, 0, 0, 0, 42],
                &[CONSTANT_UTF8, 0, 2, b'h', b'i'],
            ],
            4,
        );
        let mut reader = ByteReader::new(&bytes);
        let pool = ConstantPool::parse(&mut reader).unwrap();
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.get(1).unwrap(), &Constant::Long(42));
        assert!(pool.get(2).is_err());
        assert_eq!(pool.utf8(3).unwrap(), "hi");
    }

    #[test]
    fn test_method_ref_resolution() {
        let bytes = pool_bytes(
            &[
                &[CONSTANT_UTF8, 0, 5, b'a', b'/', b'F', b'o', b'o'],
                &[CONSTANT_CLASS, 0, 1],
                &[CONSTANT_UTF8, 0, 3, b'b', b'a', b'r'],
                &[CONSTANT_UTF8, 0, 3, b'(', b')', b'V'],
                &[CONSTANT_NAME_AND_TYPE, 0, 3, 0, 4],
                &[CONSTANT_METHODREF, 0, 2, 0, 5],
            ],
            7,
        );
        let mut reader = ByteReader::new(&bytes);
        let pool = ConstantPool::parse(&mut reader).unwrap();
        let m = pool.method_ref(6).unwrap();
        assert_eq!(m.class_name, "a/Foo");
        assert_eq!(m.name, "bar");
        assert_eq!(m.descriptor, "()V");
        assert!(pool.method_ref(2).is_err());
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let bytes = pool_bytes(&[&[99, 0, 0]], 2);
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            ConstantPool::parse(&mut reader),
            Err(ClassFormatError::UnknownConstantTag { tag: 99, index: 1 })
        ));
    }

    #[test]
    fn test_modified_utf8() {
        assert_eq!(decode_modified_utf8(b"plain"), "plain");
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']), "a\0b");
        // U+00E9
        assert_eq!(decode_modified_utf8(&[0xC3, 0xA9]), "\u{e9}");
        // U+1F600 as a CESU-8 surrogate pair
        assert_eq!(
            decode_modified_utf8(&[0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]),
            "\u{1F600}"
        );
    }
}
