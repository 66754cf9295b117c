use super::ClassFormatError;
use super::constant_pool::ConstantPool;
use super::reader::ByteReader;

pub const ATTR_CODE: &str = "Code";
pub const ATTR_INNER_CLASSES: &str = "InnerClasses";

/// Undecoded attribute: name plus raw payload. Payloads are decoded lazily
/// by the typed views below.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub info: Vec<u8>,
}

impl Attribute {
    pub(crate) fn parse(
        reader: &mut ByteReader<'_>,
        pool: &ConstantPool,
    ) -> Result<Self, ClassFormatError> {
        let name_index = reader.u16()?;
        let name = pool.utf8(name_index)?.to_string();
        let len = reader.u32()? as usize;
        let info = reader.take(len)?.to_vec();
        Ok(Self { name, info })
    }

    pub(crate) fn parse_all(
        reader: &mut ByteReader<'_>,
        pool: &ConstantPool,
    ) -> Result<Vec<Self>, ClassFormatError> {
        let count = reader.u16()? as usize;
        (0..count).map(|_| Self::parse(reader, pool)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

/// Decoded `Code` attribute.
#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<Attribute>,
}

impl CodeAttribute {
    pub fn decode(attribute: &Attribute, pool: &ConstantPool) -> Result<Self, ClassFormatError> {
        let mut reader = ByteReader::new(&attribute.info);
        let max_stack = reader.u16()?;
        let max_locals = reader.u16()?;
        let code_len = reader.u32()? as usize;
        let code = reader.take(code_len)?.to_vec();
        let table_len = reader.u16()? as usize;
        let mut exception_table = Vec::with_capacity(table_len);
        for _ in 0..table_len {
            exception_table.push(ExceptionTableEntry {
                start_pc: reader.u16()?,
                end_pc: reader.u16()?,
                handler_pc: reader.u16()?,
                catch_type: reader.u16()?,
            });
        }
        let attributes = Attribute::parse_all(&mut reader, pool)?;
        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }
}

/// One row of an `InnerClasses` attribute. Index 0 means "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: u16,
}

pub fn decode_inner_classes(attribute: &Attribute) -> Result<Vec<InnerClassEntry>, ClassFormatError> {
    let mut reader = ByteReader::new(&attribute.info);
    let count = reader.u16()? as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(InnerClassEntry {
            inner_class_info_index: reader.u16()?,
            outer_class_info_index: reader.u16()?,
            inner_name_index: reader.u16()?,
            inner_class_access_flags: reader.u16()?,
        });
    }
    Ok(entries)
}
