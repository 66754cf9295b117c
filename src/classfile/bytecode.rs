use super::ClassFormatError;

pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;
pub const INVOKEINTERFACE: u8 = 0xb9;
pub const INVOKEDYNAMIC: u8 = 0xba;

const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

/// A decoded instruction: opcode, offset in the method body, and its
/// operand bytes (padding included for switches).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub offset: usize,
    pub opcode: u8,
    pub operands: &'a [u8],
}

impl Instruction<'_> {
    /// Constant-pool operand of a call instruction (`invoke*` family).
    pub fn invoke_target(&self) -> Option<u16> {
        match self.opcode {
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC | INVOKEINTERFACE => {
                Some(u16::from_be_bytes([self.operands[0], self.operands[1]]))
            }
            _ => None,
        }
    }
}

/// Walks a method body one instruction at a time.
pub struct Instructions<'a> {
    code: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            pos: 0,
            failed: false,
        }
    }

    fn read_i32(&self, at: usize) -> Result<i32, ClassFormatError> {
        self.code
            .get(at..at + 4)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or(ClassFormatError::Truncated {
                offset: at,
                wanted: 4,
            })
    }

    fn instruction_len(&self, offset: usize, opcode: u8) -> Result<usize, ClassFormatError> {
        let len = match opcode {
            0x00..=0x0f => 1,
            0x10 => 2,
            0x11 => 3,
            0x12 => 2,
            0x13 | 0x14 => 3,
            0x15..=0x19 => 2,
            0x1a..=0x35 => 1,
            0x36..=0x3a => 2,
            0x3b..=0x83 => 1,
            IINC => 3,
            0x85..=0x98 => 1,
            0x99..=0xa8 => 3,
            0xa9 => 2,
            TABLESWITCH => {
                let base = offset + 1 + padding(offset);
                let low = self.read_i32(base + 4)?;
                let high = self.read_i32(base + 8)?;
                if high < low {
                    return Err(ClassFormatError::InvalidBytecode {
                        offset,
                        reason: "tableswitch high < low",
                    });
                }
                let jumps = (high as i64 - low as i64 + 1) as usize;
                1 + padding(offset) + 12 + jumps * 4
            }
            LOOKUPSWITCH => {
                let base = offset + 1 + padding(offset);
                let npairs = self.read_i32(base + 4)?;
                if npairs < 0 {
                    return Err(ClassFormatError::InvalidBytecode {
                        offset,
                        reason: "lookupswitch npairs < 0",
                    });
                }
                1 + padding(offset) + 8 + npairs as usize * 8
            }
            0xac..=0xb1 => 1,
            0xb2..=0xb5 => 3,
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => 3,
            INVOKEINTERFACE | INVOKEDYNAMIC => 5,
            0xbb => 3,
            0xbc => 2,
            0xbd => 3,
            0xbe | 0xbf => 1,
            0xc0 | 0xc1 => 3,
            0xc2 | 0xc3 => 1,
            WIDE => match self.code.get(offset + 1) {
                Some(&IINC) => 6,
                Some(_) => 4,
                None => {
                    return Err(ClassFormatError::Truncated {
                        offset: offset + 1,
                        wanted: 1,
                    });
                }
            },
            0xc5 => 4,
            0xc6 | 0xc7 => 3,
            0xc8 | 0xc9 => 5,
            0xca | 0xfe | 0xff => 1,
            other => return Err(ClassFormatError::UnknownOpcode { opcode: other, offset }),
        };
        Ok(len)
    }
}

/// Switch operands start at the next 4-byte boundary of the method body.
fn padding(offset: usize) -> usize {
    (4 - ((offset + 1) % 4)) % 4
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ClassFormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.code.len() {
            return None;
        }
        let offset = self.pos;
        let opcode = self.code[offset];
        let len = match self.instruction_len(offset, opcode) {
            Ok(len) => len,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        if offset + len > self.code.len() {
            self.failed = true;
            return Some(Err(ClassFormatError::Truncated {
                offset,
                wanted: len,
            }));
        }
        self.pos += len;
        Some(Ok(Instruction {
            offset,
            opcode,
            operands: &self.code[offset + 1..offset + len],
        }))
    }
}
