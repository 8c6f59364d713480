use super::{FixedSlot, LocalVariable, Opcode, OperandKind, SlotForm};
use crate::{Error, Result};

/// Inline operand of an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<'a> {
    /// Reference to a declared local, borrowed from the method's locals table.
    Local(&'a LocalVariable),
    /// Raw variable number (arguments, or a local not resolved to a declaration).
    Index(u16),
    Int32(i32),
    Int64(i64),
    String(String),
    /// Branch offset relative to the next instruction.
    Label(i32),
    Token(u32),
}

impl<'a> Operand<'a> {
    #[must_use]
    pub const fn as_local(&self) -> Option<&'a LocalVariable> {
        match self {
            Self::Local(local) => Some(*local),
            _ => None,
        }
    }
}

/// The local slot an instruction accesses.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Fixed(FixedSlot),
    Local(&'a LocalVariable),
}

impl Slot<'_> {
    /// Fixed slots compare by index, declared locals by identity.
    #[must_use]
    pub fn same_as(&self, other: &Slot<'_>) -> bool {
        match (self, other) {
            (Self::Fixed(a), Slot::Fixed(b)) => a == b,
            (Self::Local(a), Slot::Local(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }

    /// Local slot number, whichever form names it.
    #[must_use]
    pub const fn index(&self) -> u16 {
        match self {
            Self::Fixed(slot) => slot.index(),
            Self::Local(local) => local.index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction<'a> {
    pub opcode: Opcode,
    pub operand: Option<Operand<'a>>,
}

impl<'a> Instruction<'a> {
    #[must_use]
    pub const fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    #[must_use]
    pub const fn with_operand(opcode: Opcode, operand: Operand<'a>) -> Self {
        Self {
            opcode,
            operand: Some(operand),
        }
    }

    /// `ldloc`/`stloc` family instruction referencing a declared local.
    #[must_use]
    pub const fn with_local(opcode: Opcode, local: &'a LocalVariable) -> Self {
        Self::with_operand(opcode, Operand::Local(local))
    }

    /// Declared local referenced by the operand, if any.
    #[must_use]
    pub fn local(&self) -> Option<&'a LocalVariable> {
        self.operand.as_ref().and_then(Operand::as_local)
    }

    #[must_use]
    pub fn is_ldloc(&self) -> bool {
        self.opcode.is_ldloc()
    }

    #[must_use]
    pub fn is_stloc(&self) -> bool {
        self.opcode.is_stloc()
    }

    /// Slot accessed by a value load or store of a local.
    ///
    /// Returns `None` for other opcodes and for operand-slot opcodes whose
    /// operand is not a declared local.
    #[must_use]
    pub fn slot(&self) -> Option<Slot<'a>> {
        match self.opcode.local_access()?.form {
            SlotForm::Fixed(slot) => Some(Slot::Fixed(slot)),
            SlotForm::Compact | SlotForm::General => self.local().map(Slot::Local),
        }
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.opcode.size() + self.opcode.operand_kind().size()
    }

    /// Encode to the method-body byte form: opcode bytes followed by the
    /// little-endian operand.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = self.opcode.encode();
        let kind = self.opcode.operand_kind();
        match (kind, &self.operand) {
            (OperandKind::None, None) => {}
            (OperandKind::ShortVariable, Some(operand)) => {
                let index = variable_index(operand).ok_or(Error::MalformedOperand(self.opcode))?;
                let index = u8::try_from(index).map_err(|_| Error::MalformedOperand(self.opcode))?;
                bytes.push(index);
            }
            (OperandKind::Variable, Some(operand)) => {
                let index = variable_index(operand).ok_or(Error::MalformedOperand(self.opcode))?;
                bytes.extend_from_slice(&index.to_le_bytes());
            }
            (OperandKind::Int8, Some(Operand::Int32(value))) => {
                let value = i8::try_from(*value).map_err(|_| Error::MalformedOperand(self.opcode))?;
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            (OperandKind::Int32, Some(Operand::Int32(value)))
            | (OperandKind::Branch, Some(Operand::Label(value))) => {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            (OperandKind::Int64, Some(Operand::Int64(value))) => {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            (OperandKind::Token | OperandKind::String, Some(Operand::Token(token))) => {
                bytes.extend_from_slice(&token.to_le_bytes());
            }
            _ => return Err(Error::MalformedOperand(self.opcode)),
        }
        Ok(bytes)
    }
}

fn variable_index(operand: &Operand<'_>) -> Option<u16> {
    match operand {
        Operand::Local(local) => Some(local.index()),
        Operand::Index(index) => Some(*index),
        _ => None,
    }
}
