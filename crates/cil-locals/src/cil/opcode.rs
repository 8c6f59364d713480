use std::fmt;
use std::str::FromStr;

use super::access::{Direction, FixedSlot, LocalAccess, SlotForm};

/// Prefix byte shared by all two-byte CIL opcodes.
pub const TWO_BYTE_PREFIX: u8 = 0xFE;

/// CIL opcodes understood by this crate.
///
/// Discriminants are the ECMA-335 encodings. Two-byte opcodes carry the
/// `0xFE` prefix in their high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    Nop = 0x00,
    Ldarg0 = 0x02,
    Ldarg1 = 0x03,
    Ldarg2 = 0x04,
    Ldarg3 = 0x05,
    // Fixed-slot local access
    Ldloc0 = 0x06,
    Ldloc1 = 0x07,
    Ldloc2 = 0x08,
    Ldloc3 = 0x09,
    Stloc0 = 0x0A,
    Stloc1 = 0x0B,
    Stloc2 = 0x0C,
    Stloc3 = 0x0D,
    // Short-form variable access (u8 operand)
    LdargS = 0x0E,
    StargS = 0x10,
    LdlocS = 0x11,
    LdlocaS = 0x12,
    StlocS = 0x13,
    Ldnull = 0x14,
    LdcI4_0 = 0x16,
    LdcI4_1 = 0x17,
    LdcI4S = 0x1F,
    LdcI4 = 0x20,
    LdcI8 = 0x21,
    Dup = 0x25,
    Pop = 0x26,
    Call = 0x28,
    Ret = 0x2A,
    Br = 0x38,
    Brfalse = 0x39,
    Brtrue = 0x3A,
    Add = 0x58,
    Sub = 0x59,
    Mul = 0x5A,
    Callvirt = 0x6F,
    Ldstr = 0x72,
    Newobj = 0x73,
    Ldfld = 0x7B,
    Stfld = 0x7D,
    // Long-form variable access (u16 operand)
    Ldarg = 0xFE09,
    Starg = 0xFE0B,
    Ldloc = 0xFE0C,
    Ldloca = 0xFE0D,
    Stloc = 0xFE0E,
}

/// Shape of the inline operand an opcode expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// Variable number encoded as `u8` (`*.s` forms).
    ShortVariable,
    /// Variable number encoded as `u16`.
    Variable,
    Int8,
    Int32,
    Int64,
    Branch,
    /// User-string token (`ldstr`).
    String,
    /// Metadata token (method, field or type).
    Token,
}

impl OperandKind {
    /// Encoded size of the operand in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::None => 0,
            Self::ShortVariable | Self::Int8 => 1,
            Self::Variable => 2,
            Self::Int32 | Self::Branch | Self::String | Self::Token => 4,
            Self::Int64 => 8,
        }
    }
}

impl Opcode {
    pub const ALL: [Self; 44] = [
        Self::Nop,
        Self::Ldarg0,
        Self::Ldarg1,
        Self::Ldarg2,
        Self::Ldarg3,
        Self::Ldloc0,
        Self::Ldloc1,
        Self::Ldloc2,
        Self::Ldloc3,
        Self::Stloc0,
        Self::Stloc1,
        Self::Stloc2,
        Self::Stloc3,
        Self::LdargS,
        Self::StargS,
        Self::LdlocS,
        Self::LdlocaS,
        Self::StlocS,
        Self::Ldnull,
        Self::LdcI4_0,
        Self::LdcI4_1,
        Self::LdcI4S,
        Self::LdcI4,
        Self::LdcI8,
        Self::Dup,
        Self::Pop,
        Self::Call,
        Self::Ret,
        Self::Br,
        Self::Brfalse,
        Self::Brtrue,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Callvirt,
        Self::Ldstr,
        Self::Newobj,
        Self::Ldfld,
        Self::Stfld,
        Self::Ldarg,
        Self::Starg,
        Self::Ldloc,
        Self::Ldloca,
        Self::Stloc,
    ];

    #[must_use]
    pub const fn value(self) -> u16 {
        self as u16
    }

    /// Encoded size of the opcode itself (1 or 2 bytes).
    #[must_use]
    pub const fn size(self) -> usize {
        if self.value() > 0xFF { 2 } else { 1 }
    }

    /// Opcode bytes as they appear in a method body.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        let value = self.value();
        if value > 0xFF {
            vec![TWO_BYTE_PREFIX, (value & 0xFF) as u8]
        } else {
            vec![value as u8]
        }
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Ldarg0 => "ldarg.0",
            Self::Ldarg1 => "ldarg.1",
            Self::Ldarg2 => "ldarg.2",
            Self::Ldarg3 => "ldarg.3",
            Self::Ldloc0 => "ldloc.0",
            Self::Ldloc1 => "ldloc.1",
            Self::Ldloc2 => "ldloc.2",
            Self::Ldloc3 => "ldloc.3",
            Self::Stloc0 => "stloc.0",
            Self::Stloc1 => "stloc.1",
            Self::Stloc2 => "stloc.2",
            Self::Stloc3 => "stloc.3",
            Self::LdargS => "ldarg.s",
            Self::StargS => "starg.s",
            Self::LdlocS => "ldloc.s",
            Self::LdlocaS => "ldloca.s",
            Self::StlocS => "stloc.s",
            Self::Ldnull => "ldnull",
            Self::LdcI4_0 => "ldc.i4.0",
            Self::LdcI4_1 => "ldc.i4.1",
            Self::LdcI4S => "ldc.i4.s",
            Self::LdcI4 => "ldc.i4",
            Self::LdcI8 => "ldc.i8",
            Self::Dup => "dup",
            Self::Pop => "pop",
            Self::Call => "call",
            Self::Ret => "ret",
            Self::Br => "br",
            Self::Brfalse => "brfalse",
            Self::Brtrue => "brtrue",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Callvirt => "callvirt",
            Self::Ldstr => "ldstr",
            Self::Newobj => "newobj",
            Self::Ldfld => "ldfld",
            Self::Stfld => "stfld",
            Self::Ldarg => "ldarg",
            Self::Starg => "starg",
            Self::Ldloc => "ldloc",
            Self::Ldloca => "ldloca",
            Self::Stloc => "stloc",
        }
    }

    #[must_use]
    pub const fn operand_kind(self) -> OperandKind {
        match self {
            Self::LdargS | Self::StargS | Self::LdlocS | Self::LdlocaS | Self::StlocS => {
                OperandKind::ShortVariable
            }
            Self::Ldarg | Self::Starg | Self::Ldloc | Self::Ldloca | Self::Stloc => {
                OperandKind::Variable
            }
            Self::LdcI4S => OperandKind::Int8,
            Self::LdcI4 => OperandKind::Int32,
            Self::LdcI8 => OperandKind::Int64,
            Self::Br | Self::Brfalse | Self::Brtrue => OperandKind::Branch,
            Self::Ldstr => OperandKind::String,
            Self::Call | Self::Callvirt | Self::Newobj | Self::Ldfld | Self::Stfld => {
                OperandKind::Token
            }
            _ => OperandKind::None,
        }
    }

    /// Classify this opcode as a value load or store of a local.
    ///
    /// Address-of opcodes (`ldloca`, `ldloca.s`) are not value accesses and
    /// return `None`.
    #[must_use]
    pub const fn local_access(self) -> Option<LocalAccess> {
        let (direction, form) = match self {
            Self::Ldloc0 => (Direction::Load, SlotForm::Fixed(FixedSlot::Zero)),
            Self::Ldloc1 => (Direction::Load, SlotForm::Fixed(FixedSlot::One)),
            Self::Ldloc2 => (Direction::Load, SlotForm::Fixed(FixedSlot::Two)),
            Self::Ldloc3 => (Direction::Load, SlotForm::Fixed(FixedSlot::Three)),
            Self::LdlocS => (Direction::Load, SlotForm::Compact),
            Self::Ldloc => (Direction::Load, SlotForm::General),
            Self::Stloc0 => (Direction::Store, SlotForm::Fixed(FixedSlot::Zero)),
            Self::Stloc1 => (Direction::Store, SlotForm::Fixed(FixedSlot::One)),
            Self::Stloc2 => (Direction::Store, SlotForm::Fixed(FixedSlot::Two)),
            Self::Stloc3 => (Direction::Store, SlotForm::Fixed(FixedSlot::Three)),
            Self::StlocS => (Direction::Store, SlotForm::Compact),
            Self::Stloc => (Direction::Store, SlotForm::General),
            _ => return None,
        };
        Some(LocalAccess { direction, form })
    }

    /// `ldloca` / `ldloca.s`: push the address of a local.
    #[must_use]
    pub const fn is_local_address(self) -> bool {
        matches!(self, Self::Ldloca | Self::LdlocaS)
    }

    /// Any opcode that reads a local, including the address-of forms.
    #[must_use]
    pub const fn is_ldloc(self) -> bool {
        self.is_local_address()
            || matches!(
                self.local_access(),
                Some(LocalAccess {
                    direction: Direction::Load,
                    ..
                })
            )
    }

    #[must_use]
    pub const fn is_stloc(self) -> bool {
        matches!(
            self.local_access(),
            Some(LocalAccess {
                direction: Direction::Store,
                ..
            })
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Error returned when a mnemonic does not name a known opcode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown opcode mnemonic '{0}'")]
pub struct UnknownMnemonic(pub String);

impl FromStr for Opcode {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic() == lower)
            .ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_byte_opcodes_encode_with_prefix() {
        assert_eq!(Opcode::Ldloc.encode(), vec![0xFE, 0x0C]);
        assert_eq!(Opcode::Stloc.encode(), vec![0xFE, 0x0E]);
        assert_eq!(Opcode::StlocS.encode(), vec![0x13]);
        assert_eq!(Opcode::Ldloc.size(), 2);
        assert_eq!(Opcode::Ldloc0.size(), 1);
    }

    #[test]
    fn mnemonics_round_trip_through_from_str() {
        for op in Opcode::ALL {
            assert_eq!(op.mnemonic().parse::<Opcode>(), Ok(op));
        }
        assert_eq!("LDLOC.S".parse::<Opcode>(), Ok(Opcode::LdlocS));
        assert!("ldloc.4".parse::<Opcode>().is_err());
    }

    #[test]
    fn address_of_is_ldloc_but_not_a_value_access() {
        for op in [Opcode::Ldloca, Opcode::LdlocaS] {
            assert!(op.is_ldloc());
            assert!(!op.is_stloc());
            assert!(op.local_access().is_none());
        }
    }

    #[test]
    fn arguments_are_not_locals() {
        for op in [Opcode::Ldarg0, Opcode::LdargS, Opcode::Ldarg, Opcode::Starg] {
            assert!(!op.is_ldloc());
            assert!(!op.is_stloc());
        }
    }
}
