use std::fmt;

use super::Opcode;

/// Whether an instruction reads a local onto the stack or writes the stack top
/// into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Load,
    Store,
}

impl Direction {
    #[must_use]
    pub const fn from_store(is_store: bool) -> Self {
        if is_store { Self::Store } else { Self::Load }
    }

    #[must_use]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Store)
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Load => Self::Store,
            Self::Store => Self::Load,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Store => f.write_str("store"),
        }
    }
}

/// One of the four locals that have dedicated operand-less opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedSlot {
    Zero,
    One,
    Two,
    Three,
}

impl FixedSlot {
    pub const ALL: [Self; 4] = [Self::Zero, Self::One, Self::Two, Self::Three];

    #[must_use]
    pub const fn index(self) -> u16 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    #[must_use]
    pub const fn load_opcode(self) -> Opcode {
        match self {
            Self::Zero => Opcode::Ldloc0,
            Self::One => Opcode::Ldloc1,
            Self::Two => Opcode::Ldloc2,
            Self::Three => Opcode::Ldloc3,
        }
    }

    #[must_use]
    pub const fn store_opcode(self) -> Opcode {
        match self {
            Self::Zero => Opcode::Stloc0,
            Self::One => Opcode::Stloc1,
            Self::Two => Opcode::Stloc2,
            Self::Three => Opcode::Stloc3,
        }
    }
}

/// How a local access names its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotForm {
    /// Slot baked into the opcode, no operand.
    Fixed(FixedSlot),
    /// `*.s` form: local reference operand, encoded as `u8`.
    Compact,
    /// Long form: local reference operand, encoded as `u16`.
    General,
}

impl SlotForm {
    #[must_use]
    pub const fn takes_operand(self) -> bool {
        !matches!(self, Self::Fixed(_))
    }
}

/// Classification of a value load or store of a local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalAccess {
    pub direction: Direction,
    pub form: SlotForm,
}

impl LocalAccess {
    #[must_use]
    pub const fn new(direction: Direction, form: SlotForm) -> Self {
        Self { direction, form }
    }

    /// Same slot form, opposite direction.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self {
            direction: self.direction.opposite(),
            form: self.form,
        }
    }

    /// Inverse of [`Opcode::local_access`].
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        match (self.direction, self.form) {
            (Direction::Load, SlotForm::Fixed(slot)) => slot.load_opcode(),
            (Direction::Store, SlotForm::Fixed(slot)) => slot.store_opcode(),
            (Direction::Load, SlotForm::Compact) => Opcode::LdlocS,
            (Direction::Store, SlotForm::Compact) => Opcode::StlocS,
            (Direction::Load, SlotForm::General) => Opcode::Ldloc,
            (Direction::Store, SlotForm::General) => Opcode::Stloc,
        }
    }
}
