// Load/store complements of local-variable instructions.
//
// Given `stloc.s V_3` this produces `ldloc.s V_3` (and vice versa) so a
// rewriting pass can re-read or re-write a local it found in the stream.

use crate::cil::{Direction, Instruction, LocalVariable, Opcode, Operand, SlotForm};
use crate::{Error, Result};

/// A local-variable load and store addressing the same slot.
///
/// One of the two is the instruction the access was built from, the other is
/// synthesized. For operand-slot forms both borrow the same [`LocalVariable`].
#[derive(Debug, Clone, PartialEq)]
pub struct StackVariableAccess<'a> {
    load: Instruction<'a>,
    store: Instruction<'a>,
    source: Direction,
}

impl<'a> StackVariableAccess<'a> {
    /// Build from an instruction that may be absent, e.g. a peek past the end
    /// of an instruction stream.
    pub fn build(instruction: Option<Instruction<'a>>) -> Result<Self> {
        Self::new(instruction.ok_or(Error::MissingInstruction)?)
    }

    /// Build from a value load or store of a local.
    ///
    /// Fails with [`Error::NotLocalAccess`] for any other opcode, including
    /// the address-of forms.
    pub fn new(instruction: Instruction<'a>) -> Result<Self> {
        let Some(access) = instruction.opcode.local_access() else {
            return Err(Error::NotLocalAccess(instruction.opcode));
        };

        let (load, store) = match access.direction {
            Direction::Store => (derive_load(&instruction)?, instruction),
            Direction::Load => {
                let store = derive_store(&instruction)?;
                (instruction, store)
            }
        };

        tracing::debug!(%load, %store, "resolved local complement");

        Ok(Self {
            load,
            store,
            source: access.direction,
        })
    }

    /// Matcher used while scanning an instruction stream.
    ///
    /// Returns `Ok(None)` when `instruction` is not a local access in the
    /// expected direction, or is an address-of load. A matching instruction
    /// with a malformed operand is still an error.
    pub fn try_create(expect_store: bool, instruction: &Instruction<'a>) -> Result<Option<Self>> {
        // ldloca has no store complement.
        if instruction.opcode.is_local_address() {
            tracing::trace!(opcode = %instruction.opcode, "skipping address-of load");
            return Ok(None);
        }

        let matched = if expect_store {
            instruction.is_stloc()
        } else {
            instruction.is_ldloc()
        };
        if !matched {
            return Ok(None);
        }

        Self::new(instruction.clone()).map(Some)
    }

    #[must_use]
    pub const fn load(&self) -> &Instruction<'a> {
        &self.load
    }

    #[must_use]
    pub const fn store(&self) -> &Instruction<'a> {
        &self.store
    }

    /// Direction of the instruction this access was built from.
    #[must_use]
    pub const fn source(&self) -> Direction {
        self.source
    }

    /// The synthesized half of the pair.
    #[must_use]
    pub const fn complement(&self) -> &Instruction<'a> {
        match self.source {
            Direction::Load => &self.store,
            Direction::Store => &self.load,
        }
    }

    /// Declared local both instructions reference, for operand-slot forms.
    #[must_use]
    pub fn local(&self) -> Option<&'a LocalVariable> {
        self.load.local()
    }
}

/// Load counterpart of a store instruction.
pub fn derive_load<'a>(store: &Instruction<'a>) -> Result<Instruction<'a>> {
    if !store.is_stloc() {
        return Err(Error::DirectionMismatch {
            expected: Direction::Store,
            opcode: store.opcode,
        });
    }
    let Some(access) = store.opcode.local_access() else {
        return Err(Error::UnexpectedOpcode(store.opcode));
    };

    let load = match access.form {
        SlotForm::General => Instruction::with_local(
            Opcode::Ldloc,
            validate_local_operand(store.opcode, store.operand.as_ref())?,
        ),
        SlotForm::Compact => Instruction::with_local(
            Opcode::LdlocS,
            validate_local_operand(store.opcode, store.operand.as_ref())?,
        ),
        SlotForm::Fixed(slot) => Instruction::new(slot.load_opcode()),
    };
    Ok(load)
}

/// Store counterpart of a load instruction.
///
/// The precondition accepts address-of loads, which then fail with
/// [`Error::UnexpectedOpcode`].
pub fn derive_store<'a>(load: &Instruction<'a>) -> Result<Instruction<'a>> {
    if !load.is_ldloc() {
        return Err(Error::DirectionMismatch {
            expected: Direction::Load,
            opcode: load.opcode,
        });
    }
    let Some(access) = load.opcode.local_access() else {
        return Err(Error::UnexpectedOpcode(load.opcode));
    };

    let store = match access.form {
        SlotForm::General => Instruction::with_local(
            Opcode::Stloc,
            validate_local_operand(load.opcode, load.operand.as_ref())?,
        ),
        SlotForm::Compact => Instruction::with_local(
            Opcode::StlocS,
            validate_local_operand(load.opcode, load.operand.as_ref())?,
        ),
        SlotForm::Fixed(slot) => Instruction::new(slot.store_opcode()),
    };
    Ok(store)
}

/// Check that an operand-slot instruction names a declared local, and return it.
pub fn validate_local_operand<'a>(
    opcode: Opcode,
    operand: Option<&Operand<'a>>,
) -> Result<&'a LocalVariable> {
    operand
        .and_then(Operand::as_local)
        .ok_or(Error::InvalidLocalOperand { opcode })
}
