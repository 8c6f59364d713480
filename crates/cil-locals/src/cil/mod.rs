// CIL instruction model: opcodes, operands and the locals they reference.

mod access;
mod display;
mod instruction;
pub mod listing;
mod locals;
mod opcode;

pub use access::{Direction, FixedSlot, LocalAccess, SlotForm};
pub use instruction::{Instruction, Operand, Slot};
pub use locals::{LocalVariable, LocalsTable, MAX_LOCALS};
pub use opcode::{Opcode, OperandKind, TWO_BYTE_PREFIX, UnknownMnemonic};
