pub mod cil;
pub mod complement;
pub mod error;
pub mod scan;

/// Test harness module for writing unit and integration tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use cil::{Direction, Instruction, LocalVariable, LocalsTable, Opcode, Operand};
pub use complement::StackVariableAccess;
pub use error::{Error, ErrorKind, Result};
