//! Test harness for cil-locals unit and integration tests
//!
//! # Example
//!
//! ```rust
//! use cil_locals::test_harness::*;
//! use cil_locals::{Opcode, StackVariableAccess};
//!
//! let locals = locals_table(&["int32", "string"]);
//! let instrs = parse_listing(&locals, "ldc.i4.0\nstloc.s V_1\n");
//!
//! let access = StackVariableAccess::new(instrs[1].clone()).unwrap();
//! assert_pair(&access, Opcode::LdlocS, Opcode::StlocS);
//! assert_same_slot(&access);
//! ```

#![allow(
    clippy::must_use_candidate,
    clippy::manual_assert,
    clippy::missing_panics_doc
)]

use crate::cil::{Instruction, LocalsTable, Opcode, listing};
use crate::complement::StackVariableAccess;

/// Build a locals table declaring one unpinned local per type name.
pub fn locals_table(types: &[&str]) -> LocalsTable {
    let mut table = LocalsTable::new();
    for ty in types {
        if let Err(e) = table.declare(*ty, false) {
            panic!("cannot declare local of type {ty}: {e}");
        }
    }
    table
}

/// Parse listing instructions against `locals`, panicking on syntax errors.
pub fn parse_listing<'a>(locals: &'a LocalsTable, text: &str) -> Vec<Instruction<'a>> {
    match listing::parse_instructions(locals, text) {
        Ok(instrs) => instrs,
        Err(e) => panic!("listing parse failed: {e}\n{text}"),
    }
}

/// Opcode sequence of an instruction slice
pub fn opcodes(instructions: &[Instruction<'_>]) -> Vec<Opcode> {
    instructions.iter().map(|i| i.opcode).collect()
}

/// Assert the opcodes of a load/store pair.
pub fn assert_pair(access: &StackVariableAccess<'_>, load: Opcode, store: Opcode) {
    assert_eq!(
        access.load().opcode,
        load,
        "load opcode mismatch: {} <-> {}",
        access.load(),
        access.store()
    );
    assert_eq!(
        access.store().opcode,
        store,
        "store opcode mismatch: {} <-> {}",
        access.load(),
        access.store()
    );
}

/// Assert that load and store address the same slot: same fixed index, or
/// the very same borrowed local.
pub fn assert_same_slot(access: &StackVariableAccess<'_>) {
    let load = access.load().slot();
    let store = access.store().slot();
    match (load, store) {
        (Some(load), Some(store)) => assert!(
            load.same_as(&store),
            "slot mismatch: {} <-> {}",
            access.load(),
            access.store()
        ),
        _ => panic!(
            "pair does not resolve to a slot: {} <-> {}",
            access.load(),
            access.store()
        ),
    }
}
