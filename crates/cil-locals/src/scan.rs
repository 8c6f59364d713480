// Sequential scans over a method body using the local-access matcher.

use crate::cil::{Direction, Instruction};
use crate::complement::StackVariableAccess;
use crate::{Error, Result};

/// First local access in the expected direction at or after `start`.
///
/// A malformed operand on a matching instruction aborts the scan.
pub fn find_next<'a>(
    instructions: &[Instruction<'a>],
    start: usize,
    expect_store: bool,
) -> Result<Option<(usize, StackVariableAccess<'a>)>> {
    for (idx, instr) in instructions.iter().enumerate().skip(start) {
        if let Some(access) = StackVariableAccess::try_create(expect_store, instr)? {
            return Ok(Some((idx, access)));
        }
    }
    Ok(None)
}

/// Every local access in the expected direction, with its index.
pub fn find_all<'a>(
    instructions: &[Instruction<'a>],
    expect_store: bool,
) -> Result<Vec<(usize, StackVariableAccess<'a>)>> {
    let mut found = Vec::new();
    let mut next = 0;
    while let Some((idx, access)) = find_next(instructions, next, expect_store)? {
        found.push((idx, access));
        next = idx + 1;
    }
    Ok(found)
}

/// Insert the complementary load right after the store at `at`, leaving the
/// stored value on the evaluation stack.
pub fn insert_reload(instructions: &mut Vec<Instruction<'_>>, at: usize) -> Result<()> {
    let Some(instr) = instructions.get(at) else {
        return Err(Error::MissingInstruction);
    };
    let Some(access) = StackVariableAccess::try_create(true, instr)? else {
        return Err(Error::DirectionMismatch {
            expected: Direction::Store,
            opcode: instr.opcode,
        });
    };

    let reload = access.complement().clone();
    tracing::debug!(at, %reload, "inserting reload after store");
    instructions.insert(at + 1, reload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cil::{LocalsTable, Opcode};
    use crate::error::ErrorKind;

    #[test]
    fn finds_stores_in_order() {
        let mut locals = LocalsTable::new();
        for _ in 0..5 {
            locals.declare("int32", false).unwrap();
        }
        let v4 = locals.get(4).unwrap();
        let instrs = [
            Instruction::new(Opcode::LdcI4_1),
            Instruction::new(Opcode::Stloc0),
            Instruction::with_local(Opcode::LdlocaS, v4),
            Instruction::new(Opcode::Ldloc0),
            Instruction::with_local(Opcode::StlocS, v4),
            Instruction::new(Opcode::Ret),
        ];

        let stores = find_all(&instrs, true).unwrap();
        let indices: Vec<_> = stores.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(indices, vec![1, 4]);
        assert_eq!(stores[1].1.load().opcode, Opcode::LdlocS);

        let loads = find_all(&instrs, false).unwrap();
        let indices: Vec<_> = loads.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(indices, vec![3]);

        assert!(find_next(&instrs, 5, true).unwrap().is_none());
    }

    #[test]
    fn malformed_operand_aborts_scan() {
        let instrs = [Instruction::new(Opcode::Nop), Instruction::new(Opcode::Stloc)];
        let err = find_all(&instrs, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalState);
        // Loads are unaffected.
        assert!(find_all(&instrs, false).unwrap().is_empty());
    }

    #[test]
    fn reload_after_store() {
        let mut locals = LocalsTable::new();
        locals.declare("object", false).unwrap();
        let v0 = locals.get(0).unwrap();
        let mut instrs = vec![
            Instruction::new(Opcode::Ldnull),
            Instruction::with_local(Opcode::Stloc, v0),
            Instruction::new(Opcode::Ret),
        ];

        insert_reload(&mut instrs, 1).unwrap();

        assert_eq!(instrs.len(), 4);
        assert_eq!(instrs[2].opcode, Opcode::Ldloc);
        assert!(std::ptr::eq(instrs[2].local().unwrap(), v0));
        assert_eq!(instrs[3].opcode, Opcode::Ret);
    }

    #[test]
    fn reload_requires_a_store() {
        let mut instrs = vec![Instruction::new(Opcode::Ldloc2)];
        assert!(matches!(
            insert_reload(&mut instrs, 0),
            Err(Error::DirectionMismatch { .. })
        ));
        assert!(matches!(
            insert_reload(&mut instrs, 3),
            Err(Error::MissingInstruction)
        ));
        assert_eq!(instrs.len(), 1);
    }
}
