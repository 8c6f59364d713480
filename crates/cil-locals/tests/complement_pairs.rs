//! Load/store complement behaviour on parsed listings.

use cil_locals::error::INVALID_LOCAL_OPERAND;
use cil_locals::test_harness::*;
use cil_locals::{Error, ErrorKind, Instruction, Opcode, StackVariableAccess};

/// Fixed-slot loads and stores translate to their counterparts with no operand.
#[test]
fn test_fixed_slots_both_directions() {
    let locals = locals_table(&[]);
    let instrs = parse_listing(
        &locals,
        r"
        ldloc.0
        ldloc.1
        ldloc.2
        ldloc.3
        stloc.0
        stloc.1
        stloc.2
        stloc.3
        ",
    );

    let expected = [
        (Opcode::Ldloc0, Opcode::Stloc0),
        (Opcode::Ldloc1, Opcode::Stloc1),
        (Opcode::Ldloc2, Opcode::Stloc2),
        (Opcode::Ldloc3, Opcode::Stloc3),
    ];

    for (i, instr) in instrs.iter().enumerate() {
        let access = StackVariableAccess::new(instr.clone()).expect("fixed slot");
        let (load, store) = expected[i % 4];
        assert_pair(&access, load, store);
        assert!(access.load().operand.is_none());
        assert!(access.store().operand.is_none());
        assert_same_slot(&access);
    }
}

/// Operand-slot forms keep pointing at the declared local from the table.
#[test]
fn test_operand_slots_share_local() {
    let locals = locals_table(&["int32", "string", "object", "bool", "int64"]);
    let instrs = parse_listing(
        &locals,
        r"
        ldloc.s V_4
        stloc.s V_4
        ldloc V_2
        stloc V_2
        ",
    );

    let access = StackVariableAccess::new(instrs[0].clone()).unwrap();
    assert_pair(&access, Opcode::LdlocS, Opcode::StlocS);
    assert!(std::ptr::eq(access.store().local().unwrap(), locals.get(4).unwrap()));
    assert_same_slot(&access);

    let access = StackVariableAccess::new(instrs[1].clone()).unwrap();
    assert_pair(&access, Opcode::LdlocS, Opcode::StlocS);
    assert_same_slot(&access);

    let access = StackVariableAccess::new(instrs[2].clone()).unwrap();
    assert_pair(&access, Opcode::Ldloc, Opcode::Stloc);
    assert!(std::ptr::eq(access.store().local().unwrap(), locals.get(2).unwrap()));

    let access = StackVariableAccess::new(instrs[3].clone()).unwrap();
    assert_pair(&access, Opcode::Ldloc, Opcode::Stloc);
    assert_eq!(access.local().unwrap().type_name(), "object");
}

/// Complementing the complement gives back the original opcode.
#[test]
fn test_round_trip() {
    let locals = locals_table(&["int32", "int32"]);
    let instrs = parse_listing(
        &locals,
        "ldloc.0\nstloc.3\nldloc.s V_1\nstloc.s V_0\nldloc V_1\nstloc V_0\n",
    );

    for instr in instrs {
        let first = StackVariableAccess::new(instr.clone()).unwrap();
        let second = StackVariableAccess::new(first.complement().clone()).unwrap();
        assert_eq!(second.complement(), &instr, "round trip of {instr}");
    }
}

/// Unresolved `ldloc.s 3` carries a raw index, not a declared local.
#[test]
fn test_raw_index_operand_rejected() {
    let locals = locals_table(&["int32", "int32", "int32", "int32"]);
    let instrs = parse_listing(&locals, "ldloc.s 3\nstloc\n");

    for instr in instrs {
        let err = StackVariableAccess::new(instr).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalState);
        assert_eq!(err.to_string(), INVALID_LOCAL_OPERAND);
    }
}

#[test]
fn test_non_local_and_absent() {
    let err = StackVariableAccess::new(Instruction::new(Opcode::Add)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = StackVariableAccess::build(None).unwrap_err();
    assert!(matches!(err, Error::MissingInstruction));

    // Arguments look like locals in the listing but are not.
    let locals = locals_table(&[]);
    for instr in parse_listing(&locals, "ldarg.0\nstarg.s 1\nldarg 2\n") {
        let err = StackVariableAccess::new(instr).unwrap_err();
        assert!(matches!(err, Error::NotLocalAccess(_)), "{err}");
    }
}

/// Matcher outcomes for each expected direction.
#[test]
fn test_try_create_table() {
    let locals = locals_table(&["int32"]);
    let cases = [
        (true, "stloc.3", true),
        (true, "ldloc.3", false),
        (false, "stloc.3", false),
        (false, "ldloc.3", true),
        (false, "add", false),
        (true, "add", false),
        (false, "ldloca.s V_0", false),
        (false, "ldloca V_0", false),
        (true, "ldloca.s V_0", false),
    ];

    for (expect_store, text, is_match) in cases {
        let instrs = parse_listing(&locals, text);
        let result = StackVariableAccess::try_create(expect_store, &instrs[0])
            .unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(result.is_some(), is_match, "expect_store={expect_store} {text}");
    }
}
