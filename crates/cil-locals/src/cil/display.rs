use std::fmt::{self, Write as _};

use super::{Instruction, Operand};

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Local(local) => write!(f, "V_{}", local.index()),
            Operand::Index(index) => write!(f, "{index}"),
            Operand::Int32(v) | Operand::Label(v) => write!(f, "{v}"),
            Operand::Int64(v) => write!(f, "{v}"),
            Operand::String(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    if matches!(ch, '"' | '\\') {
                        f.write_char('\\')?;
                    }
                    f.write_char(ch)?;
                }
                f.write_str("\"")
            }
            Operand::Token(token) => write!(f, "0x{token:08x}"),
        }
    }
}

impl fmt::Display for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Some(operand) => write!(f, "{} {operand}", self.opcode),
            None => write!(f, "{}", self.opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cil::{Instruction, LocalsTable, Opcode, Operand};

    #[test]
    fn display_listing_syntax() {
        let mut table = LocalsTable::new();
        table.declare("int32", false).unwrap();
        table.declare("string", false).unwrap();
        let local = table.get(1).unwrap();

        assert_eq!(Instruction::new(Opcode::Ldloc3).to_string(), "ldloc.3");
        assert_eq!(
            Instruction::with_local(Opcode::StlocS, local).to_string(),
            "stloc.s V_1"
        );
        assert_eq!(
            Instruction::with_operand(Opcode::Ldloc, Operand::Index(9)).to_string(),
            "ldloc 9"
        );
        assert_eq!(
            Instruction::with_operand(Opcode::Call, Operand::Token(0x0A00_0012)).to_string(),
            "call 0x0a000012"
        );
        assert_eq!(
            Instruction::with_operand(Opcode::Ldstr, Operand::String("hi".into())).to_string(),
            "ldstr \"hi\""
        );
    }

    #[test]
    fn string_operands_escape_quotes_and_backslashes() {
        let operand = Operand::String(r#"say "hi" \ bye"#.into());
        assert_eq!(operand.to_string(), r#""say \"hi\" \\ bye""#);
        assert_eq!(
            Operand::String("http://x".into()).to_string(),
            "\"http://x\""
        );
    }
}
