//! Textual IL listings.
//!
//! Format (one item per line):
//! ```text
//! // Comments start with //
//! .local int32
//! .local uint8& pinned
//! IL_0000: ldc.i4.s 42
//! stloc.s V_1
//! ldloc 1          // raw index, not resolved to a declared local
//! ldstr "a \"quoted\" url: http://x"
//! ```
//!
//! `.local` directives declare locals in order; `V_n` names local `n`.
//! An `IL_xxxx:` prefix is accepted and ignored. Operands may be omitted so
//! that malformed streams can be fed to the resolver as-is. String literals
//! escape `"` and `\` with a backslash; `//` inside one is not a comment.

use super::{Instruction, LocalsTable, Opcode, Operand, OperandKind};
use crate::{Error, Result};

const LOCAL_DIRECTIVE: &str = ".local";

/// Collect the `.local` declarations of a listing.
pub fn parse_locals(text: &str) -> Result<LocalsTable> {
    let mut table = LocalsTable::new();

    for (line_num, line) in lines(text) {
        let Some(rest) = local_directive(line) else {
            if line.starts_with('.') {
                let directive = line.split_whitespace().next().unwrap_or(line);
                return Err(parse_error(
                    line_num,
                    format!("unknown directive '{directive}', expected '{LOCAL_DIRECTIVE}'"),
                ));
            }
            continue;
        };
        let mut parts = rest.split_whitespace();
        let type_name = parts
            .next()
            .ok_or_else(|| parse_error(line_num, "'.local' requires a type"))?;
        let pinned = match parts.next() {
            None => false,
            Some("pinned") => true,
            Some(other) => {
                return Err(parse_error(
                    line_num,
                    format!("unexpected '{other}' after local type, expected 'pinned'"),
                ));
            }
        };
        table
            .declare(type_name, pinned)
            .map_err(|e| parse_error(line_num, e.to_string()))?;
    }

    Ok(table)
}

/// Parse the instruction lines of a listing, resolving `V_n` against `locals`.
pub fn parse_instructions<'a>(
    locals: &'a LocalsTable,
    text: &str,
) -> Result<Vec<Instruction<'a>>> {
    let mut instructions = Vec::new();

    for (line_num, line) in lines(text) {
        if local_directive(line).is_some() {
            continue;
        }

        let line = strip_label(line);
        let (mnemonic, operand) = match line.split_once(char::is_whitespace) {
            Some((mnemonic, operand)) => (mnemonic, Some(operand.trim())),
            None => (line, None),
        };
        let opcode: Opcode = mnemonic
            .parse()
            .map_err(|e: super::UnknownMnemonic| parse_error(line_num, e.to_string()))?;

        let operand = match operand {
            Some(text) if !text.is_empty() => {
                Some(parse_operand(locals, opcode, text, line_num)?)
            }
            _ => None,
        };
        instructions.push(Instruction { opcode, operand });
    }

    Ok(instructions)
}

/// Non-empty lines with comments removed, numbered from 1.
fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(idx, line)| {
        let line = strip_comment(line).trim();
        (!line.is_empty()).then_some((idx + 1, line))
    })
}

/// Text before the first `//` that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let mut prev = None;

    for (idx, ch) in line.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == '/' && prev == Some('/') {
            return &line[..idx - 1];
        }
        prev = Some(ch);
    }
    line
}

/// Arguments of a `.local` directive. `.locals` and the like are not one.
fn local_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(LOCAL_DIRECTIVE)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

fn strip_label(line: &str) -> &str {
    match line.split_once(':') {
        Some((label, rest)) if label.starts_with("IL_") => rest.trim(),
        _ => line,
    }
}

fn parse_operand<'a>(
    locals: &'a LocalsTable,
    opcode: Opcode,
    text: &str,
    line_num: usize,
) -> Result<Operand<'a>> {
    let invalid = |what: &str| {
        parse_error(line_num, format!("invalid {what} operand '{text}' for {opcode}"))
    };

    match opcode.operand_kind() {
        OperandKind::None => Err(parse_error(
            line_num,
            format!("{opcode} takes no operand, found '{text}'"),
        )),
        OperandKind::ShortVariable | OperandKind::Variable => {
            if let Some(index) = text.strip_prefix("V_") {
                if !(opcode.is_ldloc() || opcode.is_stloc()) {
                    return Err(invalid("argument"));
                }
                let index: u16 = index.parse().map_err(|_| invalid("local"))?;
                let local = locals.get(index).ok_or_else(|| {
                    parse_error(line_num, format!("local V_{index} is not declared"))
                })?;
                Ok(Operand::Local(local))
            } else {
                text.parse().map(Operand::Index).map_err(|_| invalid("variable"))
            }
        }
        OperandKind::Int8 => {
            let value: i8 = text.parse().map_err(|_| invalid("int8"))?;
            Ok(Operand::Int32(i32::from(value)))
        }
        OperandKind::Int32 => text.parse().map(Operand::Int32).map_err(|_| invalid("int32")),
        OperandKind::Int64 => text.parse().map(Operand::Int64).map_err(|_| invalid("int64")),
        OperandKind::Branch => text.parse().map(Operand::Label).map_err(|_| invalid("branch")),
        OperandKind::String => {
            if let Some(token) = parse_token(text) {
                return Ok(Operand::Token(token));
            }
            text.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .and_then(unescape)
                .map(Operand::String)
                .ok_or_else(|| invalid("string"))
        }
        OperandKind::Token => parse_token(text)
            .map(Operand::Token)
            .ok_or_else(|| invalid("token")),
    }
}

/// Body of a string literal with `\"` and `\\` resolved. `None` on a bare
/// quote or any other escape.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                escaped @ ('"' | '\\') => out.push(escaped),
                _ => return None,
            },
            '"' => return None,
            _ => out.push(ch),
        }
    }
    Some(out)
}

fn parse_token(text: &str) -> Option<u32> {
    let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
    u32::from_str_radix(hex, 16).ok()
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}
