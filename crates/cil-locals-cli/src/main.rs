use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use cil_locals::cil::listing;
use cil_locals::{LocalsTable, StackVariableAccess, scan};

#[derive(Parser)]
#[command(name = "cil-locals")]
#[command(about = "Complement CIL local loads and stores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the load/store pair for every local access in a listing
    Complement {
        #[arg(help = "Input IL listing")]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = DirectionArg::Any)]
        direction: DirectionArg,

        #[arg(long, help = "Emit JSON instead of text")]
        json: bool,
    },
    /// Insert a reload of the stored local right after a store
    Reload {
        #[arg(help = "Input IL listing")]
        input: PathBuf,

        #[arg(short, long, help = "Index of the store instruction")]
        at: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Any,
    Load,
    Store,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Complement {
            input,
            direction,
            json,
        } => {
            let text = read_listing(&input)?;
            let locals = listing::parse_locals(&text)
                .with_context(|| format!("Failed to parse locals in {}", input.display()))?;
            let instructions = listing::parse_instructions(&locals, &text)
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            let mut found = Vec::new();
            if direction != DirectionArg::Load {
                found.extend(scan::find_all(&instructions, true).context("Store scan failed")?);
            }
            if direction != DirectionArg::Store {
                found.extend(scan::find_all(&instructions, false).context("Load scan failed")?);
            }
            found.sort_by_key(|(idx, _)| *idx);
            tracing::info!(count = found.len(), "local accesses found");

            if json {
                println!("{}", render_json(&found)?);
            } else {
                for (idx, access) in &found {
                    println!("{idx}: {} <-> {}", access.load(), access.store());
                }
            }
        }
        Commands::Reload { input, at } => {
            let text = read_listing(&input)?;
            let locals = listing::parse_locals(&text)
                .with_context(|| format!("Failed to parse locals in {}", input.display()))?;
            let mut instructions = listing::parse_instructions(&locals, &text)
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            scan::insert_reload(&mut instructions, at)
                .with_context(|| format!("Cannot insert reload after instruction {at}"))?;

            print!("{}", render_listing(&locals, &instructions));
        }
    }

    Ok(())
}

fn read_listing(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn render_json(found: &[(usize, StackVariableAccess<'_>)]) -> Result<String> {
    let mut entries = Vec::with_capacity(found.len());
    for (idx, access) in found {
        let bytes = access
            .complement()
            .encode()
            .with_context(|| format!("Failed to encode complement of instruction {idx}"))?;
        entries.push(serde_json::json!({
            "index": idx,
            "slot": access.load().slot().map(|slot| slot.index()),
            "source": access.source().to_string(),
            "load": access.load().to_string(),
            "store": access.store().to_string(),
            "complement_bytes": hex(&bytes),
        }));
    }
    Ok(serde_json::to_string_pretty(&entries)?)
}

fn render_listing(locals: &LocalsTable, instructions: &[cil_locals::Instruction<'_>]) -> String {
    let mut out = String::new();
    for local in locals.iter() {
        let pinned = if local.is_pinned() { " pinned" } else { "" };
        let _ = writeln!(out, ".local {}{pinned}", local.type_name());
    }
    for instr in instructions {
        let _ = writeln!(out, "{instr}");
    }
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_listing_that_parses_back() {
        let text = ".local int32\n.local string pinned\nldloc.s V_1\nstloc.0\n";
        let locals = listing::parse_locals(text).unwrap();
        let instrs = listing::parse_instructions(&locals, text).unwrap();
        assert_eq!(render_listing(&locals, &instrs), text);
    }

    #[test]
    fn json_includes_complement_bytes() {
        let text = ".local int32\nstloc.s V_0\nstloc.2\n";
        let locals = listing::parse_locals(text).unwrap();
        let instrs = listing::parse_instructions(&locals, text).unwrap();
        let found = scan::find_all(&instrs, true).unwrap();

        let json: serde_json::Value = serde_json::from_str(&render_json(&found).unwrap()).unwrap();
        assert_eq!(json[0]["index"], 0);
        assert_eq!(json[0]["slot"], 0);
        assert_eq!(json[0]["source"], "store");
        assert_eq!(json[0]["load"], "ldloc.s V_0");
        assert_eq!(json[0]["complement_bytes"], "1100");
        assert_eq!(json[1]["slot"], 2);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(hex(&[0xFE, 0x0C, 0x01, 0x00]), "fe0c0100");
    }
}
