//! Level file checker.
//!
//! Validates level JSON files and prints one line per file, `OK <path>` or
//! `INVALID <path>: <reason>`. Directory arguments are scanned (one level
//! deep) for `.json` files. Exits non-zero when any file fails, so the
//! checker slots into CI.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;

use tilematch::level::load_level;

fn collect_targets(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !path.is_dir() {
        out.push(path.to_path_buf());
        return Ok(());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let p = entry?.path();
        if p.is_file() && p.extension().map_or(false, |e| e == "json") {
            found.push(p);
        }
    }
    found.sort();
    out.extend(found);
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: level-check <FILE|DIR>...");
        return ExitCode::from(2);
    }

    let mut targets = Vec::new();
    for arg in &args {
        if let Err(err) = collect_targets(Path::new(arg), &mut targets) {
            eprintln!("INVALID {}: {:#}", arg, err);
            return ExitCode::FAILURE;
        }
    }
    if targets.is_empty() {
        eprintln!("no level files found");
        return ExitCode::from(2);
    }

    let mut failed = 0u32;
    for path in &targets {
        match load_level(path) {
            Ok(spec) => println!("OK {} (level {})", path.display(), spec.id),
            Err(err) => {
                eprintln!("INVALID {}: {:#}", path.display(), err);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        eprintln!("{} of {} file(s) invalid", failed, targets.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
