//! Workspace task runner: `cargo run -p xtask -- <task>`.

use std::env;
use std::path::Path;
use std::process::{Command, ExitCode};

use geosql_core::srs::BUILTIN_SYSTEMS;

const USAGE: &str = "usage: xtask precommit [--full] | xtask srs";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let outcome = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["precommit"] => precommit(false),
        ["precommit", "--full"] => precommit(true),
        ["srs"] => {
            list_systems();
            Ok(())
        }
        _ => Err(USAGE.to_string()),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xtask: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Formatting, lints and tests for the whole workspace; `--full` adds the
/// doc tests and an optimised property-test run.
fn precommit(full: bool) -> Result<(), String> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .ok_or("xtask is not inside a workspace")?;

    let mut steps = vec![
        "fmt --all -- --check",
        "clippy --workspace --all-targets -- -D warnings",
        "test --workspace",
    ];
    if full {
        steps.push("test -p geosql-core --doc");
        steps.push("test -p geosql-core --release --test properties");
    }

    for step in steps {
        eprintln!("+ cargo {step}");
        let status = Command::new("cargo")
            .args(step.split_whitespace())
            .current_dir(root)
            .status()
            .map_err(|e| format!("cargo {step}: {e}"))?;
        if !status.success() {
            return Err(format!("cargo {step} failed with {status}"));
        }
    }
    Ok(())
}

fn list_systems() {
    println!("{:>6}  {:<10}  NAME", "SRID", "KIND");
    for system in BUILTIN_SYSTEMS {
        let kind = if system.geographic {
            "geographic"
        } else {
            "projected"
        };
        println!("{:>6}  {:<10}  {}", system.srid, kind, system.name);
    }
}
