/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::{Context, Result, bail};
use clap::Parser;
use rvasm::object::{self, Environment};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rvasm", version, about = "Two-pass assembler for the RV32I/M minimum subset")]
struct Opts {
    /// Assembly source file (.s or .asm); the object file is written next
    /// to it with a .bin extension
    source: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rvasm=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("rvasm {}", env!("CARGO_PKG_VERSION"));

    let opts = Opts::parse();
    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &Opts) -> Result<()> {
    let source_path = &opts.source;
    let display = source_path.display().to_string();

    let extension = source_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if !matches!(extension.as_deref(), Some("s") | Some("asm")) {
        bail!("{display}: source file must have a .s or .asm extension");
    }
    let object_path = source_path.with_extension("bin");

    let text = fs::read_to_string(source_path)
        .with_context(|| format!("cannot open source file {display}"))?;

    let assembly = match rvasm::assemble_source(&text) {
        Ok(assembly) => assembly,
        Err(failure) => {
            for diagnostic in &failure.diagnostics {
                eprintln!("{display}, {diagnostic}");
            }
            bail!("{display}: assembly failed");
        }
    };

    let env = Environment::capture(source_path)
        .with_context(|| format!("cannot stat source file {display}"))?;
    let arc_name = archive_name(source_path);
    object::write_object_file(&object_path, &env, &arc_name, &text, &assembly.code)
        .with_context(|| format!("cannot write object file {}", object_path.display()))?;

    eprintln!("{display}: wrote object file {}", object_path.display());
    eprintln!("*** Labels ***");
    for (name, address) in assembly.symbols.iter() {
        eprintln!("{name:<12} = 0x{address:08x}");
    }
    Ok(())
}

/// Archive entry name for the source: its path with root and dot components
/// dropped, so the entry always extracts inside the destination directory.
fn archive_name(path: &Path) -> String {
    let parts: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        "source.s".to_string()
    } else {
        parts.join("/")
    }
}
