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

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::Parser;
use rvasm::object::ObjectReader;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "rvextract",
    version,
    about = "Print an object file's environment block and restore its archived source"
)]
struct Opts {
    /// Object file produced by rvasm
    object: PathBuf,
    /// Directory the archived source is restored into
    dest: PathBuf,
}

fn main() -> ExitCode {
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
    let display = opts.object.display();
    let file = File::open(&opts.object).with_context(|| format!("cannot open {display}"))?;
    let mut reader = ObjectReader::open(file).with_context(|| format!("cannot read {display}"))?;
    let env = reader
        .read_environment()
        .with_context(|| format!("cannot read environment block of {display}"))?;

    println!("assembled by : {}", env.user);
    println!("UUID1        : {}", env.uuid_v1);
    println!("UUID4        : {}", env.uuid_v4);
    println!("assembled at : {}", local_time(env.assemble_time));
    println!("source ctime : {}", local_time(env.source_ctime));
    println!("source atime : {}", local_time(env.source_atime));
    println!("source mtime : {}", local_time(env.source_mtime));

    reader
        .extract_source(&opts.dest)
        .with_context(|| format!("cannot extract source into {}", opts.dest.display()))?;
    Ok(())
}

/// POSIX seconds as a local-time `YYYY-MM-DD HH:MM:SS` string; values
/// outside the representable range fall back to the raw number.
fn local_time(seconds: f64) -> String {
    Local
        .timestamp_opt(seconds as i64, 0)
        .earliest()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| seconds.to_string())
}
