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

//! Two-pass assembler for a minimal RV32I subset with the integer
//! multiply/divide extension, and the object container it emits.
//!
//! [`assemble_source`] classifies every line once, builds the symbol table
//! (pass 1), then encodes the machine words and data bytes (pass 2). Both
//! passes collect diagnostics instead of stopping, so a run reports
//! everything it can find. The [`object`] module wraps the emitted code in a
//! self-describing container and reads it back.

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod isa;
pub mod object;
pub mod parser;

use assembler::AsmContext;
use assembler::symbol_table::SymbolTable;
use errors::AssembleFailure;
use tracing::info;

/// A successful assembly: the code section bytes and the labels bound
/// during pass 1, in definition order.
#[derive(Debug)]
pub struct Assembly {
    pub code: Vec<u8>,
    pub symbols: SymbolTable,
}

/// Assembles a source text. Pass 2 only runs when classification and
/// pass 1 finished without diagnostics; any diagnostic from either stage
/// fails the run.
pub fn assemble_source(source: &str) -> Result<Assembly, AssembleFailure> {
    let (lines, diagnostics) = parser::parse_source(source);
    let mut ctx = AsmContext::new();
    ctx.diagnostics = diagnostics;

    info!("pass 1: resolving labels");
    assembler::collect_symbols(&lines, &mut ctx);
    if !ctx.diagnostics.is_empty() {
        // syntax and label errors come from separate walks; report them in
        // source order
        ctx.diagnostics.sort_by_key(|d| d.line);
        return Err(AssembleFailure {
            diagnostics: ctx.diagnostics,
        });
    }

    info!("pass 2: emitting code");
    let code = assembler::emit_code(&lines, &mut ctx);
    if !ctx.diagnostics.is_empty() {
        return Err(AssembleFailure {
            diagnostics: ctx.diagnostics,
        });
    }

    Ok(Assembly {
        code,
        symbols: ctx.symbols,
    })
}
