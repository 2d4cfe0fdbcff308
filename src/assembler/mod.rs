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

pub mod encoder;
pub mod symbol_table;

use crate::ast::{SourceLine, Statement};
use crate::errors::{AsmError, Diagnostic};
use crate::isa;
use symbol_table::SymbolTable;

/// State threaded through both passes: the location counter, the symbol
/// table built by pass 1, and every diagnostic reported so far.
#[derive(Debug, Default)]
pub struct AsmContext {
    pub loc: u32,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl AsmContext {
    pub fn new() -> Self {
        AsmContext::default()
    }

    fn report(&mut self, line: usize, error: AsmError) {
        self.diagnostics.push(Diagnostic::new(line, error));
    }
}

/// Pass 1: walk every classified line, advance the location counter by the
/// oracle's padding and size, and bind each leading label to the
/// post-padding address. Label misuse is reported but the walk continues so
/// the whole pass's diagnostics come out in one run.
pub fn collect_symbols(lines: &[SourceLine], ctx: &mut AsmContext) {
    ctx.loc = 0;
    for line in lines {
        ctx.loc += encoder::padding_for(&line.stmt, ctx.loc);
        if let Some(label) = &line.label {
            if isa::is_reserved_word(label) {
                ctx.report(line.number, AsmError::ReservedLabel(label.clone()));
            } else if !ctx.symbols.bind(label, ctx.loc) {
                ctx.report(line.number, AsmError::DuplicateLabel(label.clone()));
            }
        }
        ctx.loc += encoder::statement_size(&line.stmt);
    }
}

/// Pass 2: re-walk the classified lines and emit little-endian code bytes.
/// Alignment padding is emitted as zero bytes. A statement that fails a
/// range or resolution check is reported and its bytes are skipped; the
/// counter still advances so later PC-relative checks see the addresses
/// pass 1 used.
pub fn emit_code(lines: &[SourceLine], ctx: &mut AsmContext) -> Vec<u8> {
    let mut code = Vec::new();
    ctx.loc = 0;
    for line in lines {
        let padding = encoder::padding_for(&line.stmt, ctx.loc);
        code.resize(code.len() + padding as usize, 0);
        ctx.loc += padding;
        match &line.stmt {
            Statement::Empty => {}
            Statement::DefData { width, items } => {
                for item in items {
                    match encoder::encode_data_item(*width, item, &ctx.symbols) {
                        Ok(bytes) => code.extend_from_slice(&bytes),
                        Err(error) => ctx.diagnostics.push(Diagnostic::new(line.number, error)),
                    }
                    ctx.loc += width.unit();
                }
            }
            Statement::CStr(body) => {
                code.extend_from_slice(body.as_bytes());
                code.push(0);
                ctx.loc += body.len() as u32 + 1;
            }
            stmt => {
                match encoder::encode_instruction(stmt, ctx.loc, &ctx.symbols) {
                    Ok(word) => code.extend_from_slice(&word.to_le_bytes()),
                    Err(error) => ctx.diagnostics.push(Diagnostic::new(line.number, error)),
                }
                ctx.loc += 4;
            }
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn pass1(source: &str) -> AsmContext {
        let (lines, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "unexpected syntax errors");
        let mut ctx = AsmContext::new();
        collect_symbols(&lines, &mut ctx);
        ctx
    }

    #[test]
    fn test_label_binds_after_padding() {
        let ctx = pass1(".db 1\nL: .dd 2\n");
        // one data byte, then three pad bytes before the aligned .dd
        assert_eq!(ctx.symbols.get("L"), Some(4));
        assert_eq!(ctx.loc, 8);
    }

    #[test]
    fn test_label_only_line_binds_current_counter() {
        let ctx = pass1(".db 1, 2, 3\nhere:\n.dd 9\n");
        assert_eq!(ctx.symbols.get("here"), Some(3));
    }

    #[test]
    fn test_duplicate_label_reported() {
        let (lines, _) = parse_source("x: addi x1, x0, 0\nx: addi x2, x0, 0\n");
        let mut ctx = AsmContext::new();
        collect_symbols(&lines, &mut ctx);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].line, 2);
        assert_eq!(
            ctx.diagnostics[0].error,
            AsmError::DuplicateLabel("x".into())
        );
        assert_eq!(ctx.symbols.get("x"), Some(0));
    }

    #[test]
    fn test_reserved_label_reported() {
        let (lines, _) = parse_source("sp: .db 1\n");
        let mut ctx = AsmContext::new();
        collect_symbols(&lines, &mut ctx);
        assert_eq!(
            ctx.diagnostics[0].error,
            AsmError::ReservedLabel("sp".into())
        );
    }

    #[test]
    fn test_both_passes_agree_on_the_counter() {
        let source = "\
start: addi x1, x0, 5
.db 1, 2, 3
.dw 0x1234
str: .cstr \"hi\"
.dd 7
end: jal x0, start
";
        let (lines, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty());
        let mut ctx = AsmContext::new();
        collect_symbols(&lines, &mut ctx);
        let pass1_loc = ctx.loc;
        let code = emit_code(&lines, &mut ctx);
        assert!(ctx.diagnostics.is_empty(), "{:?}", ctx.diagnostics);
        assert_eq!(ctx.loc, pass1_loc);
        assert_eq!(code.len() as u32, pass1_loc);
    }

    #[test]
    fn test_emit_pads_with_zero_bytes() {
        let (lines, _) = parse_source(".db 1\n.dd 0x11223344\n");
        let mut ctx = AsmContext::new();
        collect_symbols(&lines, &mut ctx);
        let code = emit_code(&lines, &mut ctx);
        assert_eq!(code, vec![1, 0, 0, 0, 0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_errors_do_not_stop_the_pass() {
        let source = "addi x1, x0, 4096\naddi x2, x0, 1\nbeq x1, x2, gone\n";
        let (lines, _) = parse_source(source);
        let mut ctx = AsmContext::new();
        collect_symbols(&lines, &mut ctx);
        let code = emit_code(&lines, &mut ctx);
        // the two bad lines are reported, the good one still encodes
        assert_eq!(ctx.diagnostics.len(), 2);
        assert_eq!(ctx.diagnostics[0].line, 1);
        assert_eq!(ctx.diagnostics[1].line, 3);
        assert_eq!(code, 0x0010_0113u32.to_le_bytes().to_vec());
    }
}
