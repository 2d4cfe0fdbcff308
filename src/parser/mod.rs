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

//! Line classifier.
//!
//! After comment stripping and label extraction, the body of a line is tried
//! against the grammar families in a fixed order; the first match wins. A
//! family matches only when both its operand shape fits and the mnemonic is
//! in that family's table, so a shape shared by several families (for
//! example `MN rd, rs1, rs2`) falls through until the owning family is
//! reached. A line no family accepts is a syntax error.

mod scan;

use crate::ast::{DataItem, DataWidth, Imm, Num, SourceLine, Statement};
use crate::errors::{AsmError, Diagnostic};
use crate::isa;
use scan::Cursor;

/// Classifies every line of `source` up front. Returns the classified lines
/// (empty unlabeled lines are dropped) and one syntax diagnostic per line
/// that no grammar family accepted.
pub fn parse_source(source: &str) -> (Vec<SourceLine>, Vec<Diagnostic>) {
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        match classify_line(raw) {
            Ok((None, Statement::Empty)) => {}
            Ok((label, stmt)) => lines.push(SourceLine {
                number,
                label,
                stmt,
            }),
            Err(error) => diagnostics.push(Diagnostic::new(number, error)),
        }
    }
    (lines, diagnostics)
}

/// Classifies one raw source line into an optional leading label and a
/// statement body.
pub fn classify_line(raw: &str) -> Result<(Option<String>, Statement), AsmError> {
    let code = match raw.find('#') {
        Some(i) => &raw[..i],
        None => raw,
    };
    if code.trim().is_empty() {
        return Ok((None, Statement::Empty));
    }
    // A label is recognized only at the first column.
    let (label, body) = split_label(code);
    if body.trim().is_empty() {
        return Ok((label, Statement::Empty));
    }
    match classify_body(body) {
        Some(stmt) => Ok((label, stmt)),
        None => Err(AsmError::Syntax(code.to_string())),
    }
}

fn split_label(code: &str) -> (Option<String>, &str) {
    let mut c = Cursor::new(code);
    if let Some(name) = c.label_ident() {
        if c.eat(b':') {
            return (Some(name.to_string()), c.rest());
        }
    }
    (None, code)
}

fn classify_body(body: &str) -> Option<Statement> {
    try_reg_reg_arith(body)
        .or_else(|| try_reg_imm_arith(body))
        .or_else(|| try_reg_imm_shift(body))
        .or_else(|| try_load_store(body))
        .or_else(|| try_data_xfer(body))
        .or_else(|| try_cond_branch(body))
        .or_else(|| try_jal(body))
        .or_else(|| try_def_data(body))
        .or_else(|| try_cstr(body))
}

/// `%lo(label)` or, where a family allows it, `%lo(0x...)`.
fn lo_fixup(c: &mut Cursor, allow_hex: bool) -> Option<Imm> {
    if !c.eat_str("%lo(") {
        return None;
    }
    let imm = if let Some(label) = c.label_ident() {
        Imm::Lo(label.to_string())
    } else if allow_hex {
        Imm::LoHex(c.hex()?)
    } else {
        return None;
    };
    if !c.eat(b')') {
        return None;
    }
    Some(imm)
}

fn hi_fixup(c: &mut Cursor) -> Option<Imm> {
    if !c.eat_str("%hi(") {
        return None;
    }
    let imm = if let Some(label) = c.label_ident() {
        Imm::Hi(label.to_string())
    } else {
        Imm::HiHex(c.hex()?)
    };
    if !c.eat(b')') {
        return None;
    }
    Some(imm)
}

fn try_reg_reg_arith(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !c.skip_ws1() {
        return None;
    }
    let rd = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let rs1 = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let rs2 = c.reg_ident()?;
    if !c.at_end() {
        return None;
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    isa::reg_reg_arith_opcode(&mnemonic)?;
    Some(Statement::RegRegArith {
        mnemonic,
        rd: rd.to_string(),
        rs1: rs1.to_string(),
        rs2: rs2.to_string(),
    })
}

fn try_reg_imm_arith(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !c.skip_ws1() {
        return None;
    }
    let rd = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let rs1 = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let imm = match c.number() {
        Some(Num::Dec(v)) => Imm::Dec(v),
        Some(Num::Hex(v)) => Imm::Hex(v),
        None => lo_fixup(&mut c, true)?,
    };
    if !c.at_end() {
        return None;
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    isa::reg_imm_arith_opcode(&mnemonic)?;
    Some(Statement::RegImmArith {
        mnemonic,
        rd: rd.to_string(),
        rs1: rs1.to_string(),
        imm,
    })
}

fn try_reg_imm_shift(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !c.skip_ws1() {
        return None;
    }
    let rd = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let rs1 = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let shamt = c.number()?;
    if !c.at_end() {
        return None;
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    isa::reg_imm_shift_opcode(&mnemonic)?;
    Some(Statement::RegImmShift {
        mnemonic,
        rd: rd.to_string(),
        rs1: rs1.to_string(),
        shamt,
    })
}

fn try_load_store(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !c.skip_ws1() {
        return None;
    }
    let reg = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    // This family takes decimal, hex, or %lo(label) offsets; a %lo over a
    // hex literal is not part of its grammar.
    let offset = match c.number() {
        Some(Num::Dec(v)) => Imm::Dec(v),
        Some(Num::Hex(v)) => Imm::Hex(v),
        None => lo_fixup(&mut c, false)?,
    };
    c.skip_ws();
    if !c.eat(b'(') {
        return None;
    }
    let base = c.reg_ident()?;
    if !c.eat(b')') {
        return None;
    }
    if !c.at_end() {
        return None;
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    isa::load_store_opcode(&mnemonic)?;
    Some(Statement::LoadStore {
        mnemonic,
        reg: reg.to_string(),
        offset,
        base: base.to_string(),
    })
}

fn try_data_xfer(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !c.skip_ws1() {
        return None;
    }
    let rd = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let imm = match c.number() {
        Some(Num::Dec(v)) => Imm::Dec(v),
        Some(Num::Hex(v)) => Imm::Hex(v),
        None => hi_fixup(&mut c)?,
    };
    if !c.at_end() {
        return None;
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    isa::data_xfer_opcode(&mnemonic)?;
    Some(Statement::DataXfer {
        mnemonic,
        rd: rd.to_string(),
        imm,
    })
}

fn try_cond_branch(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !c.skip_ws1() {
        return None;
    }
    let rs1 = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let rs2 = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let target = c.label_ident()?;
    if !c.at_end() {
        return None;
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    isa::cond_branch_opcode(&mnemonic)?;
    Some(Statement::CondBranch {
        mnemonic,
        rs1: rs1.to_string(),
        rs2: rs2.to_string(),
        target: target.to_string(),
    })
}

fn try_jal(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    let mnemonic = c.mnemonic()?;
    if !mnemonic.eq_ignore_ascii_case("jal") {
        return None;
    }
    if !c.skip_ws1() {
        return None;
    }
    let rd = c.reg_ident()?;
    if !c.comma() {
        return None;
    }
    let target = c.label_ident()?;
    if !c.at_end() {
        return None;
    }
    Some(Statement::Jal {
        rd: rd.to_string(),
        target: target.to_string(),
    })
}

fn try_def_data(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    if !c.eat(b'.') {
        return None;
    }
    let name = c.mnemonic()?;
    let width = match name.to_ascii_lowercase().as_str() {
        "dd" => DataWidth::Dd,
        "dw" => DataWidth::Dw,
        "db" => DataWidth::Db,
        _ => return None,
    };
    if !c.skip_ws1() {
        return None;
    }
    let mut items = Vec::new();
    loop {
        let item = match c.number() {
            Some(Num::Dec(v)) => DataItem::Dec(v),
            Some(Num::Hex(v)) => DataItem::Hex(v),
            None => DataItem::Label(c.label_ident()?.to_string()),
        };
        items.push(item);
        if !c.comma() {
            break;
        }
    }
    if !c.at_end() {
        return None;
    }
    Some(Statement::DefData { width, items })
}

fn try_cstr(body: &str) -> Option<Statement> {
    let mut c = Cursor::new(body);
    c.skip_ws();
    if !c.eat(b'.') {
        return None;
    }
    let name = c.mnemonic()?;
    if !name.eq_ignore_ascii_case("cstr") {
        return None;
    }
    if !c.skip_ws1() {
        return None;
    }
    let body = c.string_literal()?;
    if !c.at_end() {
        return None;
    }
    Some(Statement::CStr(body.to_string()))
}
