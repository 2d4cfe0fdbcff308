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

// Register operands keep their source spelling here. Which family a line
// belongs to is decided by its shape and mnemonic alone; register names are
// validated only when the line is encoded in pass 2.

/// A numeric literal: signed decimal or `0x` hexadecimal.
///
/// Values past the widest representable range are saturated by the scanner,
/// so every range check downstream still rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Num {
    Dec(i64),
    Hex(u64),
}

/// An immediate operand, including the `%hi`/`%lo` fixup forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
    Dec(i64),
    Hex(u64),
    /// `%lo(label)`: low 12 bits of the label address.
    Lo(String),
    /// `%lo(0x...)`: low 12 bits of a 32-bit literal.
    LoHex(u64),
    /// `%hi(label)`: high 20 bits of the label address.
    Hi(String),
    /// `%hi(0x...)`: high 20 bits of a 32-bit literal.
    HiHex(u64),
}

/// One element of a `.dd`/`.dw`/`.db` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataItem {
    Dec(i64),
    Hex(u64),
    Label(String),
}

/// Unit width of a data definition directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataWidth {
    /// `.dd`: 4-byte items.
    Dd,
    /// `.dw`: 2-byte items.
    Dw,
    /// `.db`: 1-byte items.
    Db,
}

impl DataWidth {
    pub fn unit(self) -> u32 {
        match self {
            DataWidth::Dd => 4,
            DataWidth::Dw => 2,
            DataWidth::Db => 1,
        }
    }

    pub fn directive(self) -> &'static str {
        match self {
            DataWidth::Dd => ".dd",
            DataWidth::Dw => ".dw",
            DataWidth::Db => ".db",
        }
    }
}

/// The classified body of a source line. Mnemonics are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `MN rd, rs1, rs2` (base R-type and the multiply/divide extension).
    RegRegArith {
        mnemonic: String,
        rd: String,
        rs1: String,
        rs2: String,
    },
    /// `MN rd, rs1, imm12` (I-type arithmetic and `jalr`).
    RegImmArith {
        mnemonic: String,
        rd: String,
        rs1: String,
        imm: Imm,
    },
    /// `MN rd, rs1, shamt`.
    RegImmShift {
        mnemonic: String,
        rd: String,
        rs1: String,
        shamt: Num,
    },
    /// `MN reg, offset(rs1)`.
    LoadStore {
        mnemonic: String,
        reg: String,
        offset: Imm,
        base: String,
    },
    /// `MN rd, imm20` (`lui`/`auipc`).
    DataXfer {
        mnemonic: String,
        rd: String,
        imm: Imm,
    },
    /// `MN rs1, rs2, label`.
    CondBranch {
        mnemonic: String,
        rs1: String,
        rs2: String,
        target: String,
    },
    /// `jal rd, label`.
    Jal { rd: String, target: String },
    /// `.dd`/`.dw`/`.db` with its item list.
    DefData {
        width: DataWidth,
        items: Vec<DataItem>,
    },
    /// `.cstr "..."`: the string body, NUL appended on emission.
    CStr(String),
    /// Whitespace-only body (possibly after a label).
    Empty,
}

/// A classified source line: 1-based line number, optional leading label,
/// and the statement body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub label: Option<String>,
    pub stmt: Statement,
}
