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

//! Opcode and register tables for the supported RV32I/M subset.
//!
//! Each table maps a lowercase mnemonic to a 32-bit base pattern with the
//! opcode, funct3, and funct7 fields already placed and every register and
//! immediate field zeroed. Encoding OR-combines a base with the placed
//! operand fields.

/// `jal` base pattern (J-type, opcode 1101111).
pub const JAL: u32 = 0b0_0000000000_0_00000000_00000_1101111;

/// Register number for a canonical `x0`..`x31` name or an ABI alias.
/// Lookup is case-insensitive. Both `s0` and `fp` name register 8.
pub fn register_index(name: &str) -> Option<u32> {
    let index = match name.to_ascii_lowercase().as_str() {
        "x0" | "zero" => 0,
        "x1" | "ra" => 1,
        "x2" | "sp" => 2,
        "x3" | "gp" => 3,
        "x4" | "tp" => 4,
        "x5" | "t0" => 5,
        "x6" | "t1" => 6,
        "x7" | "t2" => 7,
        "x8" | "s0" | "fp" => 8,
        "x9" | "s1" => 9,
        "x10" | "a0" => 10,
        "x11" | "a1" => 11,
        "x12" | "a2" => 12,
        "x13" | "a3" => 13,
        "x14" | "a4" => 14,
        "x15" | "a5" => 15,
        "x16" | "a6" => 16,
        "x17" | "a7" => 17,
        "x18" | "s2" => 18,
        "x19" | "s3" => 19,
        "x20" | "s4" => 20,
        "x21" | "s5" => 21,
        "x22" | "s6" => 22,
        "x23" | "s7" => 23,
        "x24" | "s8" => 24,
        "x25" | "s9" => 25,
        "x26" | "s10" => 26,
        "x27" | "s11" => 27,
        "x28" | "t3" => 28,
        "x29" | "t4" => 29,
        "x30" | "t5" => 30,
        "x31" | "t6" => 31,
        _ => return None,
    };
    Some(index)
}

/// Register-register arithmetic/logic base patterns (R-type, opcode 0110011),
/// including the multiply/divide extension rows (funct7 = 0000001).
pub fn reg_reg_arith_opcode(mnemonic: &str) -> Option<u32> {
    let base = match mnemonic {
        "add" => 0b0000000_00000_00000_000_00000_0110011,
        "sub" => 0b0100000_00000_00000_000_00000_0110011,
        "and" => 0b0000000_00000_00000_111_00000_0110011,
        "or" => 0b0000000_00000_00000_110_00000_0110011,
        "xor" => 0b0000000_00000_00000_100_00000_0110011,
        "slt" => 0b0000000_00000_00000_010_00000_0110011,
        "sltu" => 0b0000000_00000_00000_011_00000_0110011,
        "sll" => 0b0000000_00000_00000_001_00000_0110011,
        "srl" => 0b0000000_00000_00000_101_00000_0110011,
        "sra" => 0b0100000_00000_00000_101_00000_0110011,
        "mul" => 0b0000001_00000_00000_000_00000_0110011,
        "mulh" => 0b0000001_00000_00000_001_00000_0110011,
        "mulhsu" => 0b0000001_00000_00000_010_00000_0110011,
        "mulhu" => 0b0000001_00000_00000_011_00000_0110011,
        "div" => 0b0000001_00000_00000_100_00000_0110011,
        "divu" => 0b0000001_00000_00000_101_00000_0110011,
        "rem" => 0b0000001_00000_00000_110_00000_0110011,
        "remu" => 0b0000001_00000_00000_111_00000_0110011,
        _ => return None,
    };
    Some(base)
}

/// Register-immediate arithmetic/logic base patterns (opcode 0010011) plus
/// `jalr` (opcode 1100111), which shares the operand shape.
pub fn reg_imm_arith_opcode(mnemonic: &str) -> Option<u32> {
    let base = match mnemonic {
        "addi" => 0b000000000000_00000_000_00000_0010011,
        "andi" => 0b000000000000_00000_111_00000_0010011,
        "ori" => 0b000000000000_00000_110_00000_0010011,
        "xori" => 0b000000000000_00000_100_00000_0010011,
        "slti" => 0b000000000000_00000_010_00000_0010011,
        "sltiu" => 0b000000000000_00000_011_00000_0010011,
        "jalr" => 0b000000000000_00000_000_00000_1100111,
        _ => return None,
    };
    Some(base)
}

/// Immediate shift base patterns; funct7 distinguishes `srai` from `srli`.
pub fn reg_imm_shift_opcode(mnemonic: &str) -> Option<u32> {
    let base = match mnemonic {
        "slli" => 0b0000000_00000_00000_001_00000_0010011,
        "srli" => 0b0000000_00000_00000_101_00000_0010011,
        "srai" => 0b0100000_00000_00000_101_00000_0010011,
        _ => return None,
    };
    Some(base)
}

/// Load (opcode 0000011) and store (opcode 0100011) base patterns.
pub fn load_store_opcode(mnemonic: &str) -> Option<u32> {
    let base = match mnemonic {
        "lw" => 0b000000000000_00000_010_00000_0000011,
        "lh" => 0b000000000000_00000_001_00000_0000011,
        "lhu" => 0b000000000000_00000_101_00000_0000011,
        "lb" => 0b000000000000_00000_000_00000_0000011,
        "lbu" => 0b000000000000_00000_100_00000_0000011,
        "sw" => 0b0000000_00000_00000_010_00000_0100011,
        "sh" => 0b0000000_00000_00000_001_00000_0100011,
        "sb" => 0b0000000_00000_00000_000_00000_0100011,
        _ => return None,
    };
    Some(base)
}

pub fn is_load(mnemonic: &str) -> bool {
    matches!(mnemonic, "lw" | "lh" | "lhu" | "lb" | "lbu")
}

/// Upper-immediate base patterns (U-type).
pub fn data_xfer_opcode(mnemonic: &str) -> Option<u32> {
    let base = match mnemonic {
        "lui" => 0b0000000000000000000_00000_0110111,
        "auipc" => 0b0000000000000000000_00000_0010111,
        _ => return None,
    };
    Some(base)
}

/// Conditional branch base patterns (B-type, opcode 1100011).
pub fn cond_branch_opcode(mnemonic: &str) -> Option<u32> {
    let base = match mnemonic {
        "beq" => 0b0_000000_00000_00000_000_0000_0_1100011,
        "bne" => 0b0_000000_00000_00000_001_0000_0_1100011,
        "blt" => 0b0_000000_00000_00000_100_0000_0_1100011,
        "bge" => 0b0_000000_00000_00000_101_0000_0_1100011,
        "bltu" => 0b0_000000_00000_00000_110_0000_0_1100011,
        "bgeu" => 0b0_000000_00000_00000_111_0000_0_1100011,
        _ => return None,
    };
    Some(base)
}

/// True if `name` may not be used as a label or jump target: every register
/// name, ABI alias, mnemonic, and directive, compared case-insensitively.
/// (Directive names contain a dot and can never collide with a label, but
/// they are part of the reserved set all the same.)
pub fn is_reserved_word(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    register_index(&lower).is_some()
        || reg_reg_arith_opcode(&lower).is_some()
        || reg_imm_arith_opcode(&lower).is_some()
        || reg_imm_shift_opcode(&lower).is_some()
        || load_store_opcode(&lower).is_some()
        || data_xfer_opcode(&lower).is_some()
        || cond_branch_opcode(&lower).is_some()
        || lower == "jal"
        || matches!(lower.as_str(), ".dd" | ".dw" | ".db" | ".cstr")
}
