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

//! The object container: a fixed header, an environment block describing
//! who assembled what and when, the code section, and the original source
//! appended as a DEFLATE zip archive.
//!
//! ```text
//! 00  "FURV0000"   magic
//! 08  u32le        environment offset (0x14)
//! 0C  u32le        code offset (0x64)
//! 10  u32le        source archive offset, patched once known
//! 14  80 bytes     environment block
//! 64  code and data
//! ..  zip archive of the source
//! ```

pub mod env;
mod reader;
mod writer;

pub use env::Environment;
pub use reader::ObjectReader;
pub use writer::{ObjectWriter, write_object_file};

use std::io::{Read, Write};
use thiserror::Error;

pub const MAGIC: &[u8; 8] = b"FURV0000";
pub const ENV_OFFSET: u32 = 0x14;
pub const CODE_OFFSET: u32 = 0x64;
/// Byte position of the source-archive offset field inside the header.
pub(crate) const SRC_OFFSET_POS: u64 = 0x10;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("not an object file (bad magic)")]
    BadMagic,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("source archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// The 20-byte fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub env_offset: u32,
    pub code_offset: u32,
    pub src_offset: u32,
}

impl Header {
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), ObjectError> {
        out.write_all(MAGIC)?;
        out.write_all(&self.env_offset.to_le_bytes())?;
        out.write_all(&self.code_offset.to_le_bytes())?;
        out.write_all(&self.src_offset.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> Result<Self, ObjectError> {
        let mut magic = [0u8; 8];
        input.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ObjectError::BadMagic);
        }
        let mut word = [0u8; 4];
        input.read_exact(&mut word)?;
        let env_offset = u32::from_le_bytes(word);
        input.read_exact(&mut word)?;
        let code_offset = u32::from_le_bytes(word);
        input.read_exact(&mut word)?;
        let src_offset = u32::from_le_bytes(word);
        Ok(Header {
            env_offset,
            code_offset,
            src_offset,
        })
    }
}
