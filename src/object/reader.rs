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

use super::{Environment, Header, ObjectError};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use zip::ZipArchive;

/// Reads an object container back: header, environment block, code
/// section, and the archived source.
pub struct ObjectReader<R: Read + Seek> {
    input: R,
    header: Header,
}

impl<R: Read + Seek> ObjectReader<R> {
    /// Reads and verifies the fixed header.
    pub fn open(mut input: R) -> Result<Self, ObjectError> {
        let header = Header::read_from(&mut input)?;
        Ok(ObjectReader { input, header })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn read_environment(&mut self) -> Result<Environment, ObjectError> {
        self.input
            .seek(SeekFrom::Start(u64::from(self.header.env_offset)))?;
        Ok(Environment::read_from(&mut self.input)?)
    }

    /// The code section: everything between the code offset and the source
    /// archive.
    pub fn read_code(&mut self) -> Result<Vec<u8>, ObjectError> {
        self.input
            .seek(SeekFrom::Start(u64::from(self.header.code_offset)))?;
        let len = self.header.src_offset.saturating_sub(self.header.code_offset);
        let mut code = vec![0u8; len as usize];
        self.input.read_exact(&mut code)?;
        Ok(code)
    }

    /// Unpacks the archived source into `dest`, creating directories as the
    /// archive requires.
    pub fn extract_source(&mut self, dest: &Path) -> Result<(), ObjectError> {
        self.input
            .seek(SeekFrom::Start(u64::from(self.header.src_offset)))?;
        let mut raw = Vec::new();
        self.input.read_to_end(&mut raw)?;
        let mut archive = ZipArchive::new(Cursor::new(raw))?;
        archive.extract(dest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CODE_OFFSET, ObjectWriter, env::ENV_LEN};
    use std::io::Cursor;
    use uuid::Uuid;

    fn sample_env() -> Environment {
        Environment {
            uuid_v1: Uuid::from_u128(1),
            uuid_v4: Uuid::from_u128(2),
            user: "carol".to_string(),
            assemble_time: 1e9,
            source_ctime: 2e9,
            source_atime: 3e9,
            source_mtime: 4e9,
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let env = sample_env();
        let code = [0x93u8, 0x00, 0x50, 0x00];
        let mut writer =
            ObjectWriter::begin(Cursor::new(Vec::new()), &env).unwrap();
        writer.write_code(&code).unwrap();
        let cursor = writer.finish("prog.s", "start: addi x1, x0, 5\n").unwrap();

        let mut reader = ObjectReader::open(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(reader.header().env_offset, 0x14);
        assert_eq!(reader.header().code_offset, CODE_OFFSET);
        assert_eq!(
            reader.header().src_offset,
            CODE_OFFSET + code.len() as u32
        );
        assert_eq!(reader.read_environment().unwrap(), env);
        assert_eq!(reader.read_code().unwrap(), code);
    }

    #[test]
    fn test_code_section_starts_at_0x64() {
        let env = sample_env();
        let mut writer = ObjectWriter::begin(Cursor::new(Vec::new()), &env).unwrap();
        let pos = writer.position().unwrap();
        assert_eq!(pos, 20 + ENV_LEN as u64);
        assert_eq!(pos, u64::from(CODE_OFFSET));
    }

    #[test]
    fn test_extract_restores_the_source() {
        let env = sample_env();
        let source = "L: beq x1, x2, L\n";
        let mut writer = ObjectWriter::begin(Cursor::new(Vec::new()), &env).unwrap();
        writer.write_code(&[0x63, 0x80, 0x20, 0x00]).unwrap();
        let cursor = writer.finish("prog.s", source).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut reader = ObjectReader::open(Cursor::new(cursor.into_inner())).unwrap();
        reader.extract_source(dir.path()).unwrap();
        let restored = std::fs::read_to_string(dir.path().join("prog.s")).unwrap();
        assert_eq!(restored, source);
    }
}
