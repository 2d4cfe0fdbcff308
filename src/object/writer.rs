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

use super::{CODE_OFFSET, ENV_OFFSET, Environment, Header, ObjectError, SRC_OFFSET_POS};
use std::fs::{self, File};
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Streams an object container: header and environment up front, then code
/// bytes, then the zipped source. The source-archive offset is not known
/// until the code section is complete, so `finish` patches it into the
/// header field reserved for it.
pub struct ObjectWriter<W: Write + Seek> {
    out: W,
}

impl<W: Write + Seek> ObjectWriter<W> {
    /// Writes the header (with a zero source offset) and the environment
    /// block, leaving the stream at the code section.
    pub fn begin(mut out: W, env: &Environment) -> Result<Self, ObjectError> {
        Header {
            env_offset: ENV_OFFSET,
            code_offset: CODE_OFFSET,
            src_offset: 0,
        }
        .write_to(&mut out)?;
        env.write_to(&mut out)?;
        Ok(ObjectWriter { out })
    }

    pub fn write_code(&mut self, bytes: &[u8]) -> Result<(), ObjectError> {
        self.out.write_all(bytes)?;
        Ok(())
    }

    /// Current byte position in the output stream.
    pub fn position(&mut self) -> Result<u64, ObjectError> {
        Ok(self.out.stream_position()?)
    }

    /// Appends the source archive and patches its offset into the header.
    /// `arc_name` is the entry name the source is stored under, normally
    /// the path the user gave on the command line.
    pub fn finish(mut self, arc_name: &str, source: &str) -> Result<W, ObjectError> {
        let src_offset = self.out.stream_position()?;
        let archive = zip_source(arc_name, source)?;
        self.out.write_all(&archive)?;
        self.out.seek(SeekFrom::Start(SRC_OFFSET_POS))?;
        self.out.write_all(&(src_offset as u32).to_le_bytes())?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// A single-entry DEFLATE zip archive holding the source text.
fn zip_source(arc_name: &str, source: &str) -> Result<Vec<u8>, ObjectError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(arc_name, options)?;
    writer.write_all(source.as_bytes())?;
    Ok(writer.finish()?.into_inner())
}

/// Writes a complete object file at `path`. A partially written file is
/// removed on any error so a failed run never leaves an object behind.
pub fn write_object_file(
    path: &Path,
    env: &Environment,
    arc_name: &str,
    source: &str,
    code: &[u8],
) -> Result<(), ObjectError> {
    let result: Result<(), ObjectError> = (|| {
        let file = File::create(path)?;
        let mut writer = ObjectWriter::begin(file, env)?;
        writer.write_code(code)?;
        writer.finish(arc_name, source)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}
