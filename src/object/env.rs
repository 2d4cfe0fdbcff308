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

//! The 80-byte environment block: two UUIDs, the assembling user, and four
//! POSIX timestamps stored as little-endian doubles.

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const ENV_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub uuid_v1: Uuid,
    pub uuid_v4: Uuid,
    pub user: String,
    pub assemble_time: f64,
    pub source_ctime: f64,
    pub source_atime: f64,
    pub source_mtime: f64,
}

impl Environment {
    /// Captures the current environment and the stat times of `source`.
    pub fn capture(source: &Path) -> io::Result<Self> {
        let meta = fs::metadata(source)?;
        let (source_ctime, source_atime, source_mtime) = stat_times(&meta);
        let seed = Uuid::new_v4().into_bytes();
        let node = [seed[0], seed[1], seed[2], seed[3], seed[4], seed[5]];
        Ok(Environment {
            uuid_v1: Uuid::now_v1(&node),
            uuid_v4: Uuid::new_v4(),
            user: user_name(),
            assemble_time: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
            source_ctime,
            source_atime,
            source_mtime,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.uuid_v1.as_bytes())?;
        out.write_all(self.uuid_v4.as_bytes())?;
        let mut name = [0u8; 16];
        let user = truncate_utf8(&self.user, 15);
        name[..user.len()].copy_from_slice(user.as_bytes());
        out.write_all(&name)?;
        for t in [
            self.assemble_time,
            self.source_ctime,
            self.source_atime,
            self.source_mtime,
        ] {
            out.write_all(&t.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> io::Result<Self> {
        let mut uuid = [0u8; 16];
        input.read_exact(&mut uuid)?;
        let uuid_v1 = Uuid::from_bytes(uuid);
        input.read_exact(&mut uuid)?;
        let uuid_v4 = Uuid::from_bytes(uuid);
        let mut name = [0u8; 16];
        input.read_exact(&mut name)?;
        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        let user = String::from_utf8_lossy(&name[..end]).into_owned();
        let mut times = [0.0f64; 4];
        for t in &mut times {
            let mut buf = [0u8; 8];
            input.read_exact(&mut buf)?;
            *t = f64::from_le_bytes(buf);
        }
        Ok(Environment {
            uuid_v1,
            uuid_v4,
            user,
            assemble_time: times[0],
            source_ctime: times[1],
            source_atime: times[2],
            source_mtime: times[3],
        })
    }
}

/// The login name, from the same environment variables `getpass`-style
/// lookups consult, falling back to `unknown`.
pub fn user_name() -> String {
    for var in ["LOGNAME", "USER", "LNAME", "USERNAME"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                return value;
            }
        }
    }
    "unknown".to_string()
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a
/// character.
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(unix)]
fn stat_times(meta: &fs::Metadata) -> (f64, f64, f64) {
    use std::os::unix::fs::MetadataExt;
    (
        meta.ctime() as f64 + meta.ctime_nsec() as f64 / 1e9,
        meta.atime() as f64 + meta.atime_nsec() as f64 / 1e9,
        meta.mtime() as f64 + meta.mtime_nsec() as f64 / 1e9,
    )
}

#[cfg(not(unix))]
fn stat_times(meta: &fs::Metadata) -> (f64, f64, f64) {
    fn secs(time: io::Result<SystemTime>) -> f64 {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
    (
        secs(meta.created()),
        secs(meta.accessed()),
        secs(meta.modified()),
    )
}
