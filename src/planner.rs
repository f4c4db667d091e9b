use std::{fmt, path::Path};

use chrono::{DateTime, TimeZone};

/// Half-open byte window `[start, end)` of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Lazy walk over the windows of a file; see [`plan_ranges`].
#[derive(Debug, Clone)]
pub struct ByteRanges {
    file_size: u64,
    chunk: u64,
    offset: u64,
}

impl Iterator for ByteRanges {
    type Item = ByteRange;

    fn next(&mut self) -> Option<ByteRange> {
        if self.offset >= self.file_size {
            return None;
        }
        let end = self.offset + self.chunk.min(self.file_size - self.offset);
        let range = ByteRange { start: self.offset, end };
        self.offset = end;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.file_size - self.offset.min(self.file_size)).div_ceil(self.chunk);
        match usize::try_from(left) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Cut `file_size` bytes into consecutive windows of `chunk` bytes; the last
/// one takes whatever is left. An empty file gives no windows.
pub fn plan_ranges(file_size: u64, chunk: u64) -> ByteRanges {
    assert!(chunk > 0, "chunk size must be non-zero");
    ByteRanges {
        file_size,
        chunk,
        offset: 0,
    }
}

/// Run-wide stamp used to keep split output of separate runs apart,
/// e.g. `241031235959`.
pub fn run_stamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    now.format("%y%m%d%H%M%S").to_string()
}

/// `<name>_<stamp>`: the directory holding every chunk of one input.
pub fn split_dir_name(input: &Path, stamp: &str) -> String {
    format!("{}_{}", file_name(input), stamp)
}

/// `<name>_<index>.png`
pub fn chunk_file_name(input: &Path, index: usize) -> String {
    format!("{}_{}.png", file_name(input), index)
}

/// `<name>.png`, used when the input is rendered whole.
pub fn whole_file_name(input: &Path) -> String {
    format!("{}.png", file_name(input))
}

fn file_name(input: &Path) -> String {
    input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
