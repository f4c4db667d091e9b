use std::{fmt, process::ExitStatus, str::FromStr};
use thiserror::Error;

/// Raw sample encodings understood by the renderer's `-y` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 10] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float,
        Self::Double,
    ];

    /// Bytes per real value. One complex sample is two of these.
    pub fn width(self) -> u64 {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
        }
    }

    /// Canonical label, exactly as the renderer expects it.
    pub fn label(self) -> &'static str {
        match self {
            Self::Int8 => "int8_t",
            Self::Int16 => "int16_t",
            Self::Int32 => "int32_t",
            Self::Int64 => "int64_t",
            Self::UInt8 => "uint8_t",
            Self::UInt16 => "uint16_t",
            Self::UInt32 => "uint32_t",
            Self::UInt64 => "uint64_t",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl FromStr for SampleFormat {
    type Err = HeatMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.label() == wanted)
            .ok_or_else(|| HeatMapError::UnknownFormat(s.to_owned()))
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum HeatMapError {
    #[error("Unknown sample format '{0}'; supported: int8_t int16_t int32_t int64_t uint8_t uint16_t uint32_t uint64_t float double")]
    UnknownFormat(String),

    #[error("No files to parse, invalid input? ('{0}')")]
    NoInputFiles(String),

    #[error("Failed to find valid directory from output '{0}': parent directory does not exist")]
    OutputParentMissing(String),

    #[error("Output '{0}' is an existing file but the input is a directory")]
    OutputNotADirectory(String),

    #[error("Output '{0}' names a single file, which cannot hold split output (drop --max_ffts or pass a directory)")]
    NamedOutputWithSplit(String),

    #[error("Output '{0}' ends in a path separator but is not an existing directory")]
    NamedOutputIsDirectory(String),

    #[error("Output '{0}' is already used by another input of this run")]
    OutputClash(String),

    #[error("Chunk size overflows: {width} bytes x {fft_size} bins x 2 x {max_ffts} FFTs")]
    ChunkSizeOverflow {
        width: u64,
        fft_size: u64,
        max_ffts: u64,
    },

    #[error("Renderer exited with {status}: {command}")]
    RendererFailed { command: String, status: ExitStatus },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}
