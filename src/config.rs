use log::debug;

use crate::{
    cli::Cli,
    format::{HeatMapError, SampleFormat},
};

/// How the renderer should place the top of its colour scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ceiling {
    /// Let the renderer pick its default.
    Auto,
    /// Map the detected peak to the top of the scale.
    Normalize,
    /// Fixed ceiling in dB.
    MaxDb(f64),
}

/// Everything that stays the same across the files of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sample_rate: f64,
    pub fft_size: u64,
    pub time_step: f64,
    pub format: SampleFormat,
    pub num_threads: Option<u64>,
    pub ceiling: Ceiling,
    pub range_db: Option<f64>,
    pub max_ffts: Option<u64>,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        // --normalize and --max_db are exclusive; normalize wins.
        let ceiling = match (cli.normalize, cli.max_db) {
            (true, Some(db)) => {
                debug!("--normalize given, ignoring --max_db {db}");
                Ceiling::Normalize
            }
            (true, None) => Ceiling::Normalize,
            (false, Some(db)) => Ceiling::MaxDb(db),
            (false, None) => Ceiling::Auto,
        };

        Self {
            sample_rate: cli.samp_rate,
            fft_size: cli.fft_size,
            time_step: cli.time,
            format: cli.format,
            num_threads: cli.num_threads,
            ceiling,
            range_db: cli.range_db,
            max_ffts: cli.max_ffts,
        }
    }

    /// Largest byte range handed to a single renderer call, or `None` when
    /// the input should not be split.
    ///
    /// `width * fft_size * 2 * max_ffts`: the renderer reads interleaved
    /// complex samples, so every FFT bin costs two values.
    pub fn max_chunk_bytes(&self) -> Result<Option<u64>, HeatMapError> {
        let Some(max_ffts) = self.max_ffts else {
            return Ok(None);
        };
        let width = self.format.width();
        width
            .checked_mul(self.fft_size)
            .and_then(|b| b.checked_mul(2))
            .and_then(|b| b.checked_mul(max_ffts))
            .map(Some)
            .ok_or(HeatMapError::ChunkSizeOverflow {
                width,
                fft_size: self.fft_size,
                max_ffts,
            })
    }
}
