use clap::Parser;
use std::path::PathBuf;

use crate::format::SampleFormat;

/// Render spectrogram heat maps for a file or a whole directory tree.
///
/// Builds one FileToHeatMap command per input file, or one per byte range
/// when --max_ffts splits large captures. Commands are printed unless
/// --execute is given.
#[derive(Parser, Debug)]
#[command(
    name = "spectrumheatmap",
    version,
    about,
    long_about = None,
    after_help = "EXAMPLES:\n  spectrumheatmap -i cap.bin -s 2e6 -f 1024 -t 0.01 -y int16_t\n  spectrumheatmap -i caps/ -o pngs/ -s 2e6 -f 1024 -t 0.01 -y float -M 500 -n\n  spectrumheatmap -i cap.bin -s 2e6 -f 4096 -t 0.1 -y double -m -20 -r 60 -x"
)]
pub struct Cli {
    /// Path to the FileToHeatMap renderer (searched in ./.build, ./build and PATH if unset)
    #[arg(
        short = 'a',
        long = "app_path",
        alias = "app-path",
        env = "SPECTRUM_HEATMAP_APP",
        value_name = "PATH"
    )]
    pub app_path: Option<PathBuf>,

    /// File or directory to parse; directories are walked recursively
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output file or directory for the PNGs (defaults to beside each input)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Sample rate of the data
    #[arg(short = 's', long = "samp_rate", alias = "samp-rate", value_parser = positive_f64)]
    pub samp_rate: f64,

    /// FFT size
    #[arg(short = 'f', long = "fft_size", alias = "fft-size", value_parser = clap::value_parser!(u64).range(1..))]
    pub fft_size: u64,

    /// Time between FFTs, in seconds
    #[arg(short = 't', long, value_parser = positive_f64)]
    pub time: f64,

    /// Input sample format (int8_t, int16_t, int32_t, int64_t, uint*_t, float, double)
    #[arg(short = 'y', long, value_name = "FORMAT")]
    pub format: SampleFormat,

    /// Number of renderer threads (forwarded as-is)
    #[arg(short = 'j', long = "num_threads", alias = "num-threads", value_parser = clap::value_parser!(u64).range(1..))]
    pub num_threads: Option<u64>,

    /// Normalize the colour scale to the detected peak (takes precedence over --max_db)
    #[arg(short = 'n', long)]
    pub normalize: bool,

    /// Max FFT bin value in dB
    #[arg(short = 'm', long = "max_db", alias = "max-db", allow_negative_numbers = true)]
    pub max_db: Option<f64>,

    /// Range of the heat map in dB
    #[arg(short = 'r', long = "range_db", alias = "range-db")]
    pub range_db: Option<f64>,

    /// Split each input into several PNGs of at most this many FFTs
    #[arg(short = 'M', long = "max_ffts", alias = "max-ffts", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_ffts: Option<u64>,

    /// Run the renderer instead of printing its command lines
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// Verbose log output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("'{s}' must be a positive number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "spectrumheatmap", "-i", "cap.bin", "-s", "48000", "-f", "1024", "-t", "0.01", "-y", "float",
    ];

    #[test]
    fn required_flags_parse() {
        let cli = Cli::try_parse_from(REQUIRED).unwrap();
        assert_eq!(cli.input, PathBuf::from("cap.bin"));
        assert_eq!(cli.samp_rate, 48000.0);
        assert_eq!(cli.fft_size, 1024);
        assert_eq!(cli.time, 0.01);
        assert_eq!(cli.format, SampleFormat::Float);
        assert!(cli.output.is_none());
        assert!(cli.max_ffts.is_none());
        assert!(!cli.normalize);
        assert!(!cli.execute);
    }

    #[test]
    fn underscore_and_kebab_long_flags_both_work() {
        let a = Cli::try_parse_from([
            "spectrumheatmap", "--input", "x", "--samp_rate", "1", "--fft_size", "8",
            "--time", "1", "--format", "double", "--max_ffts", "3",
        ])
        .unwrap();
        let b = Cli::try_parse_from([
            "spectrumheatmap", "--input", "x", "--samp-rate", "1", "--fft-size", "8",
            "--time", "1", "--format", "double", "--max-ffts", "3",
        ])
        .unwrap();
        assert_eq!(a.max_ffts, Some(3));
        assert_eq!(b.max_ffts, Some(3));
        assert_eq!(a.fft_size, b.fft_size);
    }

    #[test]
    fn negative_max_db_is_accepted() {
        let mut args = REQUIRED.to_vec();
        args.extend(["-m", "-20.5"]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.max_db, Some(-20.5));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        for (idx, value) in [(4, "0"), (4, "-48000"), (6, "0"), (8, "-1"), (8, "nan")] {
            let mut args = REQUIRED.to_vec();
            args[idx] = value;
            assert!(Cli::try_parse_from(args).is_err(), "accepted {value} at {idx}");
        }
        for flag in ["-M", "-j"] {
            let mut args = REQUIRED.to_vec();
            args.extend([flag, "0"]);
            assert!(Cli::try_parse_from(args).is_err(), "accepted {flag} 0");
        }
    }

    #[test]
    fn positive_f64_accepts_scientific_notation() {
        assert_eq!(positive_f64("2e6"), Ok(2_000_000.0));
        assert!(positive_f64("inf").is_err());
        assert!(positive_f64("abc").is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut args = REQUIRED.to_vec();
        args[10] = "int128_t";
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn missing_input_is_rejected() {
        let args = ["spectrumheatmap", "-s", "1", "-f", "8", "-t", "1", "-y", "float"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
