use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, warn};

use crate::{
    config::{Ceiling, RunConfig},
    planner::ByteRange,
};

/// Renderer binary name when nothing better is found.
pub const RENDERER_NAME: &str = "FileToHeatMap";

/// Build directories tried, in order, before falling back to `PATH`.
const COMMON_LOCATIONS: [&str; 2] = ["./.build/apps/FileToHeatMap", "./build/apps/FileToHeatMap"];

/// Pick the renderer: an explicit path if it is a file, then the usual build
/// output locations, then the bare name for `PATH` lookup.
pub fn locate_renderer(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        if path.is_file() {
            return path.to_path_buf();
        }
        warn!(
            "Renderer '{}' is not a file, searching the usual locations",
            path.display()
        );
    }

    for candidate in COMMON_LOCATIONS {
        let p = Path::new(candidate);
        if p.is_file() {
            debug!("Using renderer at {}", p.display());
            return p.to_path_buf();
        }
    }

    debug!("Falling back to '{RENDERER_NAME}' from PATH");
    PathBuf::from(RENDERER_NAME)
}

/// One renderer invocation as a program plus literal argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl RendererCommand {
    pub fn new(
        program: &Path,
        input: &Path,
        output: &Path,
        cfg: &RunConfig,
        range: Option<ByteRange>,
    ) -> Self {
        let mut cmd = Self {
            program: program.to_path_buf(),
            args: Vec::new(),
        };

        cmd.flag("-i", input);
        cmd.flag("-o", output);
        cmd.flag("-s", cfg.sample_rate.to_string());
        cmd.flag("-f", cfg.fft_size.to_string());
        cmd.flag("-t", cfg.time_step.to_string());
        cmd.flag("-y", cfg.format.label());
        if let Some(j) = cfg.num_threads {
            cmd.flag("-j", j.to_string());
        }
        match cfg.ceiling {
            Ceiling::Normalize => cmd.args.push("-n".into()),
            Ceiling::MaxDb(db) => cmd.flag("-m", db.to_string()),
            Ceiling::Auto => {}
        }
        if let Some(r) = cfg.range_db {
            cmd.flag("-r", r.to_string());
        }
        if let Some(range) = range {
            cmd.flag("-S", range.start.to_string());
            cmd.flag("-E", range.end.to_string());
        }

        cmd
    }

    fn flag(&mut self, name: &str, value: impl AsRef<OsStr>) {
        self.args.push(name.into());
        self.args.push(value.as_ref().to_os_string());
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// A `std::process::Command` ready to spawn; no shell is involved.
    pub fn to_command(&self) -> Command {
        let mut c = Command::new(&self.program);
        c.args(&self.args);
        c
    }
}

/// Renders as a single line a POSIX shell would split back into the same
/// argument vector.
impl fmt::Display for RendererCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(token: &OsStr) -> String {
    let s = token.to_string_lossy();
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=,+@%".contains(c));
    if safe {
        s.into_owned()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
