use std::{
    collections::HashSet,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, info, warn};

use crate::{
    command::RendererCommand,
    config::RunConfig,
    format::HeatMapError,
    output::OutputPlan,
    planner::{chunk_file_name, plan_ranges, split_dir_name, whole_file_name, ByteRange, ByteRanges},
};

/// What happens to each built command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Write the command line to the given sink.
    Print,
    /// Spawn the renderer and wait for it.
    Execute,
}

/// Run-wide settings shared by every file.
pub struct RenderOptions<'a> {
    pub renderer: &'a Path,
    pub config: &'a RunConfig,
    pub plan: &'a OutputPlan,
    /// `Some` when inputs are split into byte ranges of at most this size.
    pub chunk_bytes: Option<u64>,
    pub stamp: &'a str,
    pub dispatch: Dispatch,
}

/// One output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub output: PathBuf,
    pub range: Option<ByteRange>,
}

#[derive(Debug, Clone)]
enum Layout {
    Whole(PathBuf),
    Split(ByteRanges),
}

/// All the work for one input file.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    layout: Layout,
}

impl FileTask {
    /// The path this task owns exclusively within a run: its split
    /// directory, or its single PNG.
    pub fn claim(&self) -> &Path {
        match &self.layout {
            Layout::Whole(output) => output,
            Layout::Split(_) => &self.output_dir,
        }
    }

    pub fn job_count(&self) -> usize {
        match &self.layout {
            Layout::Whole(_) => 1,
            Layout::Split(ranges) => ranges.size_hint().0,
        }
    }

    /// Jobs in output order, built one at a time.
    pub fn jobs(&self) -> impl Iterator<Item = RenderJob> + '_ {
        let (whole, ranges) = match &self.layout {
            Layout::Whole(output) => (
                Some(RenderJob {
                    output: output.clone(),
                    range: None,
                }),
                None,
            ),
            Layout::Split(ranges) => (None, Some(ranges.clone())),
        };
        let chunks = ranges
            .into_iter()
            .flatten()
            .enumerate()
            .map(move |(i, range)| RenderJob {
                output: self.output_dir.join(chunk_file_name(&self.input, i)),
                range: Some(range),
            });
        whole.into_iter().chain(chunks)
    }
}

/// Work out output locations and byte ranges for `input`. Only reads the
/// file size; nothing is created.
pub fn plan_file(input: &Path, opts: &RenderOptions<'_>) -> Result<FileTask, HeatMapError> {
    let base = opts.plan.dir_for(input);

    let Some(chunk) = opts.chunk_bytes else {
        let output = match opts.plan {
            OutputPlan::NamedFile(file) => file.clone(),
            _ => base.join(whole_file_name(input)),
        };
        return Ok(FileTask {
            input: input.to_path_buf(),
            output_dir: base,
            layout: Layout::Whole(output),
        });
    };

    let size = fs::metadata(input)
        .with_context(|| format!("Cannot read size of '{}'", input.display()))?
        .len();

    Ok(FileTask {
        input: input.to_path_buf(),
        output_dir: base.join(split_dir_name(input, opts.stamp)),
        layout: Layout::Split(plan_ranges(size, chunk)),
    })
}

/// Plan, prepare and dispatch one input file. Returns the number of
/// commands dispatched.
///
/// `claimed` holds the outputs of the files already handled in this run;
/// a file whose output is taken fails instead of overwriting it.
pub fn render_file<W: Write>(
    input: &Path,
    opts: &RenderOptions<'_>,
    claimed: &mut HashSet<PathBuf>,
    out: &mut W,
) -> Result<usize, HeatMapError> {
    let task = plan_file(input, opts)?;

    let count = task.job_count();
    if count == 0 {
        warn!("Skipping '{}': file is empty", input.display());
        return Ok(0);
    }

    if !claimed.insert(task.claim().to_path_buf()) {
        return Err(HeatMapError::OutputClash(task.claim().display().to_string()));
    }

    prepare_output_dir(&task.output_dir)?;
    info!(
        "{} → {} image(s) in {}",
        input.display(),
        count,
        task.output_dir.display()
    );

    for job in task.jobs() {
        if let Some(range) = job.range {
            debug!("  bytes {range} ({} B) → {}", range.len(), job.output.display());
        }
        let cmd = RendererCommand::new(opts.renderer, &task.input, &job.output, opts.config, job.range);
        dispatch(&cmd, opts.dispatch, out)?;
    }

    Ok(count)
}

fn dispatch<W: Write>(cmd: &RendererCommand, mode: Dispatch, out: &mut W) -> Result<(), HeatMapError> {
    match mode {
        Dispatch::Print => {
            writeln!(out, "{cmd}")?;
        }
        Dispatch::Execute => {
            debug!("Running {cmd}");
            let status = cmd
                .to_command()
                .status()
                .with_context(|| format!("Cannot start renderer '{}'", cmd.program().display()))?;
            if !status.success() {
                return Err(HeatMapError::RendererFailed {
                    command: cmd.to_string(),
                    status,
                });
            }
        }
    }
    Ok(())
}

fn prepare_output_dir(dir: &Path) -> Result<(), HeatMapError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
    debug!("Created {}", dir.display());
    Ok(())
}
