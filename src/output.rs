use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::info;

use crate::format::HeatMapError;

/// Where the PNGs of a run end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPlan {
    /// Next to each input file.
    BesideInput,
    /// Every output goes under this directory.
    BaseDir(PathBuf),
    /// Single-file input rendered to exactly this path.
    NamedFile(PathBuf),
}

impl OutputPlan {
    /// Directory that receives the output of `input`.
    pub fn dir_for(&self, input: &Path) -> PathBuf {
        match self {
            Self::BesideInput => parent_or_cwd(input).to_path_buf(),
            Self::BaseDir(dir) => dir.clone(),
            Self::NamedFile(file) => parent_or_cwd(file).to_path_buf(),
        }
    }
}

/// Resolve the `--output` argument against the input.
///
/// A new directory is created when the input is a directory and `output`
/// names a path that does not exist yet. Nothing is created in any other
/// case.
pub fn resolve_output(
    output: Option<&Path>,
    input: &Path,
    splitting: bool,
) -> Result<OutputPlan, HeatMapError> {
    let Some(output) = output else {
        return Ok(OutputPlan::BesideInput);
    };

    if output.is_dir() {
        return Ok(OutputPlan::BaseDir(output.to_path_buf()));
    }

    if !parent_or_cwd(output).is_dir() {
        return Err(HeatMapError::OutputParentMissing(output.display().to_string()));
    }

    if input.is_file() {
        if splitting {
            return Err(HeatMapError::NamedOutputWithSplit(output.display().to_string()));
        }
        if ends_with_separator(output) {
            return Err(HeatMapError::NamedOutputIsDirectory(output.display().to_string()));
        }
        return Ok(OutputPlan::NamedFile(output.to_path_buf()));
    }

    if output.exists() {
        return Err(HeatMapError::OutputNotADirectory(output.display().to_string()));
    }

    fs::create_dir(output)
        .with_context(|| format!("Cannot create output directory '{}'", output.display()))?;
    info!("Created output directory {}", output.display());
    Ok(OutputPlan::BaseDir(output.to_path_buf()))
}

/// `newdir/` names a directory, never a file.
fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator)
}

/// `Path::parent` gives `""` for bare names; that means the working directory.
fn parent_or_cwd(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        file: PathBuf,
        tree: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cap.bin");
        fs::write(&file, [0u8; 16]).unwrap();
        let tree = dir.path().join("caps");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("a.bin"), [0u8; 16]).unwrap();
        Fixture { dir, file, tree }
    }

    #[test]
    fn no_output_means_beside_input() {
        let fx = fixture();
        let plan = resolve_output(None, &fx.file, true).unwrap();
        assert_eq!(plan, OutputPlan::BesideInput);
        assert_eq!(plan.dir_for(&fx.file), fx.dir.path());
        assert_eq!(plan.dir_for(Path::new("bare.bin")), Path::new("."));
    }

    #[test]
    fn existing_directory_is_the_base() {
        let fx = fixture();
        let out = fx.dir.path().join("pngs");
        fs::create_dir(&out).unwrap();
        for input in [&fx.file, &fx.tree] {
            let plan = resolve_output(Some(&out), input, true).unwrap();
            assert_eq!(plan, OutputPlan::BaseDir(out.clone()));
            assert_eq!(plan.dir_for(&fx.tree.join("a.bin")), out);
        }
    }

    #[test]
    fn new_path_with_file_input_is_the_output_name() {
        let fx = fixture();
        let out = fx.dir.path().join("picture.png");
        let plan = resolve_output(Some(&out), &fx.file, false).unwrap();
        assert_eq!(plan, OutputPlan::NamedFile(out.clone()));
        assert_eq!(plan.dir_for(&fx.file), fx.dir.path());
        assert!(!out.exists());
    }

    #[test]
    fn new_path_with_trailing_separator_is_not_a_file_name() {
        let fx = fixture();
        for out in [
            PathBuf::from(format!("{}/newdir/", fx.dir.path().display())),
            PathBuf::from("newdir/"),
        ] {
            let err = resolve_output(Some(&out), &fx.file, false).unwrap_err();
            assert!(matches!(err, HeatMapError::NamedOutputIsDirectory(_)), "accepted {out:?}");
        }
        assert!(!fx.dir.path().join("newdir").exists());
    }

    #[test]
    fn trailing_separator_with_directory_input_creates_it() {
        let fx = fixture();
        let out = PathBuf::from(format!("{}/newdir/", fx.dir.path().display()));
        let plan = resolve_output(Some(&out), &fx.tree, false).unwrap();
        assert_eq!(plan, OutputPlan::BaseDir(out));
        assert!(fx.dir.path().join("newdir").is_dir());
    }

    #[test]
    fn named_output_cannot_be_split() {
        let fx = fixture();
        let out = fx.dir.path().join("picture.png");
        let err = resolve_output(Some(&out), &fx.file, true).unwrap_err();
        assert!(matches!(err, HeatMapError::NamedOutputWithSplit(_)));
    }

    #[test]
    fn new_path_with_directory_input_is_created() {
        let fx = fixture();
        let out = fx.dir.path().join("fresh");
        let plan = resolve_output(Some(&out), &fx.tree, true).unwrap();
        assert_eq!(plan, OutputPlan::BaseDir(out.clone()));
        assert!(out.is_dir());
    }

    #[test]
    fn missing_parent_is_fatal() {
        let fx = fixture();
        let out = fx.dir.path().join("no/such/place");
        for input in [&fx.file, &fx.tree] {
            let err = resolve_output(Some(&out), input, false).unwrap_err();
            assert!(matches!(err, HeatMapError::OutputParentMissing(_)));
        }
        assert!(!fx.dir.path().join("no").exists());
    }

    #[test]
    fn existing_file_with_directory_input_is_rejected() {
        let fx = fixture();
        let err = resolve_output(Some(&fx.file), &fx.tree, false).unwrap_err();
        assert!(matches!(err, HeatMapError::OutputNotADirectory(_)));
    }
}
