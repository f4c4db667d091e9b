use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

/// Collect the files to render.
///
/// A regular file yields itself; a directory yields every regular file below
/// it, recursively, in traversal order. Anything else (missing path, socket,
/// device) yields nothing and it is up to the caller to complain.
pub fn enumerate_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .inspect(|p| {
            if is_rendered_image(p) {
                warn!(
                    "'{}' looks like an earlier heat map; it will be treated as a capture",
                    p.display()
                );
            }
        })
        .collect()
}

/// Output of a previous run left inside the input tree.
fn is_rendered_image(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}
