use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::constants::paths::LINE_SHARD_EXTENSION;
use crate::errors::PipelineError;

/// Filesystem transport yielding corpus lines one at a time.
///
/// The corpus is either a single file or a directory of `.txt` shards read in
/// sorted path order, so repeated runs see the same line sequence.
pub struct LineStream {
    root: PathBuf,
    follow_links: bool,
}

impl LineStream {
    /// Create a stream over `root` (file or directory).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal for directory roots.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Files that will be read, in read order.
    pub fn shard_paths(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let metadata = std::fs::metadata(&self.root)?;
        if !metadata.is_dir() {
            return Ok(vec![self.root.clone()]);
        }
        let mut walker = WalkDir::new(&self.root);
        if self.follow_links {
            walker = walker.follow_links(true);
        }
        let mut shards = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && is_line_shard(entry.path()) {
                shards.push(entry.path().to_path_buf());
            }
        }
        shards.sort();
        Ok(shards)
    }

    /// Feed every line to `visit`, returning the number of lines read.
    pub fn for_each_line<F>(&self, mut visit: F) -> Result<u64, PipelineError>
    where
        F: FnMut(&str),
    {
        let shards = self.shard_paths()?;
        let mut total = 0;
        for path in &shards {
            let file = File::open(path)?;
            let count = read_lines_lossy(BufReader::new(file), &mut visit)?;
            debug!(path = %path.display(), lines = count, "read line shard");
            total += count;
        }
        info!(
            root = %self.root.display(),
            shards = shards.len(),
            lines = total,
            "line corpus consumed"
        );
        Ok(total)
    }
}

/// Read `reader` line by line, replacing invalid UTF-8 instead of failing.
///
/// Line terminators (`\n` or `\r\n`) are stripped before `visit` is called.
pub fn read_lines_lossy<R, F>(mut reader: R, visit: &mut F) -> io::Result<u64>
where
    R: BufRead,
    F: FnMut(&str),
{
    let mut buffer = Vec::new();
    let mut count = 0;
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        if buffer.last() == Some(&b'\n') {
            buffer.pop();
            if buffer.last() == Some(&b'\r') {
                buffer.pop();
            }
        }
        count += 1;
        visit(&String::from_utf8_lossy(&buffer));
    }
    Ok(count)
}

/// True if the path has the line shard extension (case-insensitive).
pub fn is_line_shard(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(LINE_SHARD_EXTENSION))
        .unwrap_or(false)
}
