use anyhow::{Context, Result};
use std::path::Path;

/// Read a whole file and split it on `\n`.
///
/// A trailing newline yields a final empty line so that [`join_lines`]
/// reproduces the input byte for byte. `\r` stays inside each line.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;

    Ok(split_lines(&content))
}

/// Overwrite `path` with `lines` joined by `\n`. No temp file, no backup.
pub fn write_lines<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, join_lines(lines))
        .with_context(|| format!("Failed to write file {}", path.display()))
}

pub fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(str::to_owned).collect()
}

pub fn join_lines(lines: &[String]) -> String {
    // Estimate capacity: content plus one separator per line
    let cap = lines.iter().map(|l| l.len() + 1).sum();
    let mut out = String::with_capacity(cap);

    for (i, line) in lines.iter().enumerate() {
        if i != 0 {
            out.push('\n');
        }
        out.push_str(line);
    }

    out
}
