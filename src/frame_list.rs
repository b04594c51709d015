use crate::error::Error;

use std::path::Path;

pub const DEFAULT_DELIMITER: &str = " ";

/// Reads newline separated frame numbers. Only the text before the first
/// `delimiter` of each line is used, so detection zone files can be read
/// as they are.
pub fn read(path: &Path, delimiter: &str) -> Result<Vec<usize>, Error> {
    let content = std::fs::read_to_string(path)?;
    parse(&content, delimiter)
}

pub fn parse(content: &str, delimiter: &str) -> Result<Vec<usize>, Error> {
    let mut frames = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let field = if delimiter.is_empty() {
            line
        } else {
            line.split(delimiter).next().unwrap_or(line)
        };
        let frame = field.trim().parse().map_err(|_| Error::InvalidFrameNumber {
            line: number + 1,
            value: field.to_string(),
        })?;
        frames.push(frame);
    }
    Ok(frames)
}
