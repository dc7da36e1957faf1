//! Plain-text keyframe files.
//!
//! Each tracked node is one line of seven numbers, `tx ty tz qw qx qy qz`.
//! A keyframe is `tracked` consecutive lines and keyframes follow each other
//! with no separator, so a file can only be read back by a scene with the
//! same number of tracked nodes. A scene whose topology changed will read an
//! old file without complaint as long as the record count still divides.

use std::fs;
use std::path::Path;

use cgmath::{Quaternion, Vector3};
use log::{info, warn};

use crate::error::{Result, ViewerError};
use crate::math::Rbt;

use super::timeline::Keyframe;

/// Numbers per node record
const RECORD_LEN: usize = 7;

/// Renders keyframes in the on-disk format
pub fn encode(frames: &[Keyframe]) -> String {
    let mut out = String::new();
    for rbt in frames.iter().flatten() {
        let t = rbt.translation();
        let q = rbt.rotation();
        out.push_str(&format!(
            "{} {} {} {} {} {} {}\n",
            t.x, t.y, t.z, q.s, q.v.x, q.v.y, q.v.z
        ));
    }
    out
}

/// Parses keyframes of `tracked` nodes each.
///
/// Numbers may be separated by any whitespace. Trailing records that do not
/// make up a whole keyframe, and a trailing partial record, are dropped with
/// a warning. With `tracked == 0` nothing can be read and the result is empty.
///
/// # Errors
/// [`ViewerError::Parse`] for a token that is not a number.
pub fn decode(text: &str, tracked: usize) -> Result<Vec<Keyframe>> {
    let numbers = text
        .split_whitespace()
        .enumerate()
        .map(|(index, token)| {
            token.parse::<f64>().map_err(|_| ViewerError::Parse {
                token: token.to_string(),
                index,
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    if tracked == 0 {
        return Ok(Vec::new());
    }

    let records: Vec<Rbt> = numbers
        .chunks_exact(RECORD_LEN)
        .map(|r| {
            Rbt::new(
                Vector3::new(r[0], r[1], r[2]),
                Quaternion::new(r[3], r[4], r[5], r[6]),
            )
            .renormalized()
        })
        .collect();

    if numbers.len() % RECORD_LEN != 0 || records.len() % tracked != 0 {
        warn!(
            "{}",
            ViewerError::MalformedTimeline {
                records: records.len(),
                tracked,
            }
        );
    }

    Ok(records
        .chunks_exact(tracked)
        .map(|frame| frame.to_vec())
        .collect())
}

/// Writes keyframes to `path`, replacing the file
pub fn save(path: &Path, frames: &[Keyframe]) -> Result<()> {
    fs::write(path, encode(frames)).map_err(|source| ViewerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("saved {} keyframes to {}", frames.len(), path.display());
    Ok(())
}

/// Reads keyframes of `tracked` nodes each from `path`
pub fn load(path: &Path, tracked: usize) -> Result<Vec<Keyframe>> {
    let text = fs::read_to_string(path).map_err(|source| ViewerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let frames = decode(&text, tracked)?;
    info!("loaded {} keyframes from {}", frames.len(), path.display());
    Ok(frames)
}
