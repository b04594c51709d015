mod extract;
mod progress;
mod measure;
mod export;
mod compare;

use extract::{Extract, PixelLayout};
use progress::Progress;
use measure::Measure;
use export::Export;
use compare::Compare;

pub use measure::Statistic;
pub use export::Screenshots;
pub use compare::DEFAULT_DESYNC_THRESHOLD;

use crate::video::Video;
use crate::error::Error;

use std::path::PathBuf;

pub struct Pipeline;

impl Pipeline {
    /// Computes `statistic` for every frame of `video`.
    pub fn scan(video: &Video, statistic: Statistic) -> Result<Vec<f64>, Error> {
        let label = format!("Scanning {}", video.input.display());
        let extract = Extract::execute(video, PixelLayout::Luma)?;
        let progress = Progress::execute(&label, video.frame_count, extract);
        let stats = Measure::execute(statistic, progress)?;
        if stats.len() != video.frame_count {
            log::warn!("ffprobe reported {} frames but {} were decoded", video.frame_count, stats.len());
        }
        Ok(stats)
    }

    pub fn screens(video: &Video, screenshots: &Screenshots) -> Result<Vec<PathBuf>, Error> {
        let label = format!("{} -> {}", video.input.display(), screenshots.folder.display());
        let extract = Extract::execute(video, PixelLayout::Rgb)?;
        let progress = Progress::execute(&label, video.frame_count, extract);
        Export::execute(screenshots, progress)
    }

    pub fn desync(master: &Video, other: &Video, start: usize, threshold: f64) -> Result<Option<usize>, Error> {
        let label = format!("Comparing {} with {}", master.input.display(), other.input.display());
        let frame_count = master.frame_count.min(other.frame_count);
        let master_frames = Progress::execute(&label, frame_count, Extract::execute(master, PixelLayout::Luma)?);
        let other_frames = Extract::execute(other, PixelLayout::Luma)?;
        Compare::execute(master_frames, other_frames, start, threshold)
    }
}
