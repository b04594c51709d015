use crate::frame::Frame;
use crate::error::Error;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use image::ImageFormat;

/// Where and how the selected frames are written.
pub struct Screenshots {
    pub folder: PathBuf,
    pub prefix: String,
    /// Number given to the first screenshot.
    pub start: usize,
    pub frames: Vec<usize>,
}

impl Screenshots {
    pub fn file_name(&self, position: usize) -> PathBuf {
        self.folder.join(format!("{}{:03}.png", self.prefix, self.start + position))
    }
}

pub struct Export;

impl Export {

    fn save_frame(screenshots: &Screenshots, frame: &Frame, saved: &mut [Option<PathBuf>]) -> Result<(), Error> {
        let rgb = frame.image.to_rgb8();
        let total = screenshots.frames.len();
        for (position, &number) in screenshots.frames.iter().enumerate() {
            if number != frame.index {
                continue;
            }
            let path = screenshots.file_name(position);
            log::info!("Saving frame {}/{} from {}", position + 1, total, screenshots.prefix);
            rgb.save_with_format(&path, ImageFormat::Png)?;
            saved[position] = Some(path);
        }
        Ok(())
    }

    fn ensure_folder(folder: &Path) -> Result<(), Error> {
        if !folder.is_dir() {
            log::debug!("creating {}", folder.display());
            std::fs::create_dir_all(folder)?;
        }
        Ok(())
    }

    /// Writes every requested frame and returns the written paths in
    /// list order. Stops reading as soon as all frames have been seen.
    pub fn execute(screenshots: &Screenshots, frames_receiver: Receiver<Result<Frame, Error>>) -> Result<Vec<PathBuf>, Error> {
        Self::ensure_folder(&screenshots.folder)?;

        let mut remaining: BTreeSet<usize> = screenshots.frames.iter().copied().collect();
        let mut saved = vec![None; screenshots.frames.len()];
        let mut seen = 0;

        while !remaining.is_empty() {
            let Ok(frame) = frames_receiver.recv() else { break };
            let frame = frame?;
            seen = seen.max(frame.index + 1);
            if remaining.remove(&frame.index) {
                Self::save_frame(screenshots, &frame, &mut saved)?;
            }
        }

        if let Some(&index) = remaining.first() {
            return Err(Error::FrameOutOfRange { index, count: seen });
        }

        Ok(saved.into_iter().flatten().collect())
    }

}
