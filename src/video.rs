use crate::error::Error;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: u64,
    pub denominator: u64,
}

impl FrameRate {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        let (num, den) = value.trim().split_once('/')
            .ok_or_else(|| Error::Metadata(format!("Invalid frame rate format: {}", value)))?;
        let numerator = num.parse::<u64>()
            .map_err(|_| Error::Metadata(format!("Failed to parse frame rate numerator: {}", num)))?;
        let denominator = den.parse::<u64>()
            .map_err(|_| Error::Metadata(format!("Failed to parse frame rate denominator: {}", den)))?;
        if denominator == 0 {
            return Err(Error::Metadata(format!("Frame rate has a zero denominator: {}", value)));
        }
        Ok(Self::new(numerator, denominator))
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[derive(Clone, Debug)]
pub struct Video {
    pub input: PathBuf,
    pub width: usize,
    pub height: usize,
    pub frame_rate: FrameRate,
    pub frame_count: usize,
}

impl Video {
    pub fn probe(input: &Path) -> Result<Self, Error> {
        let output = Command::new("ffprobe")
            .args([
                "-hide_banner", "-v", "error",
                "-select_streams", "v:0",
                "-count_frames",
                "-show_entries", "stream=nb_read_frames,r_frame_rate,width,height",
                "-of", "default=noprint_wrappers=1",
            ])
            .arg(input)
            .output()
            .map_err(|e| Error::FfmpegFailed(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(Error::FfmpegFailed(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let data = String::from_utf8(output.stdout)
            .map_err(|e| Error::Metadata(format!("Failed to parse ffprobe output: {}", e)))?;
        let video = Self::from_probe_output(input, &data)?;
        log::debug!(
            "{}: {}x{} @ {} fps, {} frames",
            input.display(), video.width, video.height, video.frame_rate, video.frame_count
        );
        Ok(video)
    }

    fn from_probe_output(input: &Path, data: &str) -> Result<Self, Error> {
        let mut width = None;
        let mut height = None;
        let mut frame_rate = None;
        let mut frame_count = None;

        for line in data.lines() {
            if let Some((key, value)) = line.split_once('=') {
                match key {
                    "nb_read_frames" => frame_count = Some(value.parse()
                        .map_err(|_| Error::Metadata(format!("Failed to parse frame count: {}", value)))?),
                    "r_frame_rate" => frame_rate = Some(FrameRate::parse(value)?),
                    "width" => width = Some(value.parse()
                        .map_err(|_| Error::Metadata(format!("Failed to parse width: {}", value)))?),
                    "height" => height = Some(value.parse()
                        .map_err(|_| Error::Metadata(format!("Failed to parse height: {}", value)))?),
                    _ => {}
                }
            }
        }

        let missing = |field: &str| Error::Metadata(format!("ffprobe did not report {}", field));
        Ok(Self {
            input: input.to_path_buf(),
            width: width.ok_or_else(|| missing("width"))?,
            height: height.ok_or_else(|| missing("height"))?,
            frame_rate: frame_rate.ok_or_else(|| missing("r_frame_rate"))?,
            frame_count: frame_count.ok_or_else(|| missing("nb_read_frames"))?,
        })
    }
}
