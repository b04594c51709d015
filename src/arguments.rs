use crate::error::Error;
use crate::frame_list::DEFAULT_DELIMITER;
use crate::pipeline::{Statistic, DEFAULT_DESYNC_THRESHOLD};
use crate::sampler::{SamplerOptions, Spacing, DEFAULT_SEED, DEFAULT_SPACING_SECONDS};

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::{Args, Parser, Subcommand};

/// Picks representative frames from a video and saves them as screenshots.
#[derive(Parser, Debug)]
#[command(name = "screen_picker", version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Commands,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the frames the sampler selects, one per line
    Sample {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        sampler: SamplerArguments,
    },
    /// Save frames as numbered PNG screenshots
    Screens {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,
        /// Folder the screenshots are written to, created if missing
        #[arg(short, long)]
        output: PathBuf,
        /// Name prepended to every screenshot, usually the group or source name
        #[arg(short, long)]
        prefix: String,
        /// Frames to save; the sampler picks them when neither this nor --frames-file is given
        #[arg(short, long, value_delimiter = ',', conflicts_with = "frames_file")]
        frame: Vec<usize>,
        /// File with one frame number per line
        #[arg(long)]
        frames_file: Option<PathBuf>,
        /// Separator between the frame number and the rest of a line in --frames-file
        #[arg(long, default_value = DEFAULT_DELIMITER)]
        delimiter: String,
        /// Number of the first screenshot
        #[arg(long, default_value_t = 1)]
        start: usize,
        #[command(flatten)]
        sampler: SamplerArguments,
    },
    /// Find the first frame where two sources stop matching
    Desync {
        /// Reference video
        #[arg(short, long)]
        master: PathBuf,
        /// Video checked against the reference
        #[arg(short, long)]
        other: PathBuf,
        /// Frame to start checking from
        #[arg(short, long, default_value_t = 0)]
        start: usize,
        /// Difference above which two frames count as out of sync
        #[arg(short, long, default_value_t = DEFAULT_DESYNC_THRESHOLD)]
        threshold: f64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SamplerArguments {
    /// Number of dark frames to pick
    #[arg(long, default_value_t = 8)]
    pub dark: usize,
    /// Number of light frames to pick
    #[arg(long, default_value_t = 4)]
    pub light: usize,
    /// Seed for the random selection
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
    /// Per-frame value the frames are classified by
    #[arg(long, value_enum, default_value_t = Statistic::Average)]
    pub statistic: Statistic,
    /// Minimum distance in seconds between picked frames of the same kind
    #[arg(long, conflicts_with_all = ["spacing_frames", "no_spacing"])]
    pub spacing_seconds: Option<f64>,
    /// Minimum distance in frames between picked frames of the same kind
    #[arg(long, conflicts_with = "no_spacing")]
    pub spacing_frames: Option<usize>,
    /// Allow picked frames to be next to each other
    #[arg(long)]
    pub no_spacing: bool,
}

impl SamplerArguments {
    pub fn spacing(&self) -> Spacing {
        match (self.no_spacing, self.spacing_frames, self.spacing_seconds) {
            (true, _, _) => Spacing::None,
            (_, Some(frames), _) => Spacing::Frames(frames),
            (_, _, Some(seconds)) => Spacing::Seconds(seconds),
            _ => Spacing::Seconds(DEFAULT_SPACING_SECONDS),
        }
    }

    pub fn options(&self) -> SamplerOptions {
        SamplerOptions {
            dark_count: self.dark,
            light_count: self.light,
            seed: self.seed,
            spacing: self.spacing(),
            ..SamplerOptions::default()
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if let Some(seconds) = self.spacing_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(Error::InvalidArgument(format!("spacing-seconds must be a non-negative number, got {}", seconds)));
            }
        }
        Ok(())
    }
}

impl Arguments {
    pub fn parse() -> Result<Self, Error> {
        let arguments = <Self as Parser>::parse();

        arguments.validate()?;
        Self::check_ffmpeg()?;

        Ok(arguments)
    }

    fn validate(&self) -> Result<(), Error> {
        match &self.command {
            Commands::Sample { input, sampler } => {
                Self::validate_input(input)?;
                sampler.validate()
            }
            Commands::Screens { input, frames_file, prefix, sampler, .. } => {
                Self::validate_input(input)?;
                if let Some(frames_file) = frames_file {
                    Self::validate_input(frames_file)?;
                }
                if prefix.contains(std::path::is_separator) {
                    return Err(Error::InvalidArgument(format!("prefix cannot contain a path separator: {}", prefix)));
                }
                sampler.validate()
            }
            Commands::Desync { master, other, threshold, .. } => {
                Self::validate_input(master)?;
                Self::validate_input(other)?;
                if !(0.0..=1.0).contains(threshold) {
                    return Err(Error::InvalidArgument(format!("threshold must be between 0 and 1, got {}", threshold)));
                }
                Ok(())
            }
        }
    }

    fn validate_input(path: &Path) -> Result<(), Error> {
        if !path.is_file() {
            return Err(Error::InvalidInputPath(path.display().to_string()));
        }
        Ok(())
    }

    fn check_ffmpeg() -> Result<(), Error> {
        for binary in ["ffmpeg", "ffprobe"] {
            match Command::new(binary).arg("-version").output() {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::FFmpegNotAvailable),
                Err(e) => return Err(Error::FfmpegFailed(format!("Failed to run {}: {}", binary, e))),
                Ok(_) => {}
            }
        }
        Ok(())
    }
}
