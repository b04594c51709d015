mod arguments;
mod error;
mod frame;
mod frame_list;
mod pipeline;
mod sampler;
mod video;

use arguments::{Arguments, Commands, SamplerArguments};
use error::Error;
use pipeline::{Pipeline, Screenshots};
use video::Video;

use std::path::Path;

fn setup_logging(verbose: bool) -> Result<(), Error> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| Error::InvalidArgument(format!("Failed to set up logging: {}", e)))
}

fn sample_frames(video: &Video, sampler: &SamplerArguments) -> Result<Vec<usize>, Error> {
    let stats = Pipeline::scan(video, sampler.statistic)?;
    let frames = sampler::sample(&stats, video.frame_rate, &sampler.options());
    log::info!("Selected {} of {} frames", frames.len(), stats.len());
    Ok(frames)
}

fn screen_frames(
    video: &Video,
    frame: Vec<usize>,
    frames_file: Option<&Path>,
    delimiter: &str,
    sampler: &SamplerArguments,
) -> Result<Vec<usize>, Error> {
    if let Some(path) = frames_file {
        frame_list::read(path, delimiter)
    } else if !frame.is_empty() {
        Ok(frame)
    } else {
        sample_frames(video, sampler)
    }
}

fn run(arguments: Arguments) -> Result<(), Error> {
    match arguments.command {
        Commands::Sample { input, sampler } => {
            let video = Video::probe(&input)?;
            for frame in sample_frames(&video, &sampler)? {
                println!("{}", frame);
            }
        }
        Commands::Screens { input, output, prefix, frame, frames_file, delimiter, start, sampler } => {
            let video = Video::probe(&input)?;
            let frames = screen_frames(&video, frame, frames_file.as_deref(), &delimiter, &sampler)?;
            let screenshots = Screenshots { folder: output, prefix, start, frames };
            let written = Pipeline::screens(&video, &screenshots)?;
            log::info!("Saved {} screenshots to {}", written.len(), screenshots.folder.display());
        }
        Commands::Desync { master, other, start, threshold } => {
            let master = Video::probe(&master)?;
            let other = Video::probe(&other)?;
            match Pipeline::desync(&master, &other, start, threshold)? {
                Some(frame) => println!("desync detected at >>{}<<", frame),
                None => log::info!("No desync found"),
            }
        }
    }
    Ok(())
}

fn main() {
    let result = Arguments::parse().and_then(|arguments| {
        setup_logging(arguments.verbose)?;
        run(arguments)
    });

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
