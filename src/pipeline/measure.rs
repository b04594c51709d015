use crate::frame::Frame;
use crate::error::Error;

use clap::ValueEnum;
use crossbeam_channel::Receiver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum Statistic {
    /// Mean luma of the frame.
    #[default]
    Average,
    /// Difference to the previous frame.
    Difference,
}

pub struct Measure;

impl Measure {

    fn measure_frame(statistic: Statistic, previous_frame: &mut Option<Frame>, frame: Frame) -> Result<f64, Error> {
        match statistic {
            Statistic::Average => Ok(frame.average_luma()),
            Statistic::Difference => {
                let value = match previous_frame.as_ref() {
                    Some(previous) => frame.difference(previous)?,
                    None => 0.0,
                };
                *previous_frame = Some(frame);
                Ok(value)
            }
        }
    }

    /// Drains the stream into one value per frame, indexed by frame number.
    pub fn execute(statistic: Statistic, frames_receiver: Receiver<Result<Frame, Error>>) -> Result<Vec<f64>, Error> {
        let mut previous_frame = None;
        let mut stats = Vec::new();

        for frame in frames_receiver.iter() {
            let frame = frame?;
            if frame.index != stats.len() {
                return Err(Error::FfmpegFailed(format!(
                    "expected frame {} but received frame {}", stats.len(), frame.index
                )));
            }
            stats.push(Self::measure_frame(statistic, &mut previous_frame, frame)?);
        }

        Ok(stats)
    }

}
