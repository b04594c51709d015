use crate::frame::Frame;
use crate::error::Error;

use crossbeam_channel::Receiver;

pub const DEFAULT_DESYNC_THRESHOLD: f64 = 0.15;

pub struct Compare;

impl Compare {

    /// Returns the first frame at or after `start` where the two streams
    /// differ by more than `threshold`, or `None` when they stay in sync
    /// for as long as both last.
    pub fn execute(
        master: Receiver<Result<Frame, Error>>,
        other: Receiver<Result<Frame, Error>>,
        start: usize,
        threshold: f64,
    ) -> Result<Option<usize>, Error> {
        loop {
            let (Ok(first), Ok(second)) = (master.recv(), other.recv()) else {
                return Ok(None);
            };
            let (first, second) = (first?, second?);
            if first.index < start {
                continue;
            }
            let difference = first.mean_difference(&second)?;
            log::trace!("frame {}: difference {:.6}", first.index, difference);
            if difference > threshold {
                log::info!("Desync detected at frame {} (difference {:.4})", first.index, difference);
                return Ok(Some(first.index));
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::gray_frame;

    use crossbeam_channel::unbounded;
    use image::{DynamicImage, GrayImage};

    fn stream(values: &[u8]) -> Receiver<Result<Frame, Error>> {
        let (sender, receiver) = unbounded();
        for (index, &value) in values.iter().enumerate() {
            sender.send(Ok(gray_frame(index, value))).unwrap();
        }
        receiver
    }

    #[test]
    fn finds_first_diverging_frame() {
        let master = stream(&[10, 20, 30, 40, 50]);
        let other = stream(&[10, 20, 30, 240, 250]);
        assert_eq!(Compare::execute(master, other, 0, DEFAULT_DESYNC_THRESHOLD).unwrap(), Some(3));
    }

    #[test]
    fn identical_streams_are_in_sync() {
        let values = [0, 100, 200, 255];
        assert_eq!(Compare::execute(stream(&values), stream(&values), 0, DEFAULT_DESYNC_THRESHOLD).unwrap(), None);
    }

    #[test]
    fn frames_before_start_are_skipped() {
        let master = stream(&[0, 0, 0, 0]);
        let other = stream(&[255, 0, 0, 255]);
        assert_eq!(Compare::execute(master, other, 1, DEFAULT_DESYNC_THRESHOLD).unwrap(), Some(3));
    }

    #[test]
    fn small_changed_region_stays_in_sync() {
        let (master_sender, master) = unbounded();
        let (other_sender, other) = unbounded();
        let mut striped = GrayImage::new(10, 10);
        for x in 0..10 {
            striped.put_pixel(x, 0, image::Luma([255]));
        }
        master_sender.send(Ok(Frame::new(0, DynamicImage::ImageLuma8(GrayImage::new(10, 10))))).unwrap();
        other_sender.send(Ok(Frame::new(0, DynamicImage::ImageLuma8(striped)))).unwrap();
        drop((master_sender, other_sender));

        assert_eq!(Compare::execute(master, other, 0, DEFAULT_DESYNC_THRESHOLD).unwrap(), None);
    }

    #[test]
    fn shorter_stream_ends_comparison() {
        let master = stream(&[5, 5, 5, 5]);
        let other = stream(&[5, 5]);
        assert_eq!(Compare::execute(master, other, 0, DEFAULT_DESYNC_THRESHOLD).unwrap(), None);
    }
}
