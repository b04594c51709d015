use crate::frame::Frame;
use crate::error::Error;
use crate::video::Video;

use std::process::{Child, ChildStdout, Command, Stdio};
use std::io::Read;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// The untouched luma plane, for statistics.
    Luma,
    /// 8-bit RGB, for screenshots.
    Rgb,
}

impl PixelLayout {
    fn ffmpeg_args(&self) -> [&'static str; 4] {
        match self {
            PixelLayout::Luma => ["-vf", "extractplanes=y", "-pix_fmt", "gray"],
            PixelLayout::Rgb => ["-sws_flags", "spline+accurate_rnd+full_chroma_int", "-pix_fmt", "rgb24"],
        }
    }
}

pub struct Extract;

impl Extract {

    const PNG_FOOTER_SIGNATURE: &'static [u8] = &[0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];
    const CHUNK_SIZE: usize = 1024 * 100; // 100KB
    const MAX_FRAME_BUFFER_SIZE: usize = 1024 * 1024 * 64; // 64MB

    fn find_png_footer(data: &[u8]) -> Option<usize> {
        data.windows(Self::PNG_FOOTER_SIGNATURE.len())
            .position(|window| window == Self::PNG_FOOTER_SIGNATURE)
            .map(|pos| pos + Self::PNG_FOOTER_SIGNATURE.len())
    }

    fn spawn_ffmpeg_process(video: &Video, layout: PixelLayout) -> Result<Child, Error> {
        Command::new("ffmpeg")
            .args(["-hide_banner", "-nostdin", "-i"])
            .arg(&video.input)
            .args(["-map", "0:v:0", "-fps_mode", "passthrough"])
            .args(layout.ffmpeg_args())
            .args([
                "-compression_level", "0",
                "-vcodec", "png",
                "-f", "image2pipe",
                "pipe:1"
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| Error::FfmpegFailed(format!("Failed to spawn ffmpeg process: {}", e)))
    }

    /// Reads until one complete PNG is buffered. `Ok(None)` at end of stream.
    fn next_frame(
        index: usize,
        frame_buffer: &mut Vec<u8>,
        read_chunk: &mut [u8],
        stdout: &mut impl Read,
    ) -> Result<Option<Frame>, Error> {
        loop {
            if let Some(end) = Self::find_png_footer(frame_buffer) {
                let bytes: Vec<u8> = frame_buffer.drain(..end).collect();
                return Frame::from_bytes(index, &bytes).map(Some);
            }
            if frame_buffer.len() > Self::MAX_FRAME_BUFFER_SIZE {
                return Err(Error::FrameBufferOverflow(frame_buffer.len()));
            }
            let size = stdout.read(read_chunk)?;
            if size == 0 {
                return Ok(None);
            }
            frame_buffer.extend_from_slice(&read_chunk[..size]);
        }
    }

    fn process_stdout(mut stdout: impl Read, sender: Sender<Result<Frame, Error>>) {
        let mut frame_buffer = Vec::new();
        let mut read_chunk = vec![0u8; Self::CHUNK_SIZE];
        let mut index = 0;
        loop {
            match Self::next_frame(index, &mut frame_buffer, &mut read_chunk, &mut stdout) {
                Ok(None) => {
                    break
                },
                Ok(Some(frame)) => {
                    index += 1;
                    if sender.send(Ok(frame)).is_err() {
                        break
                    }
                }
                Err(e) => {
                    let _ = sender.send(Err(e));
                    break
                }
            }
        }
        log::debug!("extracted {} frames", index);
    }

    pub fn execute(video: &Video, layout: PixelLayout) -> Result<Receiver<Result<Frame, Error>>, Error> {
        let (sender, receiver) = bounded(1);
        let mut child = Self::spawn_ffmpeg_process(video, layout)?;
        let stdout: ChildStdout = child.stdout.take()
            .ok_or_else(|| Error::FfmpegFailed("ffmpeg stdout was not captured".to_string()))?;
        thread::spawn(move || {
            Self::process_stdout(stdout, sender);
            let _ = child.kill();
            let _ = child.wait();
        });

        Ok(receiver)
    }

    #[cfg(test)]
    pub(crate) fn from_reader(reader: impl Read + Send + 'static) -> Receiver<Result<Frame, Error>> {
        let (sender, receiver) = bounded(1);
        thread::spawn(move || Self::process_stdout(reader, sender));
        receiver
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::gray_frame;

    use std::io::Cursor;
    use image::ImageFormat;

    fn png_bytes(value: u8) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        gray_frame(0, value).image.write_to(&mut cursor, ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn footer_marks_end_of_png() {
        let bytes = png_bytes(10);
        assert_eq!(Extract::find_png_footer(&bytes), Some(bytes.len()));
        assert_eq!(Extract::find_png_footer(&bytes[..bytes.len() - 1]), None);
    }

    #[test]
    fn splits_concatenated_pngs_into_numbered_frames() {
        let mut stream = Vec::new();
        for value in [0u8, 128, 255] {
            stream.extend(png_bytes(value));
        }
        let frames: Vec<Frame> = Extract::from_reader(Cursor::new(stream))
            .iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames.iter().map(|f| f.index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(frames[2].average_luma(), 1.0);
    }

    #[test]
    fn truncated_trailing_frame_is_dropped() {
        let mut stream = png_bytes(40);
        let second = png_bytes(80);
        stream.extend_from_slice(&second[..second.len() / 2]);
        let frames: Vec<_> = Extract::from_reader(Cursor::new(stream)).iter().collect();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_ok());
    }

    #[test]
    fn garbage_is_reported_as_error() {
        let mut stream = b"not a png".to_vec();
        stream.extend_from_slice(Extract::PNG_FOOTER_SIGNATURE);
        let results: Vec<_> = Extract::from_reader(Cursor::new(stream)).iter().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::ImageError(_))));
    }
}
