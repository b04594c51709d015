use crate::error::Error;
use crate::frame::Frame;

use std::fmt::Write;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use crossbeam_channel::{bounded, Receiver, Sender};

pub struct Progress;

impl Progress {

    pub fn create_progress_bar(label: &str, frame_count: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(frame_count as u64);
        let progress_template = "[{elapsed_precise}] [{eta}] [{wide_bar:.white/green}] {pos}/{len} {percent} {msg}";
        let progress_style = ProgressStyle::default_bar()
            .template(&format!("{{prefix}}\n{}", progress_template))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░-")
            .with_key("eta", |state: &ProgressState, w: &mut dyn Write| { let _ = write!(w, "{:.1}s", state.eta().as_secs_f64()); })
            .with_key("percent", |state: &ProgressState, w: &mut dyn Write| { let _ = write!(w, "({:.0}%)", state.fraction() * 100.0); });
        progress_bar.set_style(progress_style);
        progress_bar.set_prefix(label.to_string());
        progress_bar
    }

    fn update_progress(progress_bar: &ProgressBar, position: usize, frame_rate: f64) {
        progress_bar.set_position(position as u64);
        progress_bar.set_message(format!("[fps: {:.0}]", frame_rate));
    }

    fn process_incoming_frames(
        receiver: Receiver<Result<Frame, Error>>,
        sender: Sender<Result<Frame, Error>>,
        progress_bar: ProgressBar,
    ) {
        let start_time = Instant::now();
        for frame in receiver.iter() {
            match frame {
                Ok(frame) => {
                    let position = frame.index + 1;
                    if sender.send(Ok(frame)).is_err() {
                        break;
                    }
                    let frame_rate = position as f64 / start_time.elapsed().as_secs_f64();
                    Self::update_progress(&progress_bar, position, frame_rate);
                }
                Err(e) => {
                    let _ = sender.send(Err(e));
                    break;
                }
            }
        }
        progress_bar.finish();
    }

    pub fn execute(label: &str, frame_count: usize, frames_receiver: Receiver<Result<Frame, Error>>) -> Receiver<Result<Frame, Error>> {
        let (sender, receiver) = bounded(1);
        let progress_bar = Self::create_progress_bar(label, frame_count);
        Self::update_progress(&progress_bar, 0, 0.0);
        std::thread::spawn(move || Self::process_incoming_frames(frames_receiver, sender, progress_bar));
        receiver
    }

}
