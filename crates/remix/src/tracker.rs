use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use remix_archive::{ProgressCallback, ProgressEvent};

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Terminal rendering of transcoding progress.
#[derive(Clone)]
pub struct ProgressTracker {
    pb: ProgressBar,
}

impl ProgressTracker {
    pub fn new(expected_entries: u64) -> Self {
        let pb = ProgressBar::new(expected_entries);
        let pb = match PB_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        pb.set_prefix("Remixing");
        pb.set_message("copying tracks");
        Self { pb }
    }

    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::EntryProcessed(index) => {
                let index = index as u64;
                if self.pb.length().is_some_and(|len| index >= len) {
                    self.pb.set_length(index + 1);
                }
                self.pb.set_position(index);
            }
            ProgressEvent::PhaseChanged(label) => self.pb.set_message(label),
            ProgressEvent::Completed => {
                if let Some(len) = self.pb.length() {
                    self.pb.set_position(len);
                }
                self.pb.finish_with_message("Done");
            }
        }
    }

    /// Stop rendering without marking the run as done.
    pub fn abandon(&self) {
        self.pb.abandon();
    }

    pub fn callback(&self) -> ProgressCallback {
        let tracker = self.clone();
        Arc::new(move |event| tracker.on_event(event))
    }
}
