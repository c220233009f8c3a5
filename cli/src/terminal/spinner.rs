use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICK: Duration = Duration::from_millis(100);
const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

/// Animates `span` until `running` goes false, showing how long discovery has been listening.
pub fn start_discovery_spinner(span: Span, running: Arc<AtomicBool>) -> JoinHandle<()> {
    span.pb_set_style(&spinner_style());
    let started = Instant::now();

    thread::spawn(move || {
        while running.load(Ordering::Relaxed) {
            let elapsed: ColoredString = format!("{:.1}s", started.elapsed().as_secs_f64()).yellow().bold();
            span.pb_set_message(
                &format!("Listening for HaLow modules... {elapsed}")
                    .color(colors::TEXT_DEFAULT)
                    .to_string(),
            );
            thread::sleep(TICK);
        }
    })
}

pub fn transfer_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.blue} [{bar:32.green/bright_black}] {bytes}/{total_bytes} {percent:>3}% {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .tick_strings(TICK_STRINGS)
    .progress_chars("█▓░")
}

/// Arms `span` as a byte progress bar for a firmware of `total` bytes.
pub fn start_transfer_bar(span: &Span, total: usize) {
    span.pb_set_style(&transfer_style());
    span.pb_set_length(total as u64);
    span.pb_set_position(0);
}

pub fn report_transfer_progress(span: &Span, done: usize, bytes_per_sec: f64) {
    span.pb_set_position(done as u64);
    span.pb_set_message(&format!("{:.1} KiB/s", bytes_per_sec / 1024.0));
}
