use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use colored::*;
use hgota_common::cancel::CancelToken;
use hgota_common::config::{Config, ScanConfig};
use hgota_common::models::report::ScanReport;
use hgota_common::network::interface::SystemInterfaces;
use hgota_core::network::channel::RawLinkOpener;
use hgota_core::scanner::DiscoveryScanner;
use tracing::{info, info_span};

use crate::hprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn discover(scan: ScanConfig, cfg: &Config, cancel: CancelToken) -> anyhow::Result<()> {
    let start_time: Instant = Instant::now();
    let reports: Vec<ScanReport> = run_discovery(scan, cancel).await?;

    discovery_ends(&reports, start_time.elapsed(), cfg);
    Ok(())
}

/// Runs one discovery pass over every adapter behind a spinner.
pub async fn run_discovery(scan: ScanConfig, cancel: CancelToken) -> anyhow::Result<Vec<ScanReport>> {
    let span = info_span!("discovery", indicatif.pb_show = true);
    let guard = span.enter();

    let running: Arc<AtomicBool> = Arc::new(AtomicBool::new(true));
    let spinner_handle = spinner::start_discovery_spinner(span.clone(), running.clone());

    let result = tokio::task::spawn_blocking(move || {
        let opener = RawLinkOpener::new();
        DiscoveryScanner::new(&opener, scan, cancel).scan_all(&SystemInterfaces)
    })
    .await;

    running.store(false, Ordering::Relaxed);
    let _ = spinner_handle.join();

    drop(guard);

    Ok(result?)
}

fn discovery_ends(reports: &[ScanReport], total_time: Duration, cfg: &Config) {
    if reports.is_empty() {
        no_devices_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        hprint!();
    }

    print::header("HaLow discovery", cfg.quiet);
    print_reports(reports, cfg);
    print_summary(reports.len(), total_time, cfg);
}

fn no_devices_found(cfg: &Config) {
    print::header("zero devices detected", cfg.quiet);
    print::no_results("devices");
}

pub fn print_reports(reports: &[ScanReport], cfg: &Config) {
    for (idx, report) in reports.iter().enumerate() {
        match cfg.quiet {
            2 => print_report_line(report),
            _ => print_report_tree(report, idx + 1, cfg),
        }
        if cfg.quiet < 2 && idx + 1 != reports.len() {
            hprint!();
        }
    }
}

fn print_summary(count: usize, total_time: Duration, cfg: &Config) {
    let devices: ColoredString = format!("{count} devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString = &format!("Discovery Complete: {devices} answered in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(output);
        }
        1 => {
            hprint!();
            info!("{}", output);
        }
        _ => {}
    }
}

fn print_report_line(report: &ScanReport) {
    print::print(&format!(
        "{} {} {}",
        report.device_mac, report.version_str(), report.adapter
    ));
}

fn print_report_tree(report: &ScanReport, idx: usize, cfg: &Config) {
    print::tree_head(idx, &report.device_mac.to_string());
    print::as_tree_one_level(format::report_to_details(report, cfg));
}
