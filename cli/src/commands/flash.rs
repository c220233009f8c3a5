use anyhow::{Context, bail};
use colored::*;
use hgota_common::cancel::CancelToken;
use hgota_common::config::{Config, FlashConfig, ScanConfig};
use hgota_common::models::report::ScanReport;
use hgota_common::network::interface::{self, Adapter, InterfaceEnumerator, SystemInterfaces};
use hgota_core::network::channel::RawLinkOpener;
use hgota_core::ota::{OtaTransfer, TransferSummary};
use tracing::{error, info, info_span, warn};

use crate::commands::FlashArgs;
use crate::commands::discover;
use crate::terminal::{colors, print, spinner};

const PLAN_KEY_WIDTH: usize = 8;

/// Where the image goes.
#[derive(Debug)]
struct Target {
    adapter: Adapter,
    device: String,
}

pub async fn flash(args: FlashArgs, cfg: &Config, cancel: CancelToken) -> anyhow::Result<()> {
    let firmware: Vec<u8> = tokio::fs::read(&args.firmware)
        .await
        .with_context(|| format!("Failed to read firmware {}", args.firmware.display()))?;

    let flash_cfg = FlashConfig::from(&args);
    flash_cfg.validate()?;

    let target = resolve_target(&args, cfg, cancel.clone()).await?;
    print_plan(&target, &args, firmware.len(), &flash_cfg, cfg);

    let span = info_span!("flash", indicatif.pb_show = true);
    spinner::start_transfer_bar(&span, firmware.len());

    let outcome = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        let opener = RawLinkOpener::new();
        let mut observer = |done: usize, _total: usize, bytes_per_sec: f64| {
            spinner::report_transfer_progress(&span, done, bytes_per_sec);
        };
        OtaTransfer::new(&opener, flash_cfg, cancel).run(
            &target.adapter,
            &target.device,
            &firmware,
            &mut observer,
        )
    })
    .await?;

    match outcome {
        Ok(summary) => {
            print_summary(&summary, cfg);
            Ok(())
        }
        Err(e) => {
            if let Some(offset) = e.failed_offset() {
                error!("Transfer stopped at offset {offset}");
            }
            Err(e.into())
        }
    }
}

async fn resolve_target(args: &FlashArgs, cfg: &Config, cancel: CancelToken) -> anyhow::Result<Target> {
    if let (Some(device), Some(iface)) = (&args.device, &args.iface) {
        let adapter = interface::find_adapter(&SystemInterfaces, iface)
            .with_context(|| format!("No adapter named {iface}"))?;
        return Ok(Target {
            adapter,
            device: device.clone(),
        });
    }

    let scan: ScanConfig = args.scan.clone().into();
    let reports: Vec<ScanReport> = discover::run_discovery(scan, cancel).await?;
    if reports.is_empty() {
        print::no_results("devices");
        bail!("Discovery found nothing to flash");
    }

    print::header("discovered devices", cfg.quiet);
    discover::print_reports(&reports, cfg);

    let report = pick(&reports, args.select)?;
    if reports.len() > 1 {
        warn!("{} devices answered, flashing #{}", reports.len(), args.select);
    }

    target_for(report, &SystemInterfaces)
}

/// Reopens the adapter a report arrived on by its OS name.
fn target_for(report: &ScanReport, enumerator: &dyn InterfaceEnumerator) -> anyhow::Result<Target> {
    let adapter = interface::adapter_by_os_name(enumerator, &report.interface)
        .with_context(|| format!("Adapter {} disappeared after discovery", report.adapter))?;
    Ok(Target {
        adapter,
        device: report.device_mac.to_string(),
    })
}

/// `select` is 1-based, matching the printed list.
fn pick(reports: &[ScanReport], select: usize) -> anyhow::Result<&ScanReport> {
    match select.checked_sub(1).and_then(|idx| reports.get(idx)) {
        Some(report) => Ok(report),
        None => bail!("--select {select} is out of range, {} devices answered", reports.len()),
    }
}

fn print_plan(target: &Target, args: &FlashArgs, size: usize, flash_cfg: &FlashConfig, cfg: &Config) {
    print::header("flash plan", cfg.quiet);
    if cfg.quiet > 0 {
        return;
    }

    let firmware: String = args.firmware.display().to_string();
    print::aligned_line("Firmware", firmware, PLAN_KEY_WIDTH);
    print::aligned_line("Size", format!("{size} bytes"), PLAN_KEY_WIDTH);
    print::aligned_line("Device", target.device.color(colors::MAC_ADDR), PLAN_KEY_WIDTH);
    print::aligned_line("Adapter", target.adapter.display_name.as_str(), PLAN_KEY_WIDTH);
    print::aligned_line(
        "Chunks",
        format!("{} bytes, step {}", flash_cfg.chunk_size, flash_cfg.step()),
        PLAN_KEY_WIDTH,
    );
    print::aligned_line(
        "Acks",
        format!(
            "{:?}, {}s timeout, {} attempts",
            flash_cfg.ack_policy, flash_cfg.timeout_secs, flash_cfg.retries
        ),
        PLAN_KEY_WIDTH,
    );
}

fn print_summary(summary: &TransferSummary, cfg: &Config) {
    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 { summary.total as f64 / 1024.0 / secs } else { 0.0 };
    let total: ColoredString = format!("{} bytes", summary.total).bold().green();
    let time: ColoredString = format!("{secs:.2}s").bold().yellow();
    let output: ColoredString = format!("Flash Complete: {total} in {time} ({rate:.1} KiB/s)")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            let resends = summary.frames_sent.saturating_sub(summary.chunks);
            print::centerln(&format!("{} chunks, {} resends", summary.chunks, resends));
        }
        _ => info!("{}", output),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
