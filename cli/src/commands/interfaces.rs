use colored::*;
use hgota_common::config::Config;
use hgota_common::network::interface::{self, SystemInterfaces};
use tracing::warn;

use crate::hprint;
use crate::terminal::{colors, format, print};

pub fn interfaces(cfg: &Config) -> anyhow::Result<()> {
    let adapters = interface::usable_adapters(&SystemInterfaces);

    if adapters.is_empty() {
        warn!("No usable adapters found");
        print::no_results("adapters");
        return Ok(());
    }

    for (idx, adapter) in adapters.iter().enumerate() {
        print::tree_head(idx + 1, &adapter.display_name);
        if cfg.quiet < 2 {
            print::as_tree_one_level(format::adapter_to_details(adapter));
        }
        if idx + 1 != adapters.len() {
            hprint!();
        }
    }

    if cfg.quiet == 0 {
        let count: ColoredString = format!("{} adapters", adapters.len()).bold().green();
        print::fat_separator();
        print::centerln(&format!("{count} will be probed").color(colors::TEXT_DEFAULT).to_string());
    }
    Ok(())
}
