mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, flash, interfaces};
use hgota_common::cancel::CancelToken;
use hgota_common::config::Config;
use terminal::{logging, print};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg = Config {
        quiet: commands.quiet,
    };

    print::banner(cfg.quiet);
    if !is_root::is_root() {
        warn!("Not running as root, opening raw channels will probably fail");
    }

    let cancel = CancelToken::new();
    spawn_interrupt_handler(cancel.clone());

    let result = match commands.command {
        Commands::Interfaces => {
            print::header("network adapters", cfg.quiet);
            interfaces::interfaces(&cfg)
        }
        Commands::Discover { scan } => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(scan.into(), &cfg, cancel).await
        }
        Commands::Flash(args) => {
            print::header("getting ready to flash", cfg.quiet);
            flash::flash(args, &cfg, cancel).await
        }
    };

    print::end_of_program(cfg.quiet);
    result
}

/// Trips `cancel` on Ctrl-C so a running scan or transfer stops at its next checkpoint.
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping...");
            cancel.cancel();
        }
    });
}
