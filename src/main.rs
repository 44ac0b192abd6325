// SPDX-License-Identifier: GPL-3.0-only
use std::process::ExitCode;

use anyhow::Context;

use crate::apply::XrandrCommand;
use crate::config::Config;
use crate::hotplug::{RandrMonitor, Reconciler};
use crate::topology::RandrTopology;

#[macro_use]
extern crate tracing;

mod apply;
mod config;
mod error;
mod hotplug;
mod layout;
mod resolve;
mod topology;

fn setup_logs() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}=info",
        env!("CARGO_CRATE_NAME")
    )));

    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err((errs, config)) => {
            for err in errs {
                error!("errors loading config: {}", err);
            }
            config
        }
    }
}

/// Open both X connections: one for queries, one for notifications
fn connect(config: &Config) -> anyhow::Result<(RandrTopology, RandrMonitor)> {
    let display = config.display.as_deref();
    let topology = RandrTopology::connect(display).context("failed to open topology source")?;
    let monitor = RandrMonitor::open(display).context("failed to subscribe to output changes")?;
    Ok((topology, monitor))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logs();
    let config = load_config();

    let (topology, monitor) = match connect(&config) {
        Ok(sources) => sources,
        Err(err) => {
            error!("{:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let events = match hotplug::spawn_monitor(monitor) {
        Ok(events) => events,
        Err(err) => {
            error!("failed to start hotplug monitoring: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let reconciler = Reconciler::new(topology, XrandrCommand::from_config(&config), &config);
    if let Err(err) = reconciler.run(events).await {
        error!("{}", err);
    }

    ExitCode::FAILURE
}
