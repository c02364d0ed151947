// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Nodescope demo entrypoint.
//!
//! Runs the command server over a built-in demo graph so clients can be
//! developed without a host application attached. A real embedding uses the
//! library crate directly and drives the executor from its own main loop.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nodescope::bridge::{self, BridgeError};
use nodescope::config::DetailConfig;
use nodescope::host::{HostInfo, InMemoryHost};
use nodescope::model::fixtures::demo_graph;
use nodescope::server::{CommandServer, ServerConfig, DEFAULT_PORT};

const EXECUTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--port <port>] [--config <file>]\n\nServes the demo node graph on 127.0.0.1 (default port {DEFAULT_PORT}; 0 = ephemeral).\n--config points at a JSON settings file; missing files mean defaults."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    port: Option<u16>,
    config_path: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            "--config" => {
                if options.config_path.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.config_path = Some(path);
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "nodescope".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(tracing_subscriber::fmt::layer())
            .init();

        let config = match &options.config_path {
            Some(path) => DetailConfig::load(&PathBuf::from(path))?,
            None => DetailConfig::default(),
        };

        let mut host = InMemoryHost::new(
            HostInfo::new("demo", env!("CARGO_PKG_VERSION")),
            config,
        );
        host.set_graph(demo_graph());

        let (bridge, executor) = bridge::channel::<InMemoryHost>();
        let server_config = ServerConfig {
            port: options.port.unwrap_or(DEFAULT_PORT),
            ..ServerConfig::default()
        };
        let _server = CommandServer::start(server_config, bridge)?;

        // This thread owns the host; it only ever runs bridged jobs.
        loop {
            match executor.run_next(&mut host, EXECUTOR_POLL_INTERVAL) {
                Ok(_) => {}
                Err(BridgeError::Closed) => break,
                Err(err) => return Err(Box::new(err)),
            }
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("nodescope: {err}");
        std::process::exit(1);
    }
}
