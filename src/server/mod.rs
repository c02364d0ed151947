// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! The loopback command server.
//!
//! One background thread accepts connections; each accepted connection gets
//! its own session thread. Command execution itself is serialized through
//! the [`MainThreadBridge`](crate::bridge::MainThreadBridge), so handler
//! code never sees concurrency.

mod commands;
mod session;
mod types;

pub use commands::{
    ApplyDetailParams, CommandError, CommandKind, ConfigVariableParams, NodesInfoParams, dispatch,
};
pub use types::{CommandRequest, CommandResponse, ToolDescriptor, ToolsListResponse};

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use crate::bridge::MainThreadBridge;
use crate::host::Host;

/// The port clients are told to connect to, matching published tooling.
pub const DEFAULT_PORT: u16 = 9876;

/// How often the accept loop re-checks the stop flag when idle.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Deadline for one command on the host thread; the session answers
    /// with an error envelope when it passes.
    pub call_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum ServerError {
    Bind(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(err) => write!(f, "failed to bind command server: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind(err) => Some(err),
        }
    }
}

/// A running command server. Dropping it stops the accept loop.
pub struct CommandServer {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
}

impl CommandServer {
    /// Bind the loopback listener and start accepting in the background.
    ///
    /// Binding to port 0 picks a free port; [`local_addr`](Self::local_addr)
    /// reports the actual one.
    pub fn start<H: Host + 'static>(
        config: ServerConfig,
        bridge: MainThreadBridge<H>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, config.port))
            .map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
        listener.set_nonblocking(true).map_err(ServerError::Bind)?;

        let running = Arc::new(AtomicBool::new(true));
        let accept_running = Arc::clone(&running);
        let call_timeout = config.call_timeout;
        let accept_thread = thread::Builder::new()
            .name("nodescope-accept".to_owned())
            .spawn(move || accept_loop(listener, accept_running, bridge, call_timeout))
            .map_err(ServerError::Bind)?;

        info!(%local_addr, "command server listening");
        Ok(Self {
            local_addr,
            running,
            accept_thread: Some(accept_thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections and wait for the accept loop to exit.
    ///
    /// Sessions already in flight finish on their own threads.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.accept_thread.take() {
            if handle.join().is_err() {
                warn!("accept thread ended by panic");
            }
        }
        info!("command server stopped");
    }
}

impl Drop for CommandServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop<H: Host + 'static>(
    listener: TcpListener,
    running: Arc<AtomicBool>,
    bridge: MainThreadBridge<H>,
    call_timeout: Duration,
) {
    while running.load(Ordering::SeqCst) {
        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
                continue;
            }
            Err(err) => {
                warn!(error = %err, "accept failed");
                thread::sleep(ACCEPT_POLL_INTERVAL);
                continue;
            }
        };
        // The listener is nonblocking so the stop flag stays responsive;
        // sessions themselves read blocking.
        if let Err(err) = stream.set_nonblocking(false) {
            warn!(%peer, error = %err, "failed to configure connection");
            continue;
        }
        let session_bridge = bridge.clone();
        let spawned = thread::Builder::new()
            .name(format!("nodescope-session-{peer}"))
            .spawn(move || session::run_session(stream, session_bridge, call_timeout));
        if let Err(err) = spawned {
            warn!(%peer, error = %err, "failed to spawn session thread");
        }
    }
}
