// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Per-connection request loop.
//!
//! Requests are not length-prefixed; the session accumulates bytes until the
//! buffer parses as one complete JSON object, answers it, then clears the
//! buffer and starts over. One request in flight per connection.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, warn};

use crate::bridge::MainThreadBridge;
use crate::host::Host;

use super::commands::dispatch;
use super::types::{CommandRequest, CommandResponse};

const READ_CHUNK: usize = 8192;

/// Serve one client connection until it closes or the transport fails.
pub fn run_session<H: Host + 'static>(
    mut stream: TcpStream,
    bridge: MainThreadBridge<H>,
    call_timeout: Duration,
) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "<unknown>".to_owned());
    debug!(%peer, "session started");

    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) => {
                warn!(%peer, error = %err, "session read failed");
                break;
            }
        };
        buffer.extend_from_slice(&chunk[..read]);

        let request: CommandRequest = match serde_json::from_slice(&buffer) {
            Ok(request) => request,
            Err(err) if err.is_eof() => continue,
            Err(err) => {
                // Not a prefix of valid JSON; report and resynchronize.
                buffer.clear();
                let response = CommandResponse::error(format!("malformed command: {err}"));
                if write_response(&mut stream, &response).is_err() {
                    break;
                }
                continue;
            }
        };
        buffer.clear();

        debug!(%peer, command = %request.command, "command received");
        let response = bridge
            .call(call_timeout, move |host| dispatch(&request, host))
            .unwrap_or_else(|err| CommandResponse::error(err.to_string()));
        if let Err(err) = write_response(&mut stream, &response) {
            warn!(%peer, error = %err, "session write failed");
            break;
        }
    }
    debug!(%peer, "session ended");
}

fn write_response(stream: &mut TcpStream, response: &CommandResponse) -> std::io::Result<()> {
    // A response enum of plain fields always renders.
    let rendered = serde_json::to_vec(response).unwrap_or_default();
    stream.write_all(&rendered)?;
    stream.flush()
}
