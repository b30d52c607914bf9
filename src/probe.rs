use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tungstenite::{connect, Message};

use crate::config::ProbeCfg;
use crate::error::{GiftError, Result};
use crate::timestamp;

/// The time query the gift server answers with the gift active at `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePayload {
    pub time: String,
}

impl TimePayload {
    pub fn now() -> Self {
        Self { time: timestamp::format_iso(&timestamp::now()) }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One request/response round trip over a fresh websocket.
///
/// Sends `payload` as a single text frame and returns the first data frame
/// that comes back. Pings are answered by tungstenite and skipped here.
/// Progress lines go to `out`, starting only once the connection is up.
pub fn exchange(url: &str, payload: &str, out: &mut impl Write) -> Result<String> {
    let (mut socket, response) = connect(url)?;
    tracing::debug!(status = %response.status(), "handshake complete");

    writeln!(out, "Sending '{}'...", payload)?;
    socket.send(Message::text(payload))?;
    writeln!(out, "Sent")?;
    writeln!(out, "Receiving...")?;

    let received = loop {
        match socket.read()? {
            Message::Text(text) => break text,
            Message::Binary(bytes) => break String::from_utf8_lossy(&bytes).into_owned(),
            Message::Close(frame) => {
                tracing::warn!(?frame, "server closed the connection first");
                return Err(GiftError::ClosedBeforeResponse);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        }
    };

    socket.close(None)?;
    // Drive the closing handshake until the peer answers or drops.
    loop {
        match socket.read() {
            Ok(_) => continue,
            Err(tungstenite::Error::ConnectionClosed) => break,
            Err(e) => {
                tracing::debug!(error = %e, "close handshake did not finish cleanly");
                break;
            }
        }
    }

    Ok(received)
}

pub fn run(cfg: &ProbeCfg) -> Result<String> {
    tracing::info!(url = %cfg.url, "connecting");
    let payload = TimePayload::now().to_json()?;
    let mut out = io::stdout().lock();
    let received = exchange(&cfg.url, &payload, &mut out)?;
    writeln!(out, "Received '{}'", received)?;
    Ok(received)
}
