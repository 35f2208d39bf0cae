//! JSON lines protocol for headless matches.
//!
//! **Input (stdin):** action requests for corners driven by `stdin`
//! **Output (stdout):** outcome records and summaries
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. A controller sends action requests as JSON lines
//! 3. Runner outputs an `outcome` line for every tick that produced one
//! 4. Runner outputs `round_over` after each round and `summary` at the end
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","seed":42,"slot_one":"channel","slot_two":"fallback"}
//! -> {"slot":"one","action":"jab"}
//! <- {"type":"outcome","tick":212,"entries":[...],"trade":false,"momentum":...}
//! <- {"type":"round_over","round":1,"winner":"one",...}
//! <- {"type":"summary",...}
//! ```
//!
//! Requests that fail to parse, or name an unknown action, leave the
//! corner idle.

use std::io::BufRead;
use std::thread;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError};

use brawl_core::catalog::ActionId;
use brawl_core::combatant::{CombatantView, Slot};
use brawl_core::outcome::TickOutcome;
use brawl_core::round::RoundResult;
use brawl_core::source::ActionSource;

use crate::metrics::MatchReport;

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Pending requests buffered per corner.
pub const CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// Input (controller -> runner)
// ============================================================================

/// One action request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Corner the request is for.
    pub slot: Slot,
    /// Action identifier text.
    pub action: String,
}

/// Parse a request line. Blank or malformed lines yield `None`.
#[must_use]
pub fn parse_request(line: &str) -> Option<ActionRequest> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(request) => Some(request),
        Err(e) => {
            tracing::warn!(error = %e, line, "Ignoring malformed request");
            None
        }
    }
}

// ============================================================================
// Output (runner -> controller)
// ============================================================================

/// One output line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Match is about to start.
    Ready {
        /// Protocol version.
        version: String,
        /// Match seed.
        seed: u64,
        /// Source in corner one.
        slot_one: String,
        /// Source in corner two.
        slot_two: String,
    },
    /// A tick produced strikes.
    Outcome(TickOutcome),
    /// A round ended.
    RoundOver(RoundResult),
    /// Match summary.
    Summary(MatchReport),
}

impl Response {
    /// Encode as a single JSON line, without the newline.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// Channel-fed action source
// ============================================================================

/// Decision source fed by a message channel.
///
/// Never blocks: an empty or disconnected channel means no action this
/// decision point.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<String>,
}

impl ChannelSource {
    /// Source reading from `receiver`.
    #[must_use]
    pub fn new(receiver: mpsc::Receiver<String>) -> Self {
        Self { receiver }
    }

    /// A bounded channel and the source at its receiving end.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, Self::new(receiver))
    }
}

impl ActionSource for ChannelSource {
    fn choose_action(
        &mut self,
        _own: &CombatantView,
        _opponent: &CombatantView,
        _time_remaining: u64,
    ) -> Option<ActionId> {
        match self.receiver.try_recv() {
            Ok(text) => {
                let action = ActionId::parse(&text);
                if action.is_none() {
                    tracing::debug!(text, "Unknown action identifier, staying idle");
                }
                action
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::trace!("Request channel closed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Forward stdin requests to per-corner channels on a background thread.
///
/// The thread exits when stdin closes or every receiver is dropped.
pub fn spawn_stdin_reader(senders: [Option<mpsc::Sender<String>>; 2]) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        forward_requests(stdin.lock(), &senders);
    })
}

/// Forward each request line from `input` to its corner's sender.
pub fn forward_requests<R: BufRead>(input: R, senders: &[Option<mpsc::Sender<String>>; 2]) {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        let Some(request) = parse_request(&line) else {
            continue;
        };
        let Some(sender) = &senders[request.slot.index()] else {
            tracing::warn!(slot = ?request.slot, "Corner is not driven by stdin");
            continue;
        };
        if sender.blocking_send(request.action).is_err() {
            tracing::debug!("Match ended, stopping stdin reader");
            break;
        }
    }
}
