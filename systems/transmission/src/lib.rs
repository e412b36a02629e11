#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Mission message retrieval for rounds.
//!
//! Every round asks the [`Uplink`] for a message tagged with the round's
//! generation. The uplink resolves the request against a [`MessageSource`]
//! without blocking the caller and hands the result back through
//! [`Uplink::poll`]. Failures of the source never reach the caller: a fallback
//! phrase chosen when the request was made is delivered instead.

use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use signal_intercept_core::RoundGeneration;

/// Built-in phrases substituted whenever the message source fails.
pub const FALLBACK_MESSAGES: [&str; 9] = [
    "THE EAGLE HAS LANDED AT MIDNIGHT.",
    "PACKAGE SECURE. RENDEZVOUS POINT ALPHA.",
    "BLUE JAY FLIES SOUTH FOR WINTER.",
    "INTERCEPTED: OPERATION BLACKOUT IMMINENT.",
    "USE CODEPHRASE: RED HORIZON.",
    "ASSET COMPROMISED. ABORT MISSION.",
    "THE CHAIR IS AGAINST THE WALL.",
    "JOHN HAS A LONG MUSTACHE.",
    "WAIT FOR THE SIGNAL AT THE DOCKS.",
];

/// Failures reported by a message source.
#[derive(Debug, thiserror::Error)]
pub enum TransmissionError {
    /// No credential is configured for the remote service.
    #[error("message service credential is not configured")]
    MissingCredential,
    /// The remote service could not be reached or rejected the request.
    #[error("message service failed: {0}")]
    Service(String),
    /// The service answered without usable text.
    #[error("message service returned an empty transmission")]
    EmptyResponse,
}

/// Producer of mission messages.
///
/// Implementations may block; the uplink calls them off the tick thread when
/// running threaded.
pub trait MessageSource: Send + Sync {
    /// Fetches a single raw message.
    fn fetch(&self) -> Result<String, TransmissionError>;
}

/// Source used when no remote service is configured; always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineSource;

impl MessageSource for OfflineSource {
    fn fetch(&self) -> Result<String, TransmissionError> {
        Err(TransmissionError::MissingCredential)
    }
}

/// Trims and uppercases raw service text, rejecting empty results.
pub fn normalise(raw: &str) -> Result<String, TransmissionError> {
    let text = raw.trim().trim_matches('"').trim();
    if text.is_empty() {
        return Err(TransmissionError::EmptyResponse);
    }
    Ok(text.to_uppercase())
}

/// Message resolved for a specific round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDelivery {
    /// Generation of the round that requested the message.
    pub generation: RoundGeneration,
    /// Display text, either from the source or a fallback phrase.
    pub text: String,
}

/// Where requests are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dispatch {
    /// Each request runs on its own short-lived worker thread.
    #[default]
    Threaded,
    /// Requests resolve immediately on the caller's thread.
    Inline,
}

/// Fire-and-forget request channel between rounds and a message source.
pub struct Uplink {
    source: Arc<dyn MessageSource>,
    dispatch: Dispatch,
    rng: ChaCha8Rng,
    sender: Sender<MessageDelivery>,
    receiver: Receiver<MessageDelivery>,
}

impl std::fmt::Debug for Uplink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uplink")
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

impl Uplink {
    /// Creates an uplink around the provided source.
    ///
    /// The seed drives fallback selection so offline sessions replay exactly.
    #[must_use]
    pub fn new(source: Arc<dyn MessageSource>, dispatch: Dispatch, seed: u64) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source,
            dispatch,
            rng: ChaCha8Rng::seed_from_u64(seed),
            sender,
            receiver,
        }
    }

    /// Uplink that always answers with fallback phrases on the caller's thread.
    #[must_use]
    pub fn offline(seed: u64) -> Self {
        Self::new(Arc::new(OfflineSource), Dispatch::Inline, seed)
    }

    /// Requests a message for the round identified by `generation`.
    pub fn request(&mut self, generation: RoundGeneration) {
        let fallback = self.pick_fallback();
        match self.dispatch {
            Dispatch::Inline => {
                let delivery = resolve(self.source.as_ref(), generation, fallback);
                let _ = self.sender.send(delivery);
            }
            Dispatch::Threaded => {
                let source = Arc::clone(&self.source);
                let sender = self.sender.clone();
                let spawned = thread::Builder::new()
                    .name("uplink".to_owned())
                    .spawn(move || {
                        let _ = sender.send(resolve(source.as_ref(), generation, fallback));
                    });
                if let Err(error) = spawned {
                    tracing::warn!(%error, "uplink worker unavailable, using fallback");
                    let _ = self.sender.send(MessageDelivery {
                        generation,
                        text: fallback.to_owned(),
                    });
                }
            }
        }
    }

    /// Drains every delivery that completed since the previous poll.
    #[must_use]
    pub fn poll(&self) -> Vec<MessageDelivery> {
        self.receiver.try_iter().collect()
    }

    fn pick_fallback(&mut self) -> &'static str {
        FALLBACK_MESSAGES[self.rng.gen_range(0..FALLBACK_MESSAGES.len())]
    }
}

fn resolve(
    source: &dyn MessageSource,
    generation: RoundGeneration,
    fallback: &'static str,
) -> MessageDelivery {
    let text = match source.fetch().and_then(|raw| normalise(&raw)) {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!(
                %error,
                generation = generation.get(),
                "message service unavailable, using fallback"
            );
            fallback.to_owned()
        }
    };
    MessageDelivery { generation, text }
}
