//! Two-stage interrupt handling
//!
//! The first Ctrl-C cancels the run: no new domains start and the URLs that
//! were not reached are listed as untested. A second Ctrl-C exits at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Exit code used when the user forces an exit
pub const FORCED_EXIT_CODE: i32 = 130;

/// What an interrupt should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// First interrupt: stop scheduling and report what was done
    Graceful,

    /// Repeated interrupt: terminate immediately
    Forced,
}

/// Shared shutdown state
#[derive(Debug, Default)]
pub struct Shutdown {
    token: CancellationToken,
    initiated: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token workers watch for cancellation
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_initiated(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Records an interrupt and cancels the token on the first one
    pub fn interrupt(&self) -> Interrupt {
        if self.initiated.swap(true, Ordering::SeqCst) {
            Interrupt::Forced
        } else {
            self.token.cancel();
            Interrupt::Graceful
        }
    }
}

/// Listens for Ctrl-C until the process exits
///
/// Spawn this next to the run. A forced interrupt exits the process with
/// [`FORCED_EXIT_CODE`].
pub async fn listen_for_interrupts(shutdown: Arc<Shutdown>) {
    loop {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Unable to listen for interrupt signal: {}", err);
            return;
        }

        match shutdown.interrupt() {
            Interrupt::Graceful => {
                tracing::warn!(
                    "Interrupted; finishing up and listing unchecked URLs (press Ctrl-C again to quit now)"
                );
            }
            Interrupt::Forced => {
                tracing::error!("Interrupted twice, exiting");
                std::process::exit(FORCED_EXIT_CODE);
            }
        }
    }
}
