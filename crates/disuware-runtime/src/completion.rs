//! The run-wide "every module has finished initializing" signal.
//!
//! A [`CompletionResolver`] and its [`CompletionSignal`] are created once
//! before the first module loads. The signal is cloned into every module's
//! initialization hook while still pending; modules attach work to it that
//! must only run once startup is done. The resolver settles it exactly once,
//! since settling consumes it.

use thiserror::Error;
use tokio::sync::watch;

/// Startup did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("startup aborted: {0}")]
pub struct StartupAborted(pub String);

/// State of the completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionState {
    /// Modules are still initializing.
    Pending,
    /// Every module initialized.
    Resolved,
    /// Startup failed with the given message.
    Rejected(String),
}

impl CompletionState {
    /// Check if the signal has settled either way.
    pub fn is_settled(&self) -> bool {
        !matches!(self, CompletionState::Pending)
    }
}

/// Create a pending signal and the handle that settles it.
pub fn completion_channel() -> (CompletionResolver, CompletionSignal) {
    let (tx, rx) = watch::channel(CompletionState::Pending);
    (CompletionResolver { tx }, CompletionSignal { rx })
}

/// Settles the completion signal. Can only be used once.
#[derive(Debug)]
pub struct CompletionResolver {
    tx: watch::Sender<CompletionState>,
}

impl CompletionResolver {
    /// Mark startup as complete.
    pub fn resolve(self) {
        self.tx.send_replace(CompletionState::Resolved);
    }

    /// Mark startup as failed.
    pub fn reject(self, message: impl Into<String>) {
        self.tx.send_replace(CompletionState::Rejected(message.into()));
    }
}

/// A cloneable view of the completion signal.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    rx: watch::Receiver<CompletionState>,
}

impl CompletionSignal {
    /// Current state without waiting.
    pub fn state(&self) -> CompletionState {
        self.rx.borrow().clone()
    }

    /// Check if the signal has settled.
    pub fn is_settled(&self) -> bool {
        self.rx.borrow().is_settled()
    }

    /// Wait until the signal settles.
    ///
    /// A resolver dropped without settling counts as a rejection. Awaiting
    /// this from inside an initialization hook never returns, because the
    /// signal can only settle after that hook does.
    pub async fn wait(&self) -> Result<(), StartupAborted> {
        let mut rx = self.rx.clone();
        // A settled value is returned even if the resolver is gone by now
        let settled = rx
            .wait_for(CompletionState::is_settled)
            .await
            .map(|state| state.clone());

        match settled {
            Ok(CompletionState::Resolved) => Ok(()),
            Ok(CompletionState::Rejected(message)) => Err(StartupAborted(message)),
            Ok(CompletionState::Pending) | Err(_) => {
                Err(StartupAborted("startup abandoned".to_string()))
            }
        }
    }
}
