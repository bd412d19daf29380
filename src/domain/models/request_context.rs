use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::Actor;
use crate::domain::DomainError;

/// Per-request state passed explicitly into every catalog operation.
///
/// Carries who is asking, whether access control is bypassed, and how the
/// request can be aborted. Never stored by the catalog.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    actor: Actor,
    insecure_skip: bool,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Actor::anonymous())
    }

    /// Disables access control for this request. Only for trusted internal
    /// callers.
    pub fn with_insecure_skip(mut self, skip: bool) -> Self {
        self.insecure_skip = skip;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn insecure_skip(&self) -> bool {
        self.insecure_skip
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Runs one storage or provider call, aborting it if the request is
    /// cancelled or its deadline passes first.
    pub async fn guard<T, F>(&self, operation: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(DomainError::cancelled(format!("{} was cancelled", operation)))
            }
            _ = wait_until(self.deadline) => {
                Err(DomainError::cancelled(format!("{} exceeded its deadline", operation)))
            }
            result = fut => result,
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
