//! Absolute deadlines threaded through the pipeline stages.
//!
//! A stage derives its own deadline either fresh (`Deadline::after`) or nested
//! under its caller (`Deadline::child`). Running a future under a deadline
//! drops it on expiry; nothing waits for the abandoned work.

use std::future::Future;
use std::time::Duration;
use tokio::time::{error::Elapsed, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline at all.
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            at: Some(Instant::now() + budget),
        }
    }

    /// `now + budget`, clamped to this deadline.
    pub fn child(&self, budget: Duration) -> Self {
        let own = Instant::now() + budget;
        let at = match self.at {
            Some(parent) => parent.min(own),
            None => own,
        };
        Self { at: Some(at) }
    }

    pub fn instant(&self) -> Option<Instant> {
        self.at
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.remaining(), Some(d) if d.is_zero())
    }

    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        match self.at {
            Some(at) => tokio::time::timeout_at(at, fut).await,
            None => Ok(fut.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_is_clamped_to_parent() {
        let parent = Deadline::after(Duration::from_millis(50));
        let child = parent.child(Duration::from_secs(2));
        assert_eq!(child.instant(), parent.instant());

        let roomy = Deadline::after(Duration::from_secs(60));
        let child = roomy.child(Duration::from_millis(10));
        assert!(child.instant().unwrap() < roomy.instant().unwrap());
    }

    #[test]
    fn child_of_none_is_bounded() {
        let child = Deadline::none().child(Duration::from_secs(2));
        let rem = child.remaining().unwrap();
        assert!(rem <= Duration::from_secs(2));
        assert!(Deadline::none().remaining().is_none());
        assert!(!Deadline::none().is_expired());
    }

    #[tokio::test]
    async fn run_abandons_slow_future() {
        let d = Deadline::after(Duration::from_millis(20));
        let started = std::time::Instant::now();
        let res = d
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(res.is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(d.is_expired());
    }

    #[tokio::test]
    async fn run_returns_output_within_budget() {
        let d = Deadline::after(Duration::from_secs(5));
        assert_eq!(d.run(async { 7 }).await.unwrap(), 7);
        assert_eq!(Deadline::none().run(async { "ok" }).await.unwrap(), "ok");
    }
}
