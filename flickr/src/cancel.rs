use crate::error::{Error, Result};
use log::debug;
use parking_lot::Mutex;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Lets every outstanding request be cancelled at once.
///
/// Each request races against the token current at the time it started;
/// `cancel_all` fires that token and installs a fresh one for later requests.
#[derive(Debug, Default)]
pub struct Tracker {
    token: Mutex<CancellationToken>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_all(&self) {
        let old = std::mem::take(&mut *self.token.lock());
        old.cancel();
        debug!("cancelled outstanding requests");
    }

    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let token = self.token.lock().clone();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            r = fut => r,
        }
    }
}
