use tokio_util::sync::CancellationToken;

/// Cooperative stop signal shared by the coordinator and every worker
///
/// Cloning yields another handle to the same signal. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    /// Creates an unset signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal; later calls have no further effect
    pub fn set(&self) {
        self.token.cancel();
    }

    /// Returns whether the signal has been set
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the signal is set
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}
