use tokio_util::sync::CancellationToken;

/// Cooperative cancellation scope.
///
/// Clones share one flag. A scope made with [`ShutdownSignal::child`] fires when its
/// parent fires, but firing a child leaves the parent untouched.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once this scope (or any ancestor) has been triggered.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}
