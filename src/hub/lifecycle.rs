//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;

use super::StudyHub;

impl StudyHub {
    /// Gracefully shut down the hub
    ///
    /// 1. Stops accepting new tasks (initiate and synchronous generation
    ///    return [`Error::ShuttingDown`](crate::error::Error::ShuttingDown))
    /// 2. Waits, up to `tasks.drain_timeout`, for in-flight generations so
    ///    their results land in the store
    /// 3. Stops the eviction sweeps and the API server
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Completed tasks stay readable until the process exits.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        if self.orchestrator.shutdown().await {
            tracing::info!("All in-flight content generation finished");
        } else {
            tracing::warn!("Proceeding with shutdown while content generation is still running");
        }

        self.cancel_token.cancel();
        let _ = self.event_tx.send(Event::Shutdown);

        tracing::info!("Shutdown complete");
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::hub::test_helpers::{create_test_hub, request};
    use crate::types::Event;

    #[tokio::test]
    async fn shutdown_rejects_new_work_and_emits_event() {
        let hub = create_test_hub().await;
        let mut events = hub.subscribe();
        let token = hub.shutdown_token();

        hub.shutdown().await.unwrap();

        assert!(token.is_cancelled());
        assert!(matches!(events.recv().await.unwrap(), Event::Shutdown));
        assert!(matches!(
            hub.initiate(request("websites")).await,
            Err(Error::ShuttingDown)
        ));
        assert!(matches!(
            hub.generate_content(&request("websites")).await,
            Err(Error::ShuttingDown)
        ));
    }
}
