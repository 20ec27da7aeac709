//! Service types

use crate::Result;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Long-lived engine mounted by a plugin
#[async_trait]
pub trait Service: Send + Sync + Any {
    /// Service type name (unique identifier)
    fn service_type(&self) -> &str;

    /// Initialize the service
    async fn initialize(&mut self, _runtime: Arc<dyn Any + Send + Sync>) -> Result<()> {
        Ok(())
    }

    /// Start the service
    async fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Stop the service (cleanup)
    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    /// Check if service is running
    fn is_running(&self) -> bool {
        false
    }

    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        running: bool,
    }

    #[async_trait]
    impl Service for Counter {
        fn service_type(&self) -> &str {
            "counter"
        }

        async fn start(&mut self) -> Result<()> {
            self.running = true;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[tokio::test]
    async fn test_service_lifecycle() {
        let mut service = Counter { running: false };
        assert!(service.initialize(Arc::new(())).await.is_ok());
        assert!(!service.is_running());

        service.start().await.unwrap();
        assert!(service.is_running());
        assert!(service.stop().await.is_ok());
        assert!(service.as_any().downcast_ref::<Counter>().is_some());
    }
}
