use std::sync::Arc;

use crate::KernelError;

/// Outbound, best-effort message channel (chat bot, mail relay, ...).
#[async_trait::async_trait]
pub trait NotificationSink: 'static + Sync + Send {
    async fn send(&self, message: &str) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnNotificationSink: 'static + Sync + Send {
    type NotificationSink: NotificationSink;
    fn notification_sink(&self) -> Arc<Self::NotificationSink>;
}
