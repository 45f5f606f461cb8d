//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{StudioEvent, StudioEventSink};

/// 广播通道容量，慢订阅者超出后丢失最旧事件
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<StudioEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部工作室事件
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.channel.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.channel.receiver_count()
    }
}

impl StudioEventSink for EventPublisher {
    fn publish(&self, event: StudioEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let publisher = EventPublisher::new();
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        publisher.publish(StudioEvent::LiveLog {
            message: "hola".to_string(),
        });

        for rx in [&mut first, &mut second] {
            assert_eq!(
                rx.recv().await.unwrap(),
                StudioEvent::LiveLog {
                    message: "hola".to_string()
                }
            );
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let publisher = EventPublisher::default();
        publisher.publish(StudioEvent::SynthesisFailed {
            error: "boom".to_string(),
        });
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(StudioEvent::LiveStateChanged {
            state: "open".to_string(),
            session_id: None,
        })
        .unwrap();
        assert_eq!(json["event"], "LiveStateChanged");
        assert_eq!(json["data"]["state"], "open");
        assert!(json["data"].get("session_id").is_none());
    }
}
