use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use teloxide::{prelude::*, types::Recipient};

use super::dto::{BroadcastReport, BroadcastSummary, ChannelResult, TelegramChannel};

#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send_text(&self, username: &str, text: &str) -> Result<()>;
    async fn member_count(&self, username: &str) -> Result<u32>;
}

/// `@handle` goes to the public channel, anything numeric is a chat id.
pub fn recipient_for(username: &str) -> Recipient {
    match username.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(username.to_string()),
    }
}

#[async_trait]
impl ChannelSender for Bot {
    async fn send_text(&self, username: &str, text: &str) -> Result<()> {
        self.send_message(recipient_for(username), text).await?;
        Ok(())
    }

    async fn member_count(&self, username: &str) -> Result<u32> {
        Ok(self.get_chat_member_count(recipient_for(username)).await?)
    }
}

/// Send `text` to every channel concurrently. A failing channel is recorded and
/// does not stop the others.
pub async fn broadcast<S: ChannelSender + ?Sized>(
    sender: &S,
    channels: &[TelegramChannel],
    text: &str,
) -> BroadcastReport {
    let sends = channels.iter().map(|channel| async move {
        match sender.send_text(&channel.username, text).await {
            Ok(()) => ChannelResult {
                channel_id: channel.id.clone(),
                username: channel.username.clone(),
                success: true,
                error: None,
            },
            Err(e) => {
                log::error!("Broadcast to {} failed: {}", channel.username, e);
                ChannelResult {
                    channel_id: channel.id.clone(),
                    username: channel.username.clone(),
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    });

    let results = join_all(sends).await;
    let sent = results.iter().filter(|r| r.success).count();
    let summary = BroadcastSummary {
        sent,
        failed: results.len() - sent,
    };
    log::info!(
        "Broadcast finished: {} sent, {} failed",
        summary.sent,
        summary.failed
    );

    BroadcastReport { results, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSender {
        delivered: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChannelSender for FakeSender {
        async fn send_text(&self, username: &str, text: &str) -> Result<()> {
            if username == "@broken" {
                return Err(anyhow!("chat not found"));
            }
            self.delivered
                .lock()
                .unwrap()
                .push((username.to_string(), text.to_string()));
            Ok(())
        }

        async fn member_count(&self, _username: &str) -> Result<u32> {
            Ok(0)
        }
    }

    fn channel(username: &str) -> TelegramChannel {
        TelegramChannel {
            id: format!("id-{}", username),
            user_id: "alice".to_string(),
            name: username.to_string(),
            username: username.to_string(),
            member_count: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_others() {
        let sender = FakeSender::default();
        let channels = vec![channel("@news"), channel("@broken"), channel("-100123")];

        let report = broadcast(&sender, &channels, "hello").await;

        assert_eq!(report.summary, BroadcastSummary { sent: 2, failed: 1 });
        assert_eq!(report.results.len(), 3);
        let broken = report.results.iter().find(|r| r.username == "@broken").unwrap();
        assert_eq!(broken.error.as_deref(), Some("chat not found"));
        assert_eq!(sender.delivered.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_recipient_for() {
        assert!(matches!(recipient_for("-100123"), Recipient::Id(ChatId(-100123))));
        assert!(matches!(
            recipient_for("@news"),
            Recipient::ChannelUsername(ref name) if name == "@news"
        ));
    }
}
