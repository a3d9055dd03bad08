//! subscribe / unsubscribe / recipients サブコマンド
//!
//! Telegramを経由せずに通知受信者を管理する。

use crate::registry::RecipientRegistry;
use clap::Args;

/// 受信者を指定するサブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct RecipientArgs {
    /// Recipient id (Telegram chat id)
    pub recipient_id: String,
}

/// subscribe
pub async fn subscribe(
    args: &RecipientArgs,
    registry: &RecipientRegistry,
) -> Result<(), anyhow::Error> {
    if registry.subscribe(&args.recipient_id).await? {
        println!("Subscribed {}", args.recipient_id);
    } else {
        println!("{} is already subscribed", args.recipient_id);
    }
    Ok(())
}

/// unsubscribe
pub async fn unsubscribe(
    args: &RecipientArgs,
    registry: &RecipientRegistry,
) -> Result<(), anyhow::Error> {
    if registry.unsubscribe(&args.recipient_id).await? {
        println!("Unsubscribed {}", args.recipient_id);
    } else {
        println!("{} was not subscribed", args.recipient_id);
    }
    Ok(())
}

/// recipients
pub async fn list(registry: &RecipientRegistry) -> Result<(), anyhow::Error> {
    let recipients = registry.list().await?;
    if recipients.is_empty() {
        println!("No recipients");
        return Ok(());
    }
    println!("RECIPIENT\tSUBSCRIBED");
    for recipient in recipients {
        println!(
            "{}\t{}",
            recipient.id,
            recipient.subscribed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
