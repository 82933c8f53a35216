//! Notification fan-out
//!
//! Notifications are written through the enrollment transaction, so they
//! commit or roll back with the case they describe.

use shared::models::{Notification, NotificationKind};

use crate::db::{StoreResult, StoreTx};
use crate::ids;

/// Content shared by every recipient of one fan-out
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_case_id: Option<String>,
}

impl NotificationDraft {
    fn for_recipient(&self, recipient_id: &str, now: i64) -> Notification {
        Notification {
            id: ids::new_id(),
            recipient_id: recipient_id.to_string(),
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            related_case_id: self.related_case_id.clone(),
            is_read: false,
            created_at: now,
        }
    }
}

pub async fn notify(
    tx: &mut dyn StoreTx,
    recipient_id: &str,
    draft: &NotificationDraft,
    now: i64,
) -> StoreResult<()> {
    tx.insert_notification(&draft.for_recipient(recipient_id, now))
        .await
}

/// One notification per distinct recipient; returns how many were written
pub async fn notify_all(
    tx: &mut dyn StoreTx,
    recipient_ids: &[String],
    draft: &NotificationDraft,
    now: i64,
) -> StoreResult<usize> {
    let mut seen = std::collections::HashSet::new();
    let mut written = 0;
    for id in recipient_ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        notify(tx, id, draft, now).await?;
        written += 1;
    }
    Ok(written)
}
