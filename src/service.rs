use crate::error::Result;
use crate::feedback::{FeedbackItem, FeedbackKind};
use crate::notify::ChangeNotifier;
use crate::store::HistoryStore;
use std::sync::Arc;

/// Producer/display facade over the store and the change notifier.
///
/// This is the only legitimate ingress for new items: everything enters
/// pending and is validated before any storage write. Display surfaces read
/// snapshots through [`history`](Self::history) and subscribe to the
/// notifier for re-render signals.
pub struct FeedbackService {
    store: Arc<HistoryStore>,
    notifier: ChangeNotifier,
}

impl FeedbackService {
    pub fn new(store: Arc<HistoryStore>, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// Validate, persist, and announce one piece of feedback.
    ///
    /// A validation failure rejects before any storage write; a persistence
    /// fault propagates and the caller must not assume the item was saved.
    /// Delivery happens later, in the background.
    pub async fn submit(
        &self,
        kind: FeedbackKind,
        text: &str,
        user_agent: Option<String>,
    ) -> Result<FeedbackItem> {
        let item = FeedbackItem::new(kind, text, user_agent)?;
        self.store.append(&item).await?;
        self.notifier.notify_changed();
        Ok(item)
    }

    /// Current History snapshot, newest first.
    pub async fn history(&self) -> Result<Vec<FeedbackItem>> {
        Ok(self.store.read_all().await?)
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
