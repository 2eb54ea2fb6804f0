use crate::models::activity::{Activity, NewActivity};
use crate::store::SharedStore;
use crate::utils::error::AppResult;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Best-effort writer for the activity feed. Appends run on their own task so
/// a slow or failing log never holds up or fails the caller.
#[derive(Clone)]
pub struct ActivityLogger {
    store: SharedStore,
}

impl ActivityLogger {
    pub fn new(store: SharedStore) -> Self {
        ActivityLogger { store }
    }

    pub fn record(&self, activity: NewActivity) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(kind = %activity.kind, "no runtime available, activity dropped");
                return None;
            }
        };

        let store = self.store.clone();
        Some(handle.spawn(async move {
            let kind = activity.kind;
            if let Err(e) = store.append_activity(activity).await {
                tracing::warn!(%kind, error = %e, "failed to append activity");
            }
        }))
    }

    pub async fn recent(&self, limit: usize) -> AppResult<Vec<Activity>> {
        self.store.get_recent_activities(limit).await
    }
}
