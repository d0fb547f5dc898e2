//! services/client/src/app/resource_list.rs
//!
//! A generic controller for "a list of things the user owns": fetch the full
//! list, apply writes with either refetch-after-write or optimistic updates,
//! and track which actions are in flight.

use futures::future::BoxFuture;
use futures::FutureExt;
use ridetribe_core::domain::Identified;
use ridetribe_core::ports::{PortError, PortResult, Toast, Toaster};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::session::SessionStore;

type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, PortResult<Vec<T>>> + Send + Sync>;

/// Names one user action, e.g. deleting a particular destination.
/// Two writes with the same key never run at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey(String);

impl ActionKey {
    pub fn new(action: &str, target: &str) -> Self {
        Self(format!("{}:{}", action, target))
    }

    /// An action with no particular target, e.g. the create form's submit.
    pub fn global(action: &str) -> Self {
        Self(action.to_string())
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Releases an action key when the write finishes, however it finishes.
struct InFlight<'a> {
    actions: &'a Mutex<HashSet<ActionKey>>,
    key: ActionKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

struct Loading<'a>(&'a AtomicBool);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ResourceList<T> {
    label: &'static str,
    fetch: FetchFn<T>,
    session: Arc<SessionStore>,
    toaster: Arc<dyn Toaster>,
    items: RwLock<Vec<T>>,
    loading: AtomicBool,
    in_flight: Mutex<HashSet<ActionKey>>,
}

impl<T> ResourceList<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    /// `label` is the plural noun used in messages, e.g. "destinations".
    pub fn new<F, Fut>(
        label: &'static str,
        session: Arc<SessionStore>,
        toaster: Arc<dyn Toaster>,
        fetch: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PortResult<Vec<T>>> + Send + 'static,
    {
        let fetch: FetchFn<T> = Arc::new(move || fetch().boxed());
        Self {
            label,
            fetch,
            session,
            toaster,
            items: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    //=====================================================================================
    // Reading
    //=====================================================================================

    pub async fn items(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.items.read().await.iter().find(|i| i.id() == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// True while a write under `key` is running; the UI disables that control.
    pub fn is_busy(&self, key: &ActionKey) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    //=====================================================================================
    // Fetching
    //=====================================================================================

    /// Fetches the full list when signed in. Failures are toasted.
    pub async fn load(&self) -> PortResult<()> {
        if !self.session.is_authenticated() {
            debug!("Skipping {} fetch, not signed in", self.label);
            return Ok(());
        }
        match self.refresh().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.report(&e, Some(&self.load_failed()));
                Err(e)
            }
        }
    }

    /// Fetches and replaces the list without surfacing anything to the user.
    pub async fn refresh(&self) -> PortResult<()> {
        self.loading.store(true, Ordering::SeqCst);
        let _loading = Loading(&self.loading);
        let fresh = (self.fetch)().await?;
        *self.items.write().await = fresh;
        Ok(())
    }

    pub async fn replace(&self, items: Vec<T>) {
        *self.items.write().await = items;
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    /// Replaces the item with the same id, or appends it.
    pub async fn upsert(&self, item: T) {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    //=====================================================================================
    // Writing
    //=====================================================================================

    /// Runs a write that does not touch the list itself, under the busy guard.
    pub async fn run<R, Fut>(
        &self,
        key: ActionKey,
        write: Fut,
        success: Option<&str>,
    ) -> PortResult<R>
    where
        Fut: Future<Output = PortResult<R>>,
    {
        let _guard = self.begin(key)?;
        match write.await {
            Ok(value) => {
                if let Some(message) = success {
                    self.toaster.show(Toast::success(message));
                }
                Ok(value)
            }
            Err(e) => {
                self.report(&e, None);
                Err(e)
            }
        }
    }

    /// Runs the write, then replaces the list with the server's copy.
    pub async fn refetch<R, Fut>(&self, key: ActionKey, write: Fut, success: &str) -> PortResult<R>
    where
        Fut: Future<Output = PortResult<R>>,
    {
        let _guard = self.begin(key)?;
        let value = match write.await {
            Ok(value) => value,
            Err(e) => {
                self.report(&e, None);
                return Err(e);
            }
        };
        self.toaster.show(Toast::success(success));
        if let Err(e) = self.refresh().await {
            error!("Failed to refresh {} after a write: {:?}", self.label, e);
            self.report(&e, Some(&self.load_failed()));
        }
        Ok(value)
    }

    /// Patches the item locally, then confirms with the server. The item is
    /// restored to its snapshot if the write fails.
    pub async fn optimistic<R, P, Fut>(
        &self,
        key: ActionKey,
        id: &str,
        patch: P,
        write: Fut,
        success: Option<&str>,
    ) -> PortResult<R>
    where
        P: FnOnce(&mut T),
        Fut: Future<Output = PortResult<R>>,
    {
        let _guard = self.begin(key)?;
        let snapshot = {
            let mut items = self.items.write().await;
            let item = items
                .iter_mut()
                .find(|i| i.id() == id)
                .ok_or_else(|| self.missing(id))?;
            let before = item.clone();
            patch(item);
            before
        };

        match write.await {
            Ok(value) => {
                if let Some(message) = success {
                    self.toaster.show(Toast::success(message));
                }
                Ok(value)
            }
            Err(e) => {
                warn!("Rolling back {} {}: {:?}", self.label, id, e);
                if let Some(item) = self.items.write().await.iter_mut().find(|i| i.id() == id) {
                    *item = snapshot;
                }
                self.report(&e, None);
                Err(e)
            }
        }
    }

    /// Removes the item locally, then confirms with the server. The item goes
    /// back to its old position if the write fails.
    pub async fn optimistic_remove<R, Fut>(
        &self,
        key: ActionKey,
        id: &str,
        write: Fut,
        success: Option<&str>,
    ) -> PortResult<R>
    where
        Fut: Future<Output = PortResult<R>>,
    {
        let _guard = self.begin(key)?;
        let (index, removed) = {
            let mut items = self.items.write().await;
            let index = items
                .iter()
                .position(|i| i.id() == id)
                .ok_or_else(|| self.missing(id))?;
            (index, items.remove(index))
        };

        match write.await {
            Ok(value) => {
                if let Some(message) = success {
                    self.toaster.show(Toast::success(message));
                }
                Ok(value)
            }
            Err(e) => {
                warn!("Restoring removed {} {}: {:?}", self.label, id, e);
                let mut items = self.items.write().await;
                let index = index.min(items.len());
                items.insert(index, removed);
                drop(items);
                self.report(&e, None);
                Err(e)
            }
        }
    }

    fn load_failed(&self) -> String {
        format!("Failed to load {}. Please try again.", self.label)
    }

    fn begin(&self, key: ActionKey) -> PortResult<InFlight<'_>> {
        let mut actions = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !actions.insert(key.clone()) {
            debug!(action = %key, "Ignoring duplicate action");
            return Err(PortError::InProgress(key.to_string()));
        }
        Ok(InFlight {
            actions: &self.in_flight,
            key,
        })
    }

    fn missing(&self, id: &str) -> PortError {
        PortError::NotFound(format!("No such item in {}: {}", self.label, id))
    }

    /// Shows the error and lets the session react to an expired token.
    pub fn report(&self, err: &PortError, message: Option<&str>) {
        error!("Operation on {} failed: {:?}", self.label, err);
        let text = match message {
            Some(m) => m.to_string(),
            None => err.user_message(),
        };
        self.toaster.show(Toast::error(text));
        self.session.intercept(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fakes::{destination, Harness};
    use assert_matches::assert_matches;
    use ridetribe_core::domain::Destination;
    use ridetribe_core::ports::{DestinationService, ToastLevel};
    use tokio::sync::oneshot;

    fn list(h: &Harness) -> ResourceList<Destination> {
        let api = h.state.destinations.clone();
        ResourceList::new("destinations", h.session.clone(), h.state.toaster.clone(), move || {
            let api = api.clone();
            async move { api.list_destinations().await }
        })
    }

    #[tokio::test]
    async fn load_is_skipped_when_signed_out() {
        let h = Harness::new();
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        let list = list(&h);

        list.load().await.unwrap();
        assert!(list.is_empty().await);
        assert_eq!(h.backend.calls("list_destinations"), 0);
    }

    #[tokio::test]
    async fn refetch_leaves_exactly_the_server_list() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        let list = list(&h);
        list.load().await.unwrap();

        let backend = h.backend.clone();
        list.refetch(
            ActionKey::global("create"),
            async move {
                backend.seed_destinations(vec![
                    destination("d1", "School"),
                    destination("d2", "Pool"),
                ]);
                Ok(())
            },
            "Created",
        )
        .await
        .unwrap();

        let ids: Vec<_> = list.items().await.into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[tokio::test]
    async fn failed_optimistic_write_restores_the_item() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        let list = list(&h);
        list.load().await.unwrap();

        let result: PortResult<()> = list
            .optimistic(
                ActionKey::new("rename", "d1"),
                "d1",
                |d| d.name = "Renamed".to_string(),
                async { Err(PortError::Api { status: 500, message: "boom".into() }) },
                None,
            )
            .await;

        assert_matches!(result, Err(PortError::Api { status: 500, .. }));
        assert_eq!(list.get("d1").await.unwrap().name, "School");
        let toast = h.toaster.last().unwrap();
        assert_eq!((toast.level, toast.message.as_str()), (ToastLevel::Error, "boom"));
    }

    #[tokio::test]
    async fn failed_remove_reinserts_at_the_same_position() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![
            destination("d1", "School"),
            destination("d2", "Pool"),
            destination("d3", "Park"),
        ]);
        let list = list(&h);
        list.load().await.unwrap();

        let result: PortResult<()> = list
            .optimistic_remove(
                ActionKey::new("delete", "d2"),
                "d2",
                async { Err(PortError::Network("offline".into())) },
                None,
            )
            .await;

        assert!(result.is_err());
        let ids: Vec<_> = list.items().await.into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }

    #[tokio::test]
    async fn duplicate_action_is_rejected_while_in_flight() {
        let h = Harness::signed_in().await;
        let list = Arc::new(list(&h));
        let key = ActionKey::new("delete", "d1");
        let (release, wait) = oneshot::channel::<()>();

        let first = {
            let list = list.clone();
            let key = key.clone();
            tokio::spawn(async move {
                list.run(
                    key,
                    async move {
                        let _ = wait.await;
                        Ok(())
                    },
                    None,
                )
                .await
            })
        };
        while !list.is_busy(&key) {
            tokio::task::yield_now().await;
        }

        let second: PortResult<()> = list.run(key.clone(), async { Ok(()) }, None).await;
        assert_matches!(second, Err(PortError::InProgress(_)));
        assert!(!list.is_busy(&ActionKey::new("delete", "d2")));

        release.send(()).unwrap();
        first.await.unwrap().unwrap();
        assert!(!list.is_busy(&key));
    }

    #[tokio::test]
    async fn failed_write_releases_its_key() {
        let h = Harness::signed_in().await;
        let list = list(&h);
        let key = ActionKey::global("create");

        let _: PortResult<()> = list
            .run(key.clone(), async { Err(PortError::Validation("nope".into())) }, None)
            .await;
        assert!(!list.is_busy(&key));
    }

    #[tokio::test]
    async fn unauthorized_write_logs_the_session_out() {
        let h = Harness::signed_in().await;
        let list = list(&h);

        let _: PortResult<()> = list
            .run(
                ActionKey::global("create"),
                async { Err(PortError::Unauthorized("expired".into())) },
                None,
            )
            .await;
        assert!(!h.session.is_authenticated());
    }
}
