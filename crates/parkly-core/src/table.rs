// ── Generic resource table controller ──
//
// Holds one collection, a search-filtered view over it, and the CRUD
// flow. Every successful mutation is followed by exactly one full
// re-fetch; failed mutations leave the collection untouched.

use std::sync::Arc;

use parkly_api::{ApiRequest, Gateway};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::EntityId;
use crate::notify::Notification;
use crate::resource::{Draft, Resource};
use crate::stats::{self, CountPolicy, Summary};

// ── Supporting types ─────────────────────────────────────────────────

/// Lifecycle of a table's collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last load failed; the previous collection (if any) is kept.
    Failed(String),
}

/// Asks the operator to approve a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool + Send + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of an operation that may be declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Cancelled,
}

/// Kinds of write the table performs, for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    Create,
    Update,
    Delete,
    Availability,
}

impl Mutation {
    fn succeeded(self, label: &str) -> String {
        match self {
            Self::Create => format!("{label} created"),
            Self::Update => format!("{label} updated"),
            Self::Delete => format!("{label} deleted"),
            Self::Availability => "Availability updated".into(),
        }
    }

    fn failed(self, label: &str) -> String {
        let label = label.to_lowercase();
        match self {
            Self::Create => format!("Could not create {label}"),
            Self::Update => format!("Could not update {label}"),
            Self::Delete => format!("Could not delete {label}"),
            Self::Availability => "Could not update availability".into(),
        }
    }
}

// ── Controller ───────────────────────────────────────────────────────

pub struct ResourceTable<R: Resource> {
    gateway: Arc<Gateway>,
    records: Vec<R>,
    /// Indices into `records` that match the current search.
    view: Vec<usize>,
    search: String,
    state: TableState,
    page_size: usize,
    notifications: Vec<Notification>,
}

impl<R: Resource> ResourceTable<R> {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            records: Vec::new(),
            view: Vec::new(),
            search: String::new(),
            state: TableState::Idle,
            page_size: R::KIND.page_size(),
            notifications: Vec::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// The full collection, in display order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Records matching the current search, in display order.
    pub fn filtered(&self) -> Vec<&R> {
        self.view.iter().filter_map(|&i| self.records.get(i)).collect()
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn find(&self, id: &EntityId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Total plus seeded category counts over the full collection.
    pub fn summary(&self) -> Summary {
        stats::summarize(&self.records, CountPolicy::DropUnknown)
    }

    /// Drain notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Fetch the whole collection and reset the search.
    ///
    /// On failure the previous collection is kept and the state becomes
    /// `Failed`.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let kind = R::KIND;
        self.state = TableState::Loading;
        debug!(%kind, "loading collection");

        match self.gateway.list::<R>(kind.collection_path()).await {
            Ok(records) => {
                self.records = order_for_display(records);
                self.search.clear();
                self.view = (0..self.records.len()).collect();
                self.state = TableState::Loaded;
                debug!(%kind, count = self.records.len(), "collection loaded");
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(%kind, error = %err, "failed to load collection");
                self.state = TableState::Failed(err.to_string());
                self.report(&format!("Failed to load {kind}"), &err);
                Err(err)
            }
        }
    }

    /// Fetch one record by id without touching the collection.
    pub async fn fetch(&self, id: &EntityId) -> Result<R, CoreError> {
        let req = ApiRequest::get(R::KIND.item_path(id));
        Ok(self.gateway.send(req).await?)
    }

    // ── Search ───────────────────────────────────────────────────────

    /// Recompute the filtered view. Empty text shows everything.
    pub fn search(&mut self, text: &str) {
        text.clone_into(&mut self.search);
        let needle = text.to_lowercase();
        self.view = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(&needle))
            .map(|(i, _)| i)
            .collect();
    }

    // ── Pagination ───────────────────────────────────────────────────

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages in the filtered view (at least one).
    pub fn page_count(&self) -> usize {
        self.view.len().div_ceil(self.page_size).max(1)
    }

    /// One zero-based page of the filtered view; empty past the end.
    pub fn page(&self, index: usize) -> Vec<&R> {
        self.view
            .iter()
            .skip(index.saturating_mul(self.page_size))
            .take(self.page_size)
            .filter_map(|&i| self.records.get(i))
            .collect()
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(&mut self, draft: &R::Draft) -> Result<(), CoreError> {
        draft.validate()?;
        let req = ApiRequest::post(R::KIND.collection_path(), draft)?;
        self.mutate(req, Mutation::Create).await
    }

    pub async fn update(&mut self, id: &EntityId, draft: &R::Update) -> Result<(), CoreError> {
        draft.validate()?;
        let req = ApiRequest::put(R::KIND.item_path(id), draft)?;
        self.mutate(req, Mutation::Update).await
    }

    /// Delete after confirmation. A declined confirmation issues nothing.
    pub async fn delete(
        &mut self,
        id: &EntityId,
        confirm: &dyn Confirm,
    ) -> Result<Outcome, CoreError> {
        let prompt = format!("Delete {} {id}?", R::KIND.singular().to_lowercase());
        if !confirm.confirm(&prompt) {
            debug!(kind = %R::KIND, %id, "delete cancelled");
            return Ok(Outcome::Cancelled);
        }

        self.mutate(ApiRequest::delete(R::KIND.item_path(id)), Mutation::Delete)
            .await?;
        Ok(Outcome::Applied)
    }

    /// Send a mutation, then refresh on success.
    pub(crate) async fn mutate(&mut self, req: ApiRequest, action: Mutation) -> Result<(), CoreError> {
        let label = R::KIND.singular();
        let method = req.method.clone();

        match self.gateway.request(req).await {
            Ok(_) => {
                let message = action.succeeded(label);
                info!(kind = %R::KIND, %method, "{message}");
                self.notify(Notification::success(message));
                // A failed refresh does not undo the mutation; `load` has
                // already recorded it in `state` and the notifications.
                if let Err(e) = self.load().await {
                    debug!(kind = %R::KIND, error = %e, "refresh after mutation failed");
                }
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.report(&action.failed(label), &err);
                Err(err)
            }
        }
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Queue an error notification. Expired sessions are handled
    /// globally and produce no local message.
    pub(crate) fn report(&mut self, context: &str, err: &CoreError) {
        if err.is_auth_expired() {
            return;
        }
        self.notifications
            .push(Notification::error(format!("{context}: {err}")));
    }
}

/// Records with a display key sorted case-insensitively (stable);
/// records without one follow in backend order.
fn order_for_display<R: Resource>(records: Vec<R>) -> Vec<R> {
    let (mut keyed, unkeyed): (Vec<R>, Vec<R>) =
        records.into_iter().partition(|r| r.display_key().is_some());
    keyed.sort_by_cached_key(|r| r.display_key().map(str::to_lowercase));
    keyed.extend(unkeyed);
    keyed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::User;

    fn users(values: serde_json::Value) -> Vec<User> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn display_order_sorts_keyed_and_appends_keyless() {
        let ordered = order_for_display(users(json!([
            {"id": 1, "full_name": "zafar"},
            {"id": 2},
            {"id": 3, "full_name": "Aziz"},
            {"id": 4, "full_name": ""},
            {"id": 5, "full_name": "bobur"}
        ])));
        let ids: Vec<String> = ordered.iter().map(|u| u.id.to_string()).collect();
        assert_eq!(ids, vec!["3", "5", "1", "2", "4"]);
    }

    #[test]
    fn display_order_is_stable_for_equal_keys() {
        let ordered = order_for_display(users(json!([
            {"id": 1, "full_name": "Ali"},
            {"id": 2, "full_name": "ali"},
            {"id": 3, "full_name": "ALI"}
        ])));
        let ids: Vec<String> = ordered.iter().map(|u| u.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn closures_confirm() {
        let yes = |_: &str| true;
        let no = |_: &str| false;
        assert!(yes.confirm("x"));
        assert!(!no.confirm("x"));
    }
}
