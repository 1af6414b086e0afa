//! In-memory copy of the two remote collections.
//!
//! The store is loaded once per invocation and replaced wholesale after each
//! successful create or delete. A failed read never becomes an error: the
//! affected collection keeps what it had (empty on first load) and the
//! failure is logged.

use labsite_core::{FilterState, Member, Post, filter_members, tag_universe};
use tracing::{debug, warn};

use crate::gateway::{Order, RemoteGateway, Table, Tables};

/// Posts and members as last read from the backend.
#[derive(Debug, Clone)]
pub struct ListStore {
    tables: Tables,
    posts: Vec<Post>,
    members: Vec<Member>,
    loading: bool,
}

impl ListStore {
    /// An empty store that has not loaded yet.
    #[must_use]
    pub const fn new(tables: Tables) -> Self {
        Self {
            tables,
            posts: Vec::new(),
            members: Vec::new(),
            loading: true,
        }
    }

    /// Initial load.
    pub async fn load<G: RemoteGateway>(&mut self, gateway: &G) {
        self.refetch(gateway).await;
    }

    /// Re-read both collections.
    ///
    /// Posts are ordered by date, newest first; members by id.
    pub async fn refetch<G: RemoteGateway>(&mut self, gateway: &G) {
        self.loading = true;

        let posts_table = self.tables.name(Table::Posts);
        match gateway
            .select::<Post>(posts_table, Order::descending("date"))
            .await
        {
            Ok(posts) => {
                debug!(count = posts.len(), "Loaded posts");
                self.posts = posts;
            }
            Err(e) => warn!(table = posts_table, error = %e, "Failed to load posts"),
        }

        let members_table = self.tables.name(Table::Members);
        match gateway
            .select::<Member>(members_table, Order::ascending("id"))
            .await
        {
            Ok(members) => {
                debug!(count = members.len(), "Loaded members");
                self.members = members;
            }
            Err(e) => warn!(table = members_table, error = %e, "Failed to load members"),
        }

        self.loading = false;
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Members matching `filter`, in store order.
    #[must_use]
    pub fn filtered_members(&self, filter: &FilterState) -> Vec<&Member> {
        filter_members(&self.members, filter)
    }

    /// `"All"` followed by every distinct tag.
    #[must_use]
    pub fn tag_universe(&self) -> Vec<String> {
        tag_universe(&self.members)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use labsite_core::Selection;
    use serde_json::json;

    use super::*;
    use crate::gateway::fake::{Call, FakeGateway};

    fn seeded() -> FakeGateway {
        let gateway = FakeGateway::new();
        gateway.seed(
            "news",
            vec![
                json!({"id": 1, "title": "Old", "category": "News", "date": "2024-03-01",
                       "author": "BVI Lab", "description": "", "image_url": null}),
                json!({"id": 2, "title": "New", "category": "Award", "date": "2025-01-10",
                       "author": null, "description": null, "image_url": "https://x/y.png"}),
            ],
        );
        gateway.seed(
            "members",
            vec![
                json!({"id": 7, "name": "Lee", "role": "MS", "status": "completed",
                       "tags": "Vision", "image_url": null}),
                json!({"id": 3, "name": "Kim", "role": "PhD", "status": "in progress",
                       "tags": "AI, Web3", "image_url": null}),
            ],
        );
        gateway
    }

    #[tokio::test]
    async fn test_load_orders_collections() {
        let gateway = seeded();
        let mut store = ListStore::new(Tables::default());
        assert!(store.is_loading());

        store.load(&gateway).await;

        assert!(!store.is_loading());
        let titles: Vec<_> = store.posts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
        let names: Vec<_> = store.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Kim", "Lee"]);
        assert_eq!(store.posts()[0].author, "");
        assert_eq!(
            gateway.calls(),
            vec![
                Call::Select("news".to_string()),
                Call::Select("members".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_post_with_null_date_does_not_hide_others() {
        let gateway = seeded();
        let mut rows = gateway.rows("news");
        rows.push(json!({"id": 9, "title": "Undated", "category": "News", "date": null}));
        gateway.seed("news", rows);
        let mut store = ListStore::new(Tables::default());

        store.load(&gateway).await;

        let titles: Vec<_> = store.posts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Undated", "New", "Old"]);
        assert_eq!(store.posts()[0].date, "");
    }

    #[test]
    fn test_new_store_is_loading() {
        let store = ListStore::new(Tables::default());
        assert!(store.is_loading());
        assert!(store.posts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_first_load_is_empty() {
        let gateway = seeded();
        gateway.fail_select(true);
        let mut store = ListStore::new(Tables::default());

        store.load(&gateway).await;

        assert!(!store.is_loading());
        assert!(store.posts().is_empty());
        assert!(store.members().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_values() {
        let gateway = seeded();
        let mut store = ListStore::new(Tables::default());
        store.load(&gateway).await;

        gateway.fail_select(true);
        store.refetch(&gateway).await;

        assert!(!store.is_loading());
        assert_eq!(store.posts().len(), 2);
        assert_eq!(store.members().len(), 2);
    }

    #[tokio::test]
    async fn test_filtered_members_and_tags() {
        let gateway = seeded();
        let mut store = ListStore::new(Tables::default());
        store.load(&gateway).await;

        let filter = FilterState {
            tag: Selection::Only("Web3".to_string()),
            ..FilterState::default()
        };
        let hits: Vec<_> = store
            .filtered_members(&filter)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Kim"]);
        assert_eq!(store.tag_universe(), vec!["All", "AI", "Vision", "Web3"]);
    }

    #[tokio::test]
    async fn test_custom_table_names() {
        let gateway = FakeGateway::new();
        let mut store = ListStore::new(Tables {
            posts: "lab_news".to_string(),
            members: "lab_members".to_string(),
        });
        store.load(&gateway).await;
        assert_eq!(
            gateway.calls(),
            vec![
                Call::Select("lab_news".to_string()),
                Call::Select("lab_members".to_string())
            ]
        );
    }
}
