//! Public listings: what a visitor sees without signing in.

use std::io::Write;

use labsite_client::{ListStore, SiteConfig, SupabaseClient};
use labsite_core::FilterState;

use super::render;

async fn load(config: &SiteConfig) -> ListStore {
    let client = SupabaseClient::new(&config.supabase);
    let mut store = ListStore::new(config.tables.clone());
    store.load(&client).await;
    store
}

/// Print news posts.
pub async fn news(config: &SiteConfig) -> labsite_client::Result<()> {
    let store = load(config).await;
    render::posts(&mut std::io::stdout().lock(), store.posts())?;
    Ok(())
}

/// Print members matching `filter`.
pub async fn members(config: &SiteConfig, filter: &FilterState) -> labsite_client::Result<()> {
    let store = load(config).await;
    let mut out = std::io::stdout().lock();
    tracing::debug!(?filter, "Filtering members");
    render::members(&mut out, &store.filtered_members(filter))?;
    out.flush()?;
    Ok(())
}

/// Print the tag universe offered by the member filter.
pub async fn tags(config: &SiteConfig) -> labsite_client::Result<()> {
    let store = load(config).await;
    render::tags(&mut std::io::stdout().lock(), &store.tag_universe())?;
    Ok(())
}
