use crate::catalog_store::{
    CatalogStore, ContentRef, NewEpisode, NewMovie, NewSeason, NewShow, SqliteCatalogStore,
    WritableCatalogStore,
};
use crate::user::{AnnotationStore, FullUserStore, SqliteUserStore, UserStore};
use std::sync::Arc;

/// In-memory catalog and user stores with terse builders for tests.
pub struct CatalogFixture {
    pub catalog: Arc<SqliteCatalogStore>,
    pub users: Arc<SqliteUserStore>,
}

impl CatalogFixture {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(SqliteCatalogStore::open_in_memory().unwrap()),
            users: Arc::new(SqliteUserStore::open_in_memory().unwrap()),
        }
    }

    pub fn catalog(&self) -> Arc<dyn CatalogStore> {
        self.catalog.clone()
    }

    pub fn users(&self) -> Arc<dyn FullUserStore> {
        self.users.clone()
    }

    pub fn show(&self, title: &str, order: Option<i64>) -> i64 {
        self.catalog
            .insert_show(&NewShow {
                title: title.to_string(),
                order,
                ..Default::default()
            })
            .unwrap()
    }

    pub fn season(&self, show_id: i64, number: i32) -> i64 {
        self.catalog
            .insert_season(&NewSeason {
                show_id,
                number,
                ..Default::default()
            })
            .unwrap()
    }

    pub fn episode(&self, season_id: i64, number: Option<i32>, title: &str) -> i64 {
        self.catalog
            .insert_episode(&NewEpisode {
                season_id,
                title: title.to_string(),
                episode_number: number,
                ..Default::default()
            })
            .unwrap()
    }

    /// Episodes numbered 1..=count.
    pub fn episodes(&self, season_id: i64, count: i32) -> Vec<i64> {
        (1..=count)
            .map(|n| self.episode(season_id, Some(n), &format!("Episode {}", n)))
            .collect()
    }

    pub fn movie(&self, title: &str, order: Option<i64>) -> i64 {
        self.catalog
            .insert_movie(&NewMovie {
                title: title.to_string(),
                order,
                ..Default::default()
            })
            .unwrap()
    }

    pub fn user(&self, handle: &str) -> i64 {
        self.users.create_user(handle).unwrap()
    }

    pub fn rate(&self, user_id: i64, target: ContentRef, value: f64) {
        self.users
            .upsert_annotations(user_id, target, None, Some(value))
            .unwrap();
    }

    pub fn note(&self, user_id: i64, target: ContentRef, content: &str) {
        self.users
            .upsert_annotations(user_id, target, Some(content), None)
            .unwrap();
    }
}
