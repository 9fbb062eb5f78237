//! Test fixture creation
//!
//! Builds a temporary db directory with a small catalog and two users.

use super::constants::*;
use anyhow::{ensure, Result};
use std::path::PathBuf;
use tempfile::TempDir;
use watchlog_server::catalog_store::{
    NewEpisode, NewMovie, NewSeason, NewShow, SqliteCatalogStore, WritableCatalogStore,
};
use watchlog_server::user::{SqliteUserStore, UserStore};

/// Returns the temp dir (keep it alive) and its path.
pub fn create_test_db_dir() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().to_path_buf();

    let users = SqliteUserStore::new(path.join("user.db"))?;
    users.create_user(TEST_USER)?;
    users.create_user(OTHER_USER)?;

    let catalog = SqliteCatalogStore::new(path.join("catalog.db"))?;
    populate_catalog(&catalog)?;

    Ok((temp_dir, path))
}

fn show(catalog: &SqliteCatalogStore, title: &str, order: i64, artwork: Option<&str>) -> Result<i64> {
    catalog.insert_show(&NewShow {
        title: title.to_string(),
        order: Some(order),
        artwork_url: artwork.map(str::to_string),
        ..Default::default()
    })
}

fn season(catalog: &SqliteCatalogStore, show_id: i64, number: i32, titles: &[&str]) -> Result<(i64, Vec<i64>)> {
    let season_id = catalog.insert_season(&NewSeason {
        show_id,
        number,
        ..Default::default()
    })?;
    let mut episode_ids = Vec::new();
    for (idx, title) in titles.iter().enumerate() {
        episode_ids.push(catalog.insert_episode(&NewEpisode {
            season_id,
            title: title.to_string(),
            episode_number: Some(idx as i32 + 1),
            ..Default::default()
        })?);
    }
    Ok((season_id, episode_ids))
}

fn movie(catalog: &SqliteCatalogStore, title: &str, order: i64) -> Result<i64> {
    catalog.insert_movie(&NewMovie {
        title: title.to_string(),
        order: Some(order),
        ..Default::default()
    })
}

fn populate_catalog(catalog: &SqliteCatalogStore) -> Result<()> {
    let expanse = show(catalog, "The Expanse", 2, Some("expanse.jpg"))?;
    let andor = show(catalog, "Andor", 4, None)?;
    ensure!(expanse == EXPANSE_SHOW_ID && andor == ANDOR_SHOW_ID);

    let (s1, s1_episodes) = season(
        catalog,
        expanse,
        1,
        &["Dulcinea", "The Big Empty", "Remember the Cant"],
    )?;
    let (s2, s2_episodes) = season(catalog, expanse, 2, &["Safe", "Doors & Corners"])?;
    let (andor_s1, andor_episodes) = season(catalog, andor, 1, &["Kassa", "That Would Be Me"])?;
    ensure!(s1 == EXPANSE_S1_ID && s2 == EXPANSE_S2_ID && andor_s1 == ANDOR_S1_ID);
    ensure!(s1_episodes == EXPANSE_S1_EPISODE_IDS);
    ensure!(s2_episodes == EXPANSE_S2_EPISODE_IDS);
    ensure!(andor_episodes == ANDOR_S1_EPISODE_IDS);

    let arrival = movie(catalog, "Arrival", 1)?;
    let dune = movie(catalog, "Dune", 3)?;
    ensure!(arrival == ARRIVAL_MOVIE_ID && dune == DUNE_MOVIE_ID);

    Ok(())
}
