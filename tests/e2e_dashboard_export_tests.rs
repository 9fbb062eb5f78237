//! End-to-end tests for the dashboard, the notes export and watch statistics

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::Value;

async fn dashboard(client: &TestClient, filter: Option<&str>) -> Vec<Value> {
    let response = client.get_dashboard(filter).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    body.as_array().unwrap().clone()
}

fn titles(items: &[Value]) -> Vec<&str> {
    items
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_dashboard_merges_shows_and_movies_by_order() {
    let server = TestServer::spawn().await;
    let client = TestClient::as_user(server.base_url.clone());

    let items = dashboard(&client, None).await;
    assert_eq!(titles(&items), vec!["Arrival", "The Expanse", "Dune", "Andor"]);
    let kinds: Vec<&str> = items.iter().map(|i| i["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["movie", "show", "movie", "show"]);

    let expanse = &items[1];
    let seasons = expanse["seasons"].as_array().unwrap();
    assert_eq!(seasons.len(), 2);
    assert_eq!(seasons[0]["number"], 1);
    assert_eq!(seasons[0]["display_artwork_url"], "expanse.jpg");
    assert_eq!(seasons[0]["episodes"].as_array().unwrap().len(), 3);
    assert!(items[3]["seasons"][0]["display_artwork_url"].is_null());

    assert_eq!(dashboard(&client, Some("all")).await, items);
}

#[tokio::test]
async fn test_dashboard_unwatched_filter() {
    let server = TestServer::spawn().await;
    let client = TestClient::as_user(server.base_url.clone());

    client.set_watched("season", EXPANSE_S1_ID, true).await;
    client
        .set_watched("episode", EXPANSE_S2_EPISODE_IDS[0], true)
        .await;
    client.set_watched("show", ANDOR_SHOW_ID, true).await;
    client.set_watched("movie", ARRIVAL_MOVIE_ID, true).await;

    let items = dashboard(&client, Some("unwatched")).await;
    assert_eq!(titles(&items), vec!["The Expanse", "Dune"]);

    let seasons = items[0]["seasons"].as_array().unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0]["id"], EXPANSE_S2_ID);
    assert_eq!(seasons[0]["watched"], false);
    let episodes: Vec<i64> = seasons[0]["episodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(episodes, vec![EXPANSE_S2_EPISODE_IDS[1]]);

    let response = client.get_dashboard(Some("finished")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notes_export_markdown() {
    let server = TestServer::spawn().await;
    let alice = TestClient::as_user(server.base_url.clone());

    alice.note("show", ANDOR_SHOW_ID, "  gripping  ").await;
    alice
        .note("episode", EXPANSE_S2_EPISODE_IDS[1], "Doors!")
        .await;
    alice.note("movie", DUNE_MOVIE_ID, "spice").await;
    alice.note("season", EXPANSE_S1_ID, "   ").await;
    // ratings alone never show up in the export
    alice.rate("movie", ARRIVAL_MOVIE_ID, 9.0).await;

    let response = alice.export_notes(None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/markdown"));
    assert_eq!(
        response.text().await.unwrap(),
        "# The Expanse\n\n\
         ## Season 2\n\n\
         ### Episode 2: Doors & Corners\n\n\
         Doors!\n\n\
         # Dune\n\n\
         spice\n\n\
         # Andor\n\n\
         gripping\n\n"
    );

    let bob = TestClient::as_other_user(server.base_url.clone());
    let response = bob.export_notes(Some("markdown")).await;
    assert_eq!(response.text().await.unwrap(), "");
}

#[tokio::test]
async fn test_notes_export_json() {
    let server = TestServer::spawn().await;
    let alice = TestClient::as_user(server.base_url.clone());

    alice
        .note("episode", EXPANSE_S1_EPISODE_IDS[0], "pilot")
        .await;
    alice.note("movie", ARRIVAL_MOVIE_ID, "heptapods").await;

    let response = alice.export_notes(Some("json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"], TEST_USER);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "movie");
    assert_eq!(entries[0]["note"], "heptapods");
    assert_eq!(entries[1]["kind"], "show");
    assert!(entries[1]["note"].is_null());
    assert_eq!(entries[1]["seasons"][0]["number"], 1);
    assert_eq!(entries[1]["seasons"][0]["episodes"][0]["title"], "Dulcinea");

    let response = alice.export_notes(Some("pdf")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watch_stats() {
    let server = TestServer::spawn().await;
    let alice = TestClient::as_user(server.base_url.clone());
    let bob = TestClient::as_other_user(server.base_url.clone());

    alice.set_watched("season", EXPANSE_S1_ID, true).await;
    alice.set_watched("movie", ARRIVAL_MOVIE_ID, true).await;
    alice.rate("episode", EXPANSE_S1_EPISODE_IDS[0], 8.0).await;
    alice.rate("movie", ARRIVAL_MOVIE_ID, 6.0).await;
    bob.rate("episode", EXPANSE_S1_EPISODE_IDS[0], 4.0).await;

    let stats: Value = alice.get_stats(None, false).await.json().await.unwrap();
    assert_eq!(stats["total_episodes"], 7);
    assert_eq!(stats["watched_episodes"], 3);
    assert_eq!(stats["total_movies"], 2);
    assert_eq!(stats["watched_movies"], 1);
    assert_eq!(stats["progress_percent"], 44);
    assert_eq!(stats["average_rating"], 7.0);
    assert_eq!(stats["rating_distribution"].as_array().unwrap().len(), 2);

    let everyone: Value = alice.get_stats(None, true).await.json().await.unwrap();
    assert_eq!(everyone["average_rating"], 6.0);
    assert_eq!(everyone["rating_distribution"][0]["rating"], 4.0);

    let series: Value = alice
        .get_stats(Some("series"), false)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(series["total_movies"], 0);
    assert_eq!(series["progress_percent"], 43);

    let movies: Value = alice
        .get_stats(Some("movies"), false)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(movies["total_episodes"], 0);
    assert_eq!(movies["progress_percent"], 50);

    let andor: Value = alice
        .get_stats(Some(&format!("show:{}", ANDOR_SHOW_ID)), false)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(andor["total_episodes"], 2);
    assert_eq!(andor["progress_percent"], 0);
    assert!(andor["average_rating"].is_null());

    let response = alice.get_stats(Some("show:99"), false).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = alice.get_stats(Some("books"), false).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_content_listing_options() {
    let server = TestServer::spawn().await;
    let client = TestClient::as_user(server.base_url.clone());

    let response = client
        .list_content(&[("kind", "movie"), ("sort", "title")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(titles(&items), vec!["Arrival", "Dune"]);

    let response = client.list_content(&[("search", "the EX")]).await;
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(titles(&items), vec!["The Expanse"]);

    let response = client.list_content(&[("kind", "episode")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_selected_export_and_summary() {
    let server = TestServer::spawn().await;
    let alice = TestClient::as_user(server.base_url.clone());
    let bob = TestClient::as_other_user(server.base_url.clone());

    alice
        .note("episode", EXPANSE_S2_EPISODE_IDS[1], "Doors and corners")
        .await;
    alice.note("season", EXPANSE_S1_ID, "Slow burn").await;
    bob.note("episode", EXPANSE_S2_EPISODE_IDS[0], "Bob's take").await;
    alice.note("movie", DUNE_MOVIE_ID, "Spice").await;

    let response = alice.export_selected(&[("season", EXPANSE_S2_ID)], false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let notes = body["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "The Expanse S2: Doors & Corners");
    assert_eq!(notes[0]["user"], TEST_USER);

    let response = alice.export_selected(&[("show", EXPANSE_SHOW_ID)], true).await;
    let body: Value = response.json().await.unwrap();
    let users: Vec<&str> = body["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["user"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec![TEST_USER, OTHER_USER, TEST_USER]);

    let response = alice.get_export_summary(false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "The Expanse");
    assert_eq!(items[0]["note_count"], 2);
    assert_eq!(items[0]["episodes"]["noted"], 1);
    assert_eq!(items[0]["episodes"]["total"], 5);
    assert_eq!(items[1]["title"], "Dune");
    assert!(items[1].get("episodes").is_none());

    let body: Value = alice.get_export_summary(true).await.json().await.unwrap();
    assert_eq!(body["items"][0]["note_count"], 3);
    assert_eq!(body["items"][0]["episodes"]["noted"], 2);
}

#[tokio::test]
async fn test_profile_summary() {
    let server = TestServer::spawn().await;
    let client = TestClient::as_user(server.base_url.clone());

    client.set_watched("season", EXPANSE_S1_ID, true).await;
    client.set_watched("movie", ARRIVAL_MOVIE_ID, true).await;
    client.rate("movie", ARRIVAL_MOVIE_ID, 9.5).await;
    client.rate("episode", EXPANSE_S1_EPISODE_IDS[0], 7.0).await;
    client.note("show", ANDOR_SHOW_ID, "Rebellions are built on hope").await;
    TestClient::as_other_user(server.base_url.clone())
        .rate("movie", DUNE_MOVIE_ID, 3.0)
        .await;

    let response = client.get_profile().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"], TEST_USER);
    assert_eq!(body["watched"], 4);
    assert_eq!(body["total_watchable"], 9);
    assert_eq!(body["total_annotatable"], 14);
    assert_eq!(body["rated"], 2);
    assert_eq!(body["noted"], 1);
    assert_eq!(body["average_rating"], 8.25);
    assert_eq!(body["favorites"][0]["title"], "Arrival");
    assert_eq!(body["favorites"][1]["title"], "The Expanse S1: Dulcinea");
    assert_eq!(body["recent_notes"][0]["excerpt"], "Rebellions are built on hope");

    let response = TestClient::anonymous(server.base_url.clone())
        .get_profile()
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

