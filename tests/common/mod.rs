#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use wholphin::JellyfinApi;
use wholphin::models::UserId;

pub const TOKEN: &str = "integration-token";
pub const USER_ID: &str = "user-1";

pub fn movie(index: usize) -> Value {
    json!({
        "Id": format!("movie-{}", index),
        "Name": format!("Movie {:03}", index),
        "SortName": format!("movie {:03}", index),
        "Type": "Movie",
        "ProductionYear": 2000 + (index % 20),
        "RunTimeTicks": 54000000000i64,
        "ImageTags": { "Primary": format!("poster-{}", index) },
        "UserData": {
            "PlaybackPositionTicks": 0,
            "PlayCount": 0,
            "IsFavorite": index % 7 == 0,
            "Played": false
        }
    })
}

pub fn episode(series: &str, season: u32, number: u32) -> Value {
    json!({
        "Id": format!("{}-s{}e{}", series, season, number),
        "Name": format!("Episode {}", number),
        "Type": "Episode",
        "SeriesId": series,
        "SeriesName": "Severance",
        "ParentIndexNumber": season,
        "IndexNumber": number,
        "ImageTags": { "Primary": "still" },
        "SeriesPrimaryImageTag": "series-poster"
    })
}

/// One page of `/Items` with `count` movies starting at `start`.
pub fn items_page(start: usize, count: usize, total: usize) -> String {
    let items: Vec<_> = (start..start + count).map(movie).collect();
    json!({
        "Items": items,
        "TotalRecordCount": total,
        "StartIndex": start
    })
    .to_string()
}

pub fn count_only(total: usize) -> String {
    json!({ "Items": [], "TotalRecordCount": total, "StartIndex": 0 }).to_string()
}

pub fn api(server: &ServerGuard) -> Arc<JellyfinApi> {
    Arc::new(
        JellyfinApi::new(
            &server.url(),
            TOKEN,
            Some(UserId::new(USER_ID)),
            Duration::from_secs(5),
        )
        .unwrap(),
    )
}

/// The zero-limit request the pager sends to learn the list size.
pub async fn mock_probe(server: &mut Server, path: &str, total: usize) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "0".into()),
            Matcher::UrlEncoded("enableTotalRecordCount".into(), "true".into()),
        ]))
        .match_header("X-Emby-Authorization", Matcher::Regex(TOKEN.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(count_only(total))
        .expect(1)
        .create_async()
        .await
}

pub async fn mock_items_page(
    server: &mut Server,
    start: usize,
    limit: usize,
    total: usize,
) -> Mock {
    let count = limit.min(total.saturating_sub(start));
    server
        .mock("GET", "/Items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("startIndex".into(), start.to_string()),
            Matcher::UrlEncoded("limit".into(), limit.to_string()),
            Matcher::UrlEncoded("enableTotalRecordCount".into(), "false".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(items_page(start, count, total))
        .expect(1)
        .create_async()
        .await
}
