#![allow(dead_code)]

// cargo test -p festival-coordination-backend --test api
use std::path::Path;

use bytes::Bytes;
use festival_coordination_backend::fixtures::Fixtures;
use festival_coordination_backend::FestivalState;
use festival_coordination_config::Config;
use festival_coordination_database::{get_database_connection, Gateway};
use http::{Method, Request, Response};
use http_body_util::{BodyExt as _, Full};

pub const EVENTS: &str = r#"[
    {"event": "Ganesh Sthapana", "date": "27th August", "contact": "Asha 9876543210"},
    {"event": "Rangoli Competition", "date": "29th August"}
]"#;

pub const FLATS: &str = r#"{"flats": ["A101", "A102", "B201", "B202", "C301"]}"#;

pub const AARTI: &str = r#"[
    {"date": "27th August", "time": "Morning"},
    {"date": "27th August", "time": "Evening"}
]"#;

pub async fn write_fixtures(dir: &Path) {
    tokio::fs::write(dir.join("events.json"), EVENTS).await.unwrap();
    tokio::fs::write(dir.join("flats.json"), FLATS).await.unwrap();
    tokio::fs::write(dir.join("aarti.json"), AARTI).await.unwrap();
}

/// State over real fixtures and a pool that never gets to connect, enough
/// for every request that is answered before touching the database.
pub async fn state(root: &Path, admin_token: Option<&str>) -> FestivalState {
    let fixtures_dir = root.join("data");
    tokio::fs::create_dir_all(&fixtures_dir).await.unwrap();
    write_fixtures(&fixtures_dir).await;
    let fixtures = Fixtures::load(&fixtures_dir).await.unwrap();

    let config = Config {
        listen: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://festival@127.0.0.1:1/festival".to_owned(),
        fixtures_dir,
        public_dir: root.to_path_buf(),
        admin_token: admin_token.map(str::to_owned),
        pusher: None,
    };
    let pool = get_database_connection(&config.database_url).unwrap();
    FestivalState::new(config, fixtures, Gateway::new(pool))
}

pub fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::from(body.to_owned())))
        .unwrap()
}

pub async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
