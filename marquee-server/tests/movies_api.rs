use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use marquee_core::{FinalizeOptions, MovieRecord, RecordStore, SnapshotRepository};
use marquee_server::{AppState, Config, create_app};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

fn app_for(dir: &TempDir) -> Router {
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    create_app(AppState::new(config))
}

fn seed(dir: &TempDir, day: u32, records: Vec<MovieRecord>) {
    let date = NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
    let snapshot = RecordStore::from(records).finalize(date, &FinalizeOptions::default());
    SnapshotRepository::new(dir.path()).save(&snapshot).unwrap();
}

fn todays_listing() -> Vec<MovieRecord> {
    vec![
        MovieRecord::new("Twisters", "Action, Adventure", "PG-13", Some(122)),
        MovieRecord::new("Longlegs", "Horror", "R", Some(101)),
        MovieRecord::new("Deadpool & Wolverine", "Action, Comedy", "R", Some(127)),
        MovieRecord::new("Inside Out 2", "Animation", "PG", None),
    ]
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

#[tokio::test]
async fn reads_answer_404_without_a_snapshot() {
    let dir = TempDir::new().unwrap();

    for uri in ["/movies/all", "/movies?rating=R", "/movies/ratings", "/movies/stats"] {
        let (status, body) = get(app_for(&dir), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"]["status"], 404);
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("No movie_output snapshot"),
            "{uri}: {body}"
        );
    }
}

#[tokio::test]
async fn list_all_returns_newest_snapshot_sorted() {
    let dir = TempDir::new().unwrap();
    seed(
        &dir,
        17,
        vec![MovieRecord::new("Yesterday", "Drama", "G", Some(90))],
    );
    seed(&dir, 18, todays_listing());

    let (status, body) = get(app_for(&dir), "/movies/all").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["Deadpool & Wolverine", "Inside Out 2", "Longlegs", "Twisters"]
    );

    assert_eq!(
        body[0],
        json!({
            "name": "Deadpool & Wolverine",
            "category": "Action, Comedy",
            "rating": "R",
            "length": 127,
        })
    );
    assert_eq!(body[1]["length"], Value::Null);
}

#[tokio::test]
async fn rating_filter_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    seed(&dir, 18, todays_listing());

    let (status, body) = get(app_for(&dir), "/movies?rating=r").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Deadpool & Wolverine", "Longlegs"]);

    let (status, body) = get(app_for(&dir), "/movies?rating=NC-17").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, all) = get(app_for(&dir), "/movies").await;
    assert_eq!(all.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn ratings_are_distinct_and_sorted() {
    let dir = TempDir::new().unwrap();
    seed(&dir, 18, todays_listing());

    let (status, body) = get(app_for(&dir), "/movies/ratings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["PG", "PG-13", "R"]));
}

#[tokio::test]
async fn stats_reports_average_and_modal_rating() {
    let dir = TempDir::new().unwrap();
    seed(&dir, 18, todays_listing());

    let (status, body) = get(app_for(&dir), "/movies/stats").await;
    assert_eq!(status, StatusCode::OK);
    // (122 + 101 + 127) / 3 = 116.67
    assert_eq!(body["average_length"], 117);
    assert_eq!(body["modal_ratings"], json!(["R"]));
    assert_eq!(body["modal_count"], 2);
    assert_eq!(body["total_records"], 4);
    assert_eq!(body["measured_records"], 3);
    assert_eq!(
        body["text"],
        "The average length of all movies is 117 minutes. 2 movies have the rating of R which is the most common rating."
    );
}

#[tokio::test]
async fn liveness_routes_respond() {
    let dir = TempDir::new().unwrap();

    let (status, body) = get(app_for(&dir), "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("pong".into()));

    let (status, body) = get(app_for(&dir), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
