// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Once};

use axum::body::Body;
use axum::http::Request;
use pillbox::api::{create_router, AppState};
use pillbox::config::{Config, DatabaseConfig, SearchConfig, ServerConfig, VisionConfig};
use pillbox::db::{Database, LibSqlBackend, PillCatalog};
use pillbox::vision::{TextDetector, VisionProvider};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub const BOUNDARY: &str = "pillbox-integration";

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Server config for router tests. The database section is informational
/// only; tests hand [`app`] an already-open [`Database`].
pub fn test_config(vision_base_url: Option<String>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
            sync_interval_secs: 60,
        },
        vision: VisionConfig {
            model: "google/text-detection".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: vision_base_url,
            timeout_secs: 5,
            ..VisionConfig::default()
        },
        search: SearchConfig { max_limit: 100 },
    }
}

/// On-disk catalog seeded with a handful of pills and imprints.
pub async fn seeded_database() -> (Database, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pillbox.db");
    let config = DatabaseConfig {
        url: format!("file:{}", path.display()),
        auth_token: None,
        local_path: None,
        sync_interval_secs: 60,
    };
    let db = Database::new(&config).await.unwrap();

    let conn = db.connect().unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO pills (id, name, engname, type, efficacy) VALUES
            (42, '타이레놀정500밀리그램', 'Tylenol Tab. 500mg', 'tablet', 'headache, fever'),
            (7, '게보린정', 'Geworin Tab.', 'tablet', 'headache'),
            (9, '판콜에이내복액', 'Pancold A', 'syrup', 'cold');

        INSERT INTO pillocr (id, front, back) VALUES
            (42, 'P10', 'G'),
            (7, 'GWR', '');

        INSERT INTO favorites (userid, pillid) VALUES ('u1', 42), ('u2', 42), ('u1', 7);
        "#,
    )
    .await
    .unwrap();

    (db, dir)
}

pub fn app(config: Config, db: Database) -> axum::Router {
    let vision: Arc<dyn TextDetector> = Arc::new(VisionProvider::new(&config.vision));
    let catalog: Arc<dyn PillCatalog> = Arc::new(LibSqlBackend::new(db));
    create_router(AppState::new(config, catalog, vision))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut output = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut std::io::Cursor::new(&mut output), image::ImageFormat::Png)
        .unwrap();
    output
}

pub fn image_upload(uri: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"image\"; filename=\"pill.png\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use tempfile;
pub use wiremock;
