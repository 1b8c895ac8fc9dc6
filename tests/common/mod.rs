#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use ems_api::auth::{generate_jwt, Claims};
use ems_api::config::AppConfig;
use ems_api::database::Database;
use ems_api::{app, AppState};

pub const TEST_SECRET: &str = "ems-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub config: AppConfig,
    pub db: Database,
    pub uploads: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer token for an operator of `region_id`
    pub fn token(&self, hr_id: i32, region_id: i32) -> String {
        let claims = Claims::new(hr_id, format!("operator-{hr_id}"), region_id, None, 1);
        generate_jwt(&claims, &self.config.security).expect("failed to sign test token")
    }
}

/// Serve the router in-process on a free port. Uploaded files land in a
/// temporary directory owned by the returned server.
pub async fn spawn_app(db: Database) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let uploads = tempfile::tempdir().context("failed to create upload dir")?;

    let mut config = AppConfig::development();
    config.api.port = port;
    config.api.enable_request_logging = false;
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.storage.upload_dir = uploads.path().to_string_lossy().into_owned();
    config.storage.public_base_url = base_url.clone();
    config.storage.max_upload_bytes = 64 * 1024;

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    let router = app(AppState::new(config.clone(), db.clone()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url,
        config,
        db,
        uploads,
    };
    wait_ready(&server, Duration::from_secs(5)).await?;
    Ok(server)
}

async fn wait_ready(server: &TestServer, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if let Ok(resp) = client.get(server.url("/")).send().await {
            if resp.status() == StatusCode::OK {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", server.base_url, timeout)
}

/// A pool that never reaches a server; enough for routing and auth tests.
pub fn unreachable_db() -> Database {
    let mut config = AppConfig::development().database;
    config.url = "postgres://ems@127.0.0.1:1/ems_unreachable".to_string();
    config.connection_timeout = 2;
    Database::connect_lazy(&config).expect("lazy pool")
}

/// Migrated database from `EMS_TEST_DATABASE_URL`, or None to skip.
pub async fn test_db() -> Result<Option<Database>> {
    let Ok(url) = std::env::var("EMS_TEST_DATABASE_URL") else {
        eprintln!("EMS_TEST_DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let mut config = AppConfig::development().database;
    config.url = url;
    config.max_connections = 5;
    let db = Database::connect(&config).await?;
    db.migrate().await?;
    Ok(Some(db))
}

/// Reference rows for one test. Names carry a random suffix so tests can
/// share a database.
pub struct Fixture {
    pub region_id: i32,
    pub other_region_id: i32,
    pub location_id: i32,
    pub other_location_id: i32,
    pub company_id: i32,
    pub department_id: i32,
    pub designation_id: i32,
}

pub async fn seed(db: &Database) -> Result<Fixture> {
    let pool = db.pool();
    let tag = uuid::Uuid::new_v4().simple().to_string();

    let country_id: i32 = sqlx::query_scalar("INSERT INTO country (country_name) VALUES ($1) RETURNING country_id")
        .bind(format!("Country {tag}"))
        .fetch_one(pool)
        .await?;

    let mut regions = Vec::new();
    for name in ["North", "South"] {
        let region_id: i32 =
            sqlx::query_scalar("INSERT INTO region (region_name, country_id) VALUES ($1, $2) RETURNING region_id")
                .bind(format!("{name} {tag}"))
                .bind(country_id)
                .fetch_one(pool)
                .await?;
        regions.push(region_id);
    }

    let mut locations = Vec::new();
    for (city, region_id) in [("Pune", regions[0]), ("Chennai", regions[1])] {
        let location_id: i32 =
            sqlx::query_scalar("INSERT INTO location (city, region_id) VALUES ($1, $2) RETURNING location_id")
                .bind(format!("{city} {tag}"))
                .bind(region_id)
                .fetch_one(pool)
                .await?;
        locations.push(location_id);
    }

    let company_id: i32 = sqlx::query_scalar("INSERT INTO company (company_name) VALUES ($1) RETURNING company_id")
        .bind(format!("Acme {tag}"))
        .fetch_one(pool)
        .await?;
    let department_id: i32 =
        sqlx::query_scalar("INSERT INTO department (department_name) VALUES ($1) RETURNING department_id")
            .bind(format!("Engineering {tag}"))
            .fetch_one(pool)
            .await?;
    let designation_id: i32 =
        sqlx::query_scalar("INSERT INTO designation (designation_name) VALUES ($1) RETURNING designation_id")
            .bind(format!("Engineer {tag}"))
            .fetch_one(pool)
            .await?;

    Ok(Fixture {
        region_id: regions[0],
        other_region_id: regions[1],
        location_id: locations[0],
        other_location_id: locations[1],
        company_id,
        department_id,
        designation_id,
    })
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}.{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Minimal valid create/update body in the fixture's primary region
pub fn employee_body(fx: &Fixture, email: &str) -> Value {
    json!({
        "first_name": "Asha",
        "last_name": "Rao",
        "email": email,
        "company_id": fx.company_id,
        "location_id": fx.location_id,
        "department_id": fx.department_id,
        "designation_id": fx.designation_id,
        "employment_type": "FULL_TIME",
        "joining_date": "2023-05-01",
    })
}

pub async fn history_count(db: &Database, employee_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM employee_salary_history WHERE employee_id = $1")
        .bind(employee_id)
        .fetch_one(db.pool())
        .await?;
    Ok(count)
}
