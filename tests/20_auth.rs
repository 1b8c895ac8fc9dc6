mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};

use ems_api::auth::{generate_jwt, hash_password, Claims};
use ems_api::database::repository;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = common::spawn_app(common::unreachable_db()).await?;
    let client = reqwest::Client::new();

    for path in ["/api/employees", "/api/employees/1", "/api/employees/search?q=a", "/api/employee/1/documents"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");

        let body = res.json::<Value>().await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_rejected() -> Result<()> {
    let server = common::spawn_app(common::unreachable_db()).await?;
    let client = reqwest::Client::new();

    let mut other = server.config.security.clone();
    other.jwt_secret = "someone-else".to_string();
    let foreign = generate_jwt(&Claims::new(1, "x".into(), 1, None, 1), &other)?;
    let foreign_header = format!("Bearer {foreign}");

    for header in ["Bearer not-a-jwt", "Basic dXNlcjpwYXNz", foreign_header.as_str()] {
        let res = client
            .get(server.url("/api/employees"))
            .header("Authorization", header)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
    Ok(())
}

#[tokio::test]
async fn expired_tokens_are_rejected() -> Result<()> {
    let server = common::spawn_app(common::unreachable_db()).await?;

    let now = Utc::now().timestamp();
    let claims = Claims {
        hr_id: 1,
        hr_name: "Expired".to_string(),
        region_id: 1,
        country_id: None,
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = generate_jwt(&claims, &server.config.security)?;

    let res = reqwest::Client::new()
        .get(server.url("/api/employees"))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_requires_username_and_password() -> Result<()> {
    let server = common::spawn_app(common::unreachable_db()).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/login"))
        .json(&json!({ "password": "secret" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"].get("username").is_some());

    let res = client
        .post(server.url("/api/login"))
        .json(&json!({ "username": "priya" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_round_trip_against_database() -> Result<()> {
    let Some(db) = common::test_db().await? else {
        return Ok(());
    };
    let fx = common::seed(&db).await?;
    let server = common::spawn_app(db.clone()).await?;
    let client = reqwest::Client::new();

    let username = format!("hr-{}", uuid::Uuid::new_v4().simple());
    let hash = hash_password("correct horse")?;
    repository::insert_operator(db.pool(), &username, "Test HR", &hash, fx.region_id, None).await?;

    // Wrong password and unknown user look the same
    for (user, password) in [(username.as_str(), "wrong"), ("nobody-here", "correct horse")] {
        let res = client
            .post(server.url("/api/login"))
            .json(&json!({ "username": user, "password": password }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.json::<Value>().await?["error"], "Invalid credentials");
    }

    let res = client
        .post(server.url("/api/login"))
        .json(&json!({ "username": username, "password": "correct horse" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["hr"]["region_id"], fx.region_id);
    assert!(body["data"]["hr"].get("password_hash").is_none());
    let token = body["data"]["token"].as_str().unwrap_or_default().to_string();

    // The issued token opens the protected API
    let res = client.get(server.url("/api/employees")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Deactivated operators are refused after the password check
    repository::set_operator_active(db.pool(), &username, false).await?;
    let res = client
        .post(server.url("/api/login"))
        .json(&json!({ "username": username, "password": "correct horse" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await?["error"], "HR is inactive");
    Ok(())
}
