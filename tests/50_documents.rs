mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn document_form(document_type: &str, file_name: &str, bytes: &[u8]) -> Form {
    Form::new()
        .text("document_type", document_type.to_string())
        .part("file", Part::bytes(bytes.to_vec()).file_name(file_name.to_string()))
}

async fn new_employee(server: &common::TestServer, fx: &common::Fixture, token: &str) -> Result<i64> {
    let res = reqwest::Client::new()
        .post(server.url("/api/employees"))
        .bearer_auth(token)
        .json(&common::employee_body(fx, &common::unique_email("docs")))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<Value>().await?["data"]["employee_id"].as_i64().unwrap_or_default())
}

#[tokio::test]
async fn second_profile_photo_is_rejected() -> Result<()> {
    let Some(db) = common::test_db().await? else {
        return Ok(());
    };
    let fx = common::seed(&db).await?;
    let server = common::spawn_app(db.clone()).await?;
    let token = server.token(1, fx.region_id);
    let client = reqwest::Client::new();
    let id = new_employee(&server, &fx, &token).await?;

    let res = client
        .post(server.url(&format!("/api/employee/{id}/document")))
        .bearer_auth(&token)
        .multipart(document_form("PROFILE_PHOTO", "me.png", b"\x89PNG first"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let uploaded = res.json::<Value>().await?["data"].clone();
    let file_url = uploaded["file_url"].as_str().unwrap_or_default().to_string();
    assert!(file_url.starts_with(&format!("{}/uploads/", server.base_url)));
    assert_eq!(uploaded["file_sha256"].as_str().map(str::len), Some(64));

    // The stored file is served back
    let served = reqwest::get(&file_url).await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), b"\x89PNG first");

    // Second photo through either endpoint
    let res = client
        .post(server.url(&format!("/api/employee/{id}/document")))
        .bearer_auth(&token)
        .multipart(document_form("PROFILE_PHOTO", "again.png", b"\x89PNG second"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(
        res.json::<Value>().await?["error"],
        "Profile photo already uploaded. Please delete it first to upload a new one."
    );

    let image = Form::new().part("image", Part::bytes(b"\x89PNG third".to_vec()).file_name("third.png"));
    let res = client
        .post(server.url(&format!("/api/employee/{id}/image")))
        .bearer_auth(&token)
        .multipart(image)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The photo shows up as the employee's image
    let res = client
        .get(server.url(&format!("/api/employees/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["data"]["image_url"], json!(file_url));
    Ok(())
}

#[tokio::test]
async fn one_identity_document_until_deleted() -> Result<()> {
    let Some(db) = common::test_db().await? else {
        return Ok(());
    };
    let fx = common::seed(&db).await?;
    let server = common::spawn_app(db.clone()).await?;
    let token = server.token(1, fx.region_id);
    let client = reqwest::Client::new();
    let id = new_employee(&server, &fx, &token).await?;
    let upload_url = server.url(&format!("/api/employee/{id}/document"));

    let res = client
        .post(&upload_url)
        .bearer_auth(&token)
        .multipart(document_form("AADHAAR", "aadhaar.pdf", b"%PDF aadhaar"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = res.json::<Value>().await?["data"].clone();

    let res = client
        .post(&upload_url)
        .bearer_auth(&token)
        .multipart(document_form("PASSPORT", "passport.pdf", b"%PDF passport"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(
        res.json::<Value>().await?["error"],
        "You have already uploaded AADHAAR. Please delete it first to upload a different document."
    );

    // Delete, then the slot is free again
    let res = client
        .delete(server.url(&format!("/api/employee/document/{}", first["document_id"])))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deletion = res.json::<Value>().await?["data"].clone();
    assert_eq!(deletion["blob"]["status"], "removed");

    let res = client
        .delete(server.url(&format!("/api/employee/document/{}", first["document_id"])))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["error"], "Document not found or already deleted");

    let res = client
        .post(&upload_url)
        .bearer_auth(&token)
        .multipart(document_form("PASSPORT", "passport.pdf", b"%PDF passport"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(server.url(&format!("/api/employee/{id}/documents")))
        .bearer_auth(&token)
        .send()
        .await?;
    let documents = res.json::<Value>().await?["data"].clone();
    assert_eq!(documents.as_array().map(Vec::len), Some(1));
    assert_eq!(documents[0]["document_type"], "PASSPORT");
    assert_eq!(documents[0]["document_name"], "passport.pdf");
    Ok(())
}

#[tokio::test]
async fn upload_requires_type_and_file() -> Result<()> {
    let Some(db) = common::test_db().await? else {
        return Ok(());
    };
    let fx = common::seed(&db).await?;
    let server = common::spawn_app(db.clone()).await?;
    let token = server.token(1, fx.region_id);
    let client = reqwest::Client::new();
    let id = new_employee(&server, &fx, &token).await?;
    let upload_url = server.url(&format!("/api/employee/{id}/document"));

    let no_type = Form::new().part("file", Part::bytes(b"x".to_vec()).file_name("x.pdf"));
    let res = client.post(&upload_url).bearer_auth(&token).multipart(no_type).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>().await?["field_errors"].get("document_type").is_some());

    let no_file = Form::new().text("document_type", "PAN");
    let res = client.post(&upload_url).bearer_auth(&token).multipart(no_file).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>().await?["field_errors"].get("file").is_some());

    let too_big = document_form("PAN", "big.pdf", &vec![0u8; 128 * 1024]);
    let res = client.post(&upload_url).bearer_auth(&token).multipart(too_big).send().await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn documents_of_other_regions_are_hidden() -> Result<()> {
    let Some(db) = common::test_db().await? else {
        return Ok(());
    };
    let fx = common::seed(&db).await?;
    let server = common::spawn_app(db.clone()).await?;
    let owner = server.token(1, fx.region_id);
    let outsider = server.token(2, fx.other_region_id);
    let client = reqwest::Client::new();
    let id = new_employee(&server, &fx, &owner).await?;

    let res = client
        .post(server.url(&format!("/api/employee/{id}/document")))
        .bearer_auth(&owner)
        .multipart(document_form("PAN", "pan.pdf", b"%PDF pan"))
        .send()
        .await?;
    let document_id = res.json::<Value>().await?["data"]["document_id"].clone();

    let res = client
        .get(server.url(&format!("/api/employee/{id}/documents")))
        .bearer_auth(&outsider)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(server.url(&format!("/api/employee/document/{document_id}")))
        .bearer_auth(&outsider)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(server.url(&format!("/api/employee/{id}/document")))
        .bearer_auth(&outsider)
        .multipart(document_form("PASSPORT", "p.pdf", b"%PDF p"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
