mod support;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use bharani::config::Config;
use serde_json::{Value, json};
use support::{FakeBlobStore, TestApp, multipart_body, spawn_app, spawn_app_with};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

const FAIL_PRODUCT_UPDATES: &str = "CREATE TRIGGER fail_product_update BEFORE UPDATE ON products \
     BEGIN SELECT RAISE(ABORT, 'write rejected'); END;";

const FAIL_PRODUCT_INSERTS: &str = "CREATE TRIGGER fail_product_insert BEFORE INSERT ON products \
     BEGIN SELECT RAISE(ABORT, 'write rejected'); END;";

fn product_json(name: &str) -> Value {
    json!({
        "name": name,
        "category": "laboratory",
        "description": "0.001g precision analytical balance",
        "indiamart_url": "https://www.indiamart.com/proddetail/123",
        "whatsapp_message": "Hi, I am interested in the analytical balance",
        "image": "https://cdn.example.com/balance.png"
    })
}

fn text_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("category", "industrial".to_string()),
        ("description", "Heavy duty platform scale".to_string()),
        ("indiamart_url", "https://www.indiamart.com/proddetail/456".to_string()),
        ("whatsapp_message", "Interested in platform scale".to_string()),
    ]
}

async fn send_multipart(
    app: &TestApp,
    method: &str,
    uri: &str,
    fields: &[(&str, String)],
    with_image: bool,
) -> (StatusCode, Value) {
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let file = with_image.then_some(("image", "scale.png", "image/png", PNG_BYTES));
    let (content_type, body) = multipart_body(&fields, file);

    app.send(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token()))
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

async fn create_uploaded(app: &TestApp, name: &str) -> Value {
    let (status, body) =
        send_multipart(app, "POST", "/api/products", &text_fields(name), true).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_public_list_empty() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": []}));
}

#[tokio::test]
async fn test_create_with_url_and_defaults() {
    let app = spawn_app().await;

    let (status, body) = app
        .json("POST", "/api/products", &product_json("Analytical Balance"), true)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["data"]["rating"], 4.5);
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"]["cloudinary_id"].is_null());
    assert_eq!(app.blobs.upload_count(), 0);

    let id = body["data"]["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Analytical Balance");
}

#[tokio::test]
async fn test_create_with_uploaded_file() {
    let app = spawn_app().await;

    let product = create_uploaded(&app, "Platform Scale").await;

    assert_eq!(app.blobs.upload_count(), 1);
    assert_eq!(product["cloudinary_id"], "products/fake-1");
    assert!(product["image"].as_str().unwrap().ends_with(".png"));
    assert_eq!(product["category"], "industrial");
}

#[tokio::test]
async fn test_create_without_image_uploads_nothing() {
    let app = spawn_app().await;

    let mut payload = product_json("No Image");
    payload.as_object_mut().unwrap().remove("image");
    let (status, body) = app.json("POST", "/api/products", &payload, true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image is required");

    let mut fields = text_fields("Missing Description");
    fields.retain(|(k, _)| *k != "description");
    let (status, body) = send_multipart(&app, "POST", "/api/products", &fields, true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    assert_eq!(app.blobs.upload_count(), 0);
}

#[tokio::test]
async fn test_create_rejects_unknown_category() {
    let app = spawn_app().await;

    let mut payload = product_json("Kitchen Scale");
    payload["category"] = json!("kitchen");
    let (status, body) = app.json("POST", "/api/products", &payload, true).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("kitchen"));
}

#[tokio::test]
async fn test_failed_insert_releases_uploaded_blob() {
    let app = spawn_app().await;
    app.execute_sql(FAIL_PRODUCT_INSERTS).await;

    let (status, _) =
        send_multipart(&app, "POST", "/api/products", &text_fields("Doomed"), true).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.blobs.upload_count(), 1);
    assert_eq!(app.blobs.deleted(), vec!["products/fake-1".to_string()]);
}

#[tokio::test]
async fn test_failed_insert_releases_body_supplied_handle() {
    let app = spawn_app().await;
    app.execute_sql(FAIL_PRODUCT_INSERTS).await;

    let mut payload = product_json("Doomed");
    payload["cloudinary_id"] = json!("products/direct-upload");
    let (status, _) = app.json("POST", "/api/products", &payload, true).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.blobs.deleted(), vec!["products/direct-upload".to_string()]);
}

#[tokio::test]
async fn test_upload_outage_is_503() {
    let app = spawn_app_with(Config::default(), FakeBlobStore::failing_uploads()).await;

    let (status, body) =
        send_multipart(&app, "POST", "/api/products", &text_fields("Offline"), true).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Image storage is unavailable");

    let (_, list) = app.get_authed("/api/products/admin/all").await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_partial_update_keeps_unspecified_fields() {
    let app = spawn_app().await;
    let product = create_uploaded(&app, "Platform Scale").await;
    let id = product["id"].as_i64().unwrap();

    let (status, body) = app
        .json(
            "PUT",
            &format!("/api/products/{id}"),
            &json!({"rating": 3.5, "is_active": false, "name": "  "}),
            true,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["data"]["name"], "Platform Scale");
    assert_eq!(body["data"]["rating"], 3.5);
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["image"], product["image"]);
    assert!(app.blobs.deleted().is_empty());

    let (_, public) = app.get("/api/products").await;
    assert_eq!(public["data"], json!([]));
    let (_, all) = app.get_authed("/api/products/admin/all").await;
    assert_eq!(all["count"], 1);
}

#[tokio::test]
async fn test_image_replacement_releases_old_blob_after_commit() {
    let app = spawn_app().await;
    let product = create_uploaded(&app, "Platform Scale").await;
    let id = product["id"].as_i64().unwrap();

    let (status, body) = send_multipart(
        &app,
        "PUT",
        &format!("/api/products/{id}"),
        &[("description", "New photo".to_string())],
        true,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cloudinary_id"], "products/fake-2");
    assert_eq!(body["data"]["description"], "New photo");
    assert_eq!(app.blobs.deleted(), vec!["products/fake-1".to_string()]);
}

#[tokio::test]
async fn test_failed_update_keeps_old_blob_and_releases_new() {
    let app = spawn_app().await;
    let product = create_uploaded(&app, "Platform Scale").await;
    let id = product["id"].as_i64().unwrap();
    app.execute_sql(FAIL_PRODUCT_UPDATES).await;

    let (status, _) = send_multipart(
        &app,
        "PUT",
        &format!("/api/products/{id}"),
        &[("name", "Renamed".to_string())],
        true,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.blobs.deleted(), vec!["products/fake-2".to_string()]);

    let (_, body) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(body["data"]["cloudinary_id"], "products/fake-1");
    assert_eq!(body["data"]["name"], "Platform Scale");
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = spawn_app().await;

    let (status, body) = app
        .json("PUT", "/api/products/4242", &json!({"name": "Ghost"}), true)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_delete_removes_row_then_blob() {
    let app = spawn_app().await;
    let product = create_uploaded(&app, "Platform Scale").await;
    let id = product["id"].as_i64().unwrap();

    let (status, body) = app.authed("DELETE", &format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");
    assert_eq!(app.blobs.deleted(), vec!["products/fake-1".to_string()]);

    let (status, _) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.authed("DELETE", &format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blob_failure_never_blocks_delete() {
    let app = spawn_app_with(Config::default(), FakeBlobStore::failing_deletes()).await;
    let product = create_uploaded(&app, "Platform Scale").await;
    let id = product["id"].as_i64().unwrap();

    let (status, _) = app.authed("DELETE", &format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_writes_require_token() {
    let app = spawn_app().await;

    let (status, _) = app
        .json("POST", "/api/products", &product_json("Sneaky"), false)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/products/admin/all").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_direct_upload_and_delete() {
    let app = spawn_app().await;

    let (content_type, body) =
        multipart_body(&[], Some(("image", "scale.png", "image/png", PNG_BYTES)));
    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/upload/image")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token()))
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image uploaded successfully");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["publicId"], "products/fake-1");
    assert_eq!(body["publicId"], "products/fake-1");
    assert!(
        body["imageUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://cdn.example.com/products/fake-1.")
    );
    assert_eq!(body["imageUrl"], body["data"]["imageUrl"]);

    let (status, body) = app
        .authed("DELETE", "/api/upload/image/products%2Ffake-1")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image deleted successfully");
    assert_eq!(app.blobs.deleted(), vec!["products/fake-1".to_string()]);
}

#[tokio::test]
async fn test_direct_upload_rejects_non_images() {
    let app = spawn_app().await;

    let (content_type, body) = multipart_body(
        &[],
        Some(("image", "notes.txt", "text/plain", b"hello".as_slice())),
    );
    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/upload/image")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token()))
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.blobs.upload_count(), 0);

    let (content_type, body) = multipart_body(&[("other", "x")], None);
    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/upload/image")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token()))
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No image file provided");
}
