//! API integration tests

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and return the session token
async fn get_auth_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_returns_bearer_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_with_bad_password_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "definitely-wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_book_listing_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_book_stats_pad_every_rating() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/1/stats", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let distribution = body["rating_distribution"]
        .as_object()
        .expect("No distribution");
    for rating in 1..=10 {
        assert!(distribution.contains_key(&rating.to_string()));
    }
}

#[tokio::test]
#[ignore]
async fn test_missing_book_returns_error_shape() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_book_write_requires_admin() {
    let client = Client::new();

    // No credentials at all
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Test",
            "isbn": "9788324602795",
            "author_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // Plain user token
    let token = get_auth_token(&client, "reader", "reader123").await;
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "Test",
            "isbn": "9788324602795",
            "author_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_register_creates_default_shelves() {
    let client = Client::new();
    let username = format!("user{}", chrono_stamp());

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let token = get_auth_token(&client, &username, "secret123").await;
    let response = client
        .get(format!("{}/shelves", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let shelves: Value = response.json().await.expect("Failed to parse response");
    let names: Vec<&str> = shelves
        .as_array()
        .expect("Not an array")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert!(names.contains(&"Przeczytane"));
    assert!(names.contains(&"Chcę przeczytać"));
    assert!(names.contains(&"Teraz czytam"));
}

#[tokio::test]
#[ignore]
async fn test_move_book_absent_from_source_lands_on_target() {
    let client = Client::new();
    let username = format!("mover{}", chrono_stamp());

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let token = get_auth_token(&client, &username, "secret123").await;
    let shelves: Value = client
        .get(format!("{}/shelves", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let shelves = shelves.as_array().expect("Not an array");
    let source_id = shelves[0]["id"].as_i64().expect("No shelf id");
    let target_id = shelves[1]["id"].as_i64().expect("No shelf id");

    // Fresh shelves are empty; moving behaves like remove-then-add, so
    // the book still lands on the target.
    let response = client
        .post(format!("{}/shelves/{}/move", BASE_URL, source_id))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": 1,
            "target_shelf_id": target_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let shelves: Value = client
        .get(format!("{}/shelves", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let target = shelves
        .as_array()
        .expect("Not an array")
        .iter()
        .find(|s| s["id"].as_i64() == Some(target_id))
        .expect("Target shelf missing");
    let book_ids: Vec<i64> = target["books"]
        .as_array()
        .expect("No books array")
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();
    assert!(book_ids.contains(&1));
}

#[tokio::test]
#[ignore]
async fn test_registration_validation_returns_field_map() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "username": "ab",
            "email": "not-an-email",
            "password": "123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["username"].is_string());
    assert!(body["email"].is_string());
    assert!(body["password"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_review_rating_outside_range_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client, "reader", "reader123").await;

    let response = client
        .post(format!("{}/books/1/reviews", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "rating": 11,
            "content": "Well outside the scale"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_csv_export_has_stable_header() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin", "admin").await;

    let response = client
        .get("http://localhost:8080/admin/books/export")
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body = response.text().await.expect("Failed to read body");
    assert!(body.starts_with("ID;Tytul;Autor;ISBN;Ocena\n"));
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_html_redirects_to_login() {
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client");

    let response = client
        .get("http://localhost:8080/profile")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/login"
    );
}

fn chrono_stamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
