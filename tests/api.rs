use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use bookshare_app::{AppState, Application};
use bookshare_db::Store;
use bookshare_kernel::settings::{Settings, TokenMode};

struct TestApp {
    app: Application,
    router: Router,
    _uploads: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(|_| {}).await
    }

    async fn with(configure: impl FnOnce(&mut Settings)) -> Self {
        let uploads = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.storage.seed_sample_data = false;
        settings.auth.token_secret = "integration-secret".to_string();
        settings.uploads.dir = uploads.path().to_path_buf();
        configure(&mut settings);

        let state = AppState::new(Store::in_memory(), &settings);
        let app = Application::with_state(settings, state);
        app.boot().await.unwrap();
        let router = app.router();

        Self {
            app,
            router,
            _uploads: uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Register a user and return `(id, credential)`.
    async fn register(&self, name: &str, email: &str, role: &str) -> (u64, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "secret1",
                    "mobile": "1234567890",
                    "role": role
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let id = body["user"]["id"].as_u64().unwrap();
        let credential = match body["token"].as_str() {
            Some(token) => token.to_string(),
            None => id.to_string(),
        };
        (id, credential)
    }

    async fn create_book(&self, token: &str, title: &str, city: &str, genre: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/books",
                Some(token),
                Some(json!({
                    "title": title,
                    "author": "Some Author",
                    "genre": genre,
                    "city": city,
                    "contact": "owner@example.com"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["book"].clone()
    }
}

fn ids(body: &Value) -> Vec<u64> {
    body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_login_returns_same_user() {
    let app = TestApp::new().await;

    let (status, registered) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret1",
                "mobile": "1234567890",
                "role": "OWNER"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["success"], true);
    assert_eq!(registered["user"]["role"], "owner");
    assert!(registered["user"].get("password").is_none());
    assert!(registered["token"].as_str().is_some());

    let (status, logged_in) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["user"], registered["user"]);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com", "owner").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Other Ada",
                "email": "ada@example.com",
                "password": "secret2",
                "mobile": "0987654321",
                "role": "seeker"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this email already exists");
}

#[tokio::test]
async fn invalid_registration_lists_every_problem() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "nope", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn login_failures() {
    let app = TestApp::new().await;
    app.register("Ada", "ada@example.com", "owner").await;

    let (status, body) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": "ada@example.com" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong!!" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn verify_token_resolves_credentials() {
    let app = TestApp::new().await;
    let (id, token) = app.register("Ada", "ada@example.com", "owner").await;

    let (status, body) = app
        .call(Method::POST, &format!("/api/auth/verifyToken/{token}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);

    let (status, body) = app
        .call(Method::POST, "/api/auth/verifyToken/garbage", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn user_id_mode_accepts_raw_ids() {
    let app = TestApp::with(|s| s.auth.token_mode = TokenMode::UserId).await;
    let (id, credential) = app.register("Ada", "ada@example.com", "owner").await;
    assert_eq!(credential, id.to_string());

    let (status, body) = app.call(Method::GET, "/api/users/profile", Some(&credential), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/books/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");
    assert!(body["trace_id"].as_str().is_some());

    let (status, body) = app.call(Method::GET, "/api/books/me", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials.");
}

#[tokio::test]
async fn only_owners_may_list_books() {
    let app = TestApp::new().await;
    let (_, seeker) = app.register("Sam", "sam@example.com", "seeker").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/books",
            Some(&seeker),
            Some(json!({ "title": "Dune", "author": "Frank Herbert", "city": "Paris", "contact": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Access denied. Only book owners can perform this action."
    );
}

#[tokio::test]
async fn create_then_get_returns_listing_with_owner_contact() {
    let app = TestApp::new().await;
    let (owner_id, owner) = app.register("Ada", "ada@example.com", "owner").await;

    let created = app.create_book(&owner, "Dune", "Las Vegas", "sci-fi").await;
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["status"], "available");
    assert_eq!(created["ownerId"], owner_id);
    assert_eq!(
        created["coverImage"],
        app.app.settings().uploads.default_cover_url.as_str()
    );

    let (status, body) = app.call(Method::GET, &format!("/api/books/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let book = &body["book"];
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["city"], "Las Vegas");
    assert_eq!(book["user"]["name"], "Ada");
    assert_eq!(book["user"]["mobile"], "1234567890");
    assert_eq!(book["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn book_validation_and_lookup_errors() {
    let app = TestApp::new().await;
    let (_, owner) = app.register("Ada", "ada@example.com", "owner").await;

    let (status, body) = app
        .call(Method::POST, "/api/books", Some(&owner), Some(json!({ "title": "Dune" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["Author is required", "City/Location is required", "Contact information is required"])
    );

    let (status, body) = app.call(Method::GET, "/api/books/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid book ID");

    let (status, body) = app.call(Method::GET, "/api/books/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn listing_filters_and_pages() {
    let app = TestApp::new().await;
    let (_, owner) = app.register("Ada", "ada@example.com", "owner").await;

    for n in 0..10 {
        let city = if n % 2 == 0 { "Paris" } else { "London" };
        app.create_book(&owner, &format!("Book {n}"), city, "fiction").await;
    }
    for id in [2, 4, 6] {
        let (status, _) = app
            .call(
                Method::PATCH,
                &format!("/api/books/{id}/status"),
                Some(&owner),
                Some(json!({ "status": "rented" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, first) = app.call(Method::GET, "/api/books?page=0&limit=4", None, None).await;
    let (_, second) = app.call(Method::GET, "/api/books?page=1&limit=4", None, None).await;
    let (_, last) = app.call(Method::GET, "/api/books?page=2&limit=4", None, None).await;
    assert_eq!(ids(&first), vec![1, 2, 3, 4]);
    assert_eq!(ids(&second), vec![5, 6, 7, 8]);
    assert_eq!(ids(&last), vec![9, 10]);
    assert_eq!(first["hasMore"], true);
    assert_eq!(last["hasMore"], false);
    assert_eq!(first["total"], 10);
    assert_eq!(first["cities"], json!(["Paris", "London"]));

    let (_, available) = app.call(Method::GET, "/api/books?status=available", None, None).await;
    assert_eq!(available["total"], 7);
    assert!(available["books"]
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["status"] == "available"));

    let (_, combined) = app
        .call(Method::GET, "/api/books?status=rented&city=london", None, None)
        .await;
    assert_eq!(ids(&combined), vec![2, 4, 6]);

    let (_, defaults) = app.call(Method::GET, "/api/books?page=x&limit=y", None, None).await;
    assert_eq!(defaults["page"], 0);
    assert_eq!(defaults["limit"], 8);

    let (_, recent) = app.call(Method::GET, "/api/books/recent-books", None, None).await;
    assert_eq!(recent["books"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn my_books_are_scoped_to_the_caller() {
    let app = TestApp::new().await;
    let (_, ada) = app.register("Ada", "ada@example.com", "owner").await;
    let (_, bob) = app.register("Bob", "bob@example.com", "owner").await;

    app.create_book(&ada, "Dune", "Paris", "sci-fi").await;
    app.create_book(&bob, "Emma", "Rome", "fiction").await;

    let (status, body) = app.call(Method::GET, "/api/books/me", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["books"][0]["title"], "Emma");
    assert_eq!(body["cities"], json!(["Rome"]));
}

#[tokio::test]
async fn only_the_owner_may_update_or_delete() {
    let app = TestApp::new().await;
    let (_, ada) = app.register("Ada", "ada@example.com", "owner").await;
    let (_, bob) = app.register("Bob", "bob@example.com", "owner").await;
    let book = app.create_book(&ada, "Dune", "Paris", "sci-fi").await;
    let uri = format!("/api/books/{}", book["id"]);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&bob), Some(json!({ "title": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only update your own book listings");

    let (status, body) = app.call(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only delete your own book listings");

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&ada),
            Some(json!({ "title": "Dune Messiah", "author": "", "status": "exchanged" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["book"]["title"], "Dune Messiah");
    assert_eq!(body["book"]["author"], "Some Author");
    assert_eq!(body["book"]["status"], "exchanged");

    let (status, body) = app.call(Method::DELETE, &uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");

    let (status, _) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn any_user_may_toggle_status_by_default() {
    let app = TestApp::new().await;
    let (_, ada) = app.register("Ada", "ada@example.com", "owner").await;
    let (_, sam) = app.register("Sam", "sam@example.com", "seeker").await;
    let book = app.create_book(&ada, "Dune", "Paris", "sci-fi").await;
    let uri = format!("/api/books/{}/status", book["id"]);

    let (status, body) = app
        .call(Method::PATCH, &uri, Some(&sam), Some(json!({ "status": "rented" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["status"], "rented");
    assert_eq!(body["message"], "Book status updated to rented");

    let (status, body) = app
        .call(Method::PATCH, &uri, Some(&sam), Some(json!({ "status": "lost" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid status. Must be one of: available, rented, exchanged"
    );
}

#[tokio::test]
async fn strict_ownership_guards_status_changes() {
    let app = TestApp::with(|s| s.policy.strict_ownership = true).await;
    let (_, ada) = app.register("Ada", "ada@example.com", "owner").await;
    let (_, sam) = app.register("Sam", "sam@example.com", "seeker").await;
    let book = app.create_book(&ada, "Dune", "Paris", "sci-fi").await;
    let uri = format!("/api/books/{}/status", book["id"]);

    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&sam), Some(json!({ "status": "rented" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&ada), Some(json!({ "status": "rented" })))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn multipart_cover_is_stored_and_served() {
    let app = TestApp::new().await;
    let (_, owner) = app.register("Ada", "ada@example.com", "owner").await;

    let boundary = "test-boundary";
    let mut body = String::new();
    for (name, value) in [
        ("title", "Dune"),
        ("author", "Frank Herbert"),
        ("city", "Paris"),
        ("contact", "ada@example.com"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"dune.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    ));

    let request = Request::post("/api/books")
        .header(header::AUTHORIZATION, format!("Bearer {owner}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, created) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let cover = created["book"]["coverImage"].as_str().unwrap().to_string();
    assert!(cover.starts_with("/uploads/"));
    assert!(cover.ends_with("-dune.png"));

    let response = app
        .router
        .clone()
        .oneshot(Request::get(cover.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"PNGDATA");
}

#[tokio::test]
async fn profile_and_dashboard() {
    let app = TestApp::new().await;
    let (_, ada) = app.register("Ada", "ada@example.com", "owner").await;
    for n in 0..5 {
        app.create_book(&ada, &format!("Book {n}"), "Paris", "fiction").await;
    }
    app.call(
        Method::PATCH,
        "/api/books/1/status",
        Some(&ada),
        Some(json!({ "status": "exchanged" })),
    )
    .await;

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/users/profile",
            Some(&ada),
            Some(json!({ "name": "Ada L.", "mobile": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["name"], "Ada L.");
    assert_eq!(body["user"]["mobile"], "1234567890");

    let (status, body) = app.call(Method::GET, "/api/users/dashboard", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    let dashboard = &body["dashboard"];
    assert_eq!(dashboard["totalBooks"], 5);
    assert_eq!(dashboard["availableBooks"], 4);
    assert_eq!(dashboard["rentedBooks"], 1);
    assert_eq!(dashboard["myBooks"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn request_lifecycle() {
    let app = TestApp::new().await;
    let (sam_id, sam) = app.register("Sam", "sam@example.com", "seeker").await;
    let (ada_id, ada) = app.register("Ada", "ada@example.com", "owner").await;
    let (_, bob) = app.register("Bob", "bob@example.com", "owner").await;

    let (status, body) = app
        .call(Method::POST, "/api/users/requests", Some(&sam), Some(json!({ "title": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Title is required"]));

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/requests",
            Some(&sam),
            Some(json!({ "title": "Looking for Dune", "description": "Any edition" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["request"]["id"].as_u64().unwrap();
    assert_eq!(body["request"]["respond"], false);
    assert_eq!(body["request"]["userId"], sam_id);

    let uri = format!("/api/users/requests/{id}");
    let (_, body) = app.call(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(body["request"]["canRespond"], true);
    assert_eq!(body["request"]["user"]["email"], "sam@example.com");
    assert!(body["request"].get("owner").is_none());

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/users/requests/owner/{id}"),
            Some(&sam),
            Some(json!({ "response": "I have it" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/users/requests/owner/{id}"),
            Some(&ada),
            Some(json!({ "response": "I have it" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["respond"], true);
    assert_eq!(body["request"]["ownerId"], ada_id);

    let (_, body) = app.call(Method::GET, &uri, Some(&ada), None).await;
    assert_eq!(body["request"]["canRespond"], true);
    assert_eq!(body["request"]["owner"]["name"], "Ada");
    let (_, body) = app.call(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(body["request"]["canRespond"], false);

    let (_, mine) = app.call(Method::GET, "/api/users/requests", Some(&sam), None).await;
    assert_eq!(mine["requests"].as_array().unwrap().len(), 1);
    let (_, answered) = app
        .call(Method::GET, "/api/users/requests/owner/me", Some(&ada), None)
        .await;
    assert_eq!(answered["requests"].as_array().unwrap().len(), 1);
    let (_, answered) = app
        .call(Method::GET, "/api/users/requests/owner/me", Some(&bob), None)
        .await;
    assert!(answered["requests"].as_array().unwrap().is_empty());
    let (status, all) = app
        .call(Method::GET, "/api/users/requests/owner", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["requests"].as_array().unwrap().len(), 1);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&ada), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only delete your own requests");

    let (status, body) = app.call(Method::DELETE, &uri, Some(&sam), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request deleted successfully");

    let (status, body) = app.call(Method::GET, &uri, Some(&sam), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Request not found");

    let (status, _) = app
        .call(Method::GET, "/api/users/requests/nope", Some(&sam), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn strict_ownership_blocks_second_responder() {
    let app = TestApp::with(|s| s.policy.strict_ownership = true).await;
    let (_, sam) = app.register("Sam", "sam@example.com", "seeker").await;
    let (_, ada) = app.register("Ada", "ada@example.com", "owner").await;
    let (_, bob) = app.register("Bob", "bob@example.com", "owner").await;

    let (_, body) = app
        .call(
            Method::POST,
            "/api/users/requests",
            Some(&sam),
            Some(json!({ "title": "Looking for Emma" })),
        )
        .await;
    let uri = format!("/api/users/requests/owner/{}", body["request"]["id"]);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&ada), Some(json!({ "response": "Mine" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&bob), Some(json!({ "response": "No, mine" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "This request has already been answered by another owner"
    );
}

#[tokio::test]
async fn shutdown_flushes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("db.json");

    let mut settings = Settings::default();
    settings.storage.snapshot_path = snapshot.clone();
    settings.uploads.dir = dir.path().join("uploads");

    let app = Application::new(settings);
    app.boot().await.unwrap();
    app.shutdown().await.unwrap();

    let saved: Value = serde_json::from_slice(&std::fs::read(&snapshot).unwrap()).unwrap();
    assert_eq!(saved["books"]["records"].as_array().unwrap().len(), 16);
}
