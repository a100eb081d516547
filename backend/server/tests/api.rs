use readings::{InspectionRecord, InspectionStats, Status, account::Session};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use server::{build_router, config::Config, state::AppState};
use tempfile::TempDir;
use tokio::net::TcpListener;

const INDEX_HTML: &str = "<!doctype html><title>inspect</title>";

struct TestApp {
    base: String,
    client: Client,
    _static_dir: TempDir,
}

impl TestApp {
    async fn spawn() -> Self {
        let static_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(static_dir.path().join("index.html"), INDEX_HTML).expect("write index");
        std::fs::write(static_dir.path().join("app.js"), "console.log(1)").expect("write asset");

        let config = Config {
            port: 0,
            redis_url: "memory://".to_string(),
            static_dir: static_dir.path().to_path_buf(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 1,
        };
        let state = AppState::in_memory(config);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, build_router(state))
                .await
                .expect("serve");
        });

        Self {
            base: format!("http://{address}"),
            client: Client::new(),
            _static_dir: static_dir,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{path}", self.base))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{path}", self.base))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(format!("{}{path}", self.base))
    }

    async fn register(&self, email: &str) -> Session {
        let response = self
            .post("/api/auth/register")
            .json(&json!({"name": "Inspector", "email": email, "password": "hunter22"}))
            .send()
            .await
            .expect("register");
        assert_eq!(response.status(), StatusCode::CREATED);

        response.json().await.expect("session")
    }

    async fn submit(&self, token: &str, body: Value) -> reqwest::Response {
        self.post("/api/inspections")
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("submit")
    }

    async fn list(&self) -> Vec<InspectionRecord> {
        self.get("/api/inspections")
            .send()
            .await
            .expect("list")
            .json()
            .await
            .expect("records")
    }

    async fn stats(&self) -> InspectionStats {
        self.get("/api/inspections/stats")
            .send()
            .await
            .expect("stats")
            .json()
            .await
            .expect("stats body")
    }
}

async fn message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("error body");
    body["message"].as_str().expect("message").to_string()
}

fn package(id: &str, temperature: f64, weight: f64, is_sealed: bool) -> Value {
    json!({"packageId": id, "temperature": temperature, "weight": weight, "isSealed": is_sealed})
}

#[tokio::test]
async fn api_root_reports_running() {
    let app = TestApp::spawn().await;

    let body: Value = app.get("/api").send().await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "Food Quality Inspection API is running");
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = TestApp::spawn().await;

    let session = app.register(" Ada@Example.com ").await;
    assert_eq!(session.profile.email, "ada@example.com");
    assert_eq!(session.profile.name, "Inspector");
    assert!(!session.token.is_empty());

    let login = app
        .post("/api/auth/login")
        .json(&json!({"email": "ada@example.com", "password": "hunter22"}))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let login: Session = login.json().await.unwrap();
    assert_eq!(login.profile, session.profile);

    let me = app
        .get("/api/auth/me")
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let me: Value = me.json().await.unwrap();
    assert_eq!(me["_id"], session.profile.id.as_str());
}

#[tokio::test]
async fn register_rejections() {
    let app = TestApp::spawn().await;
    app.register("ada@example.com").await;

    let duplicate = app
        .post("/api/auth/register")
        .json(&json!({"name": "Other", "email": "ADA@example.com", "password": "another1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(duplicate).await, "User already exists");

    let short = app
        .post("/api/auth/register")
        .json(&json!({"name": "Bob", "email": "bob@example.com", "password": "12345"}))
        .send()
        .await
        .unwrap();
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(short).await, "Password must be at least 6 characters");

    let missing = app
        .post("/api/auth/register")
        .json(&json!({"email": "bob@example.com", "password": "123456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(missing).await, "Please provide all required fields");
}

#[tokio::test]
async fn login_rejections() {
    let app = TestApp::spawn().await;
    app.register("ada@example.com").await;

    for (email, password) in [("ada@example.com", "wrong-pass"), ("nobody@example.com", "hunter22")] {
        let response = app
            .post("/api/auth/login")
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(message(response).await, "Invalid email or password");
    }
}

#[tokio::test]
async fn create_requires_token() {
    let app = TestApp::spawn().await;

    let anonymous = app
        .post("/api/inspections")
        .json(&package("PKG-1", 10.0, 500.0, true))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(anonymous).await, "Not authorized, no token");

    let forged = app.submit("not.a.token", package("PKG-1", 10.0, 500.0, true)).await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(forged).await, "Not authorized, token failed");

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn create_applies_verdict() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await.token;

    let passed = app.submit(&token, package("PKG-1", 10.0, 500.0, true)).await;
    assert_eq!(passed.status(), StatusCode::CREATED);
    let passed: InspectionRecord = passed.json().await.unwrap();
    assert_eq!(passed.status, Status::Passed);
    assert_eq!(passed.reason, "All parameters within acceptable range");
    assert_eq!(passed.package_id, "PKG-1");
    assert!(!passed.id.is_empty());

    let hot: InspectionRecord = app
        .submit(&token, package("PKG-2", 30.0, 500.0, true))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(hot.status, Status::Rejected);
    assert_eq!(hot.reason, "Temperature out of range (30°C).");

    let everything: InspectionRecord = app
        .submit(&token, package("PKG-3", -5.0, 50.0, false))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(everything.status, Status::Rejected);
    assert_eq!(
        everything.reason,
        "Temperature out of range (-5°C). Weight out of range (50g). Package is unsealed."
    );
}

#[tokio::test]
async fn create_rejects_incomplete_bodies() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await.token;

    let missing = app
        .submit(&token, json!({"packageId": "PKG-1", "temperature": 10, "isSealed": true}))
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(missing).await, "Please provide all required fields");

    let garbled = app
        .post("/api/inspections")
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"packageId\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(garbled.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(garbled).await, "Malformed payload");

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn accepts_large_inline_images() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await.token;

    let image = format!("data:image/jpeg;base64,{}", "A".repeat(4 * 1024 * 1024));
    let mut body = package("PKG-IMG", 10.0, 500.0, true);
    body["imageData"] = Value::String(image.clone());

    let response = app.submit(&token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = app.list().await;
    assert_eq!(stored[0].image_data.as_deref(), Some(image.as_str()));
}

#[tokio::test]
async fn list_is_newest_first_and_capped() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await.token;

    for i in 0..105 {
        let response = app
            .submit(&token, package(&format!("PKG-{i}"), 10.0, 500.0, true))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let records = app.list().await;
    assert_eq!(records.len(), 100);
    assert_eq!(records[0].package_id, "PKG-104");
    assert_eq!(records[99].package_id, "PKG-5");
    assert!(
        records
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp)
    );

    assert_eq!(app.stats().await.total_packages, 105);
}

#[tokio::test]
async fn stats_agree_with_listing() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await.token;

    for body in [
        package("a", 10.0, 500.0, true),
        package("b", 30.0, 500.0, true),
        package("c", 10.0, 50.0, false),
        package("d", 20.0, 900.0, true),
    ] {
        app.submit(&token, body).await;
    }

    let records = app.list().await;
    let stats = app.stats().await;

    let passed = records.iter().filter(|r| r.status == Status::Passed).count() as u64;
    let sealed = records.iter().filter(|r| r.is_sealed).count() as u64;

    assert_eq!(
        stats,
        InspectionStats {
            total_packages: records.len() as u64,
            passed_packages: passed,
            rejected_packages: records.len() as u64 - passed,
            sealed_packages: sealed,
            unsealed_packages: records.len() as u64 - sealed,
        }
    );
    assert_eq!(stats.passed_packages, 2);
    assert_eq!(stats.unsealed_packages, 1);
}

#[tokio::test]
async fn delete_by_id() {
    let app = TestApp::spawn().await;
    let token = app.register("ada@example.com").await.token;

    let unknown = app
        .delete("/api/inspections/does-not-exist")
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(message(unknown).await, "Inspection not found");

    let record: InspectionRecord = app
        .submit(&token, package("PKG-1", 10.0, 500.0, true))
        .await
        .json()
        .await
        .unwrap();

    let removed = app
        .delete(&format!("/api/inspections/{}", record.id))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::OK);
    assert_eq!(message(removed).await, "Inspection removed");

    assert!(app.list().await.is_empty());
    assert_eq!(app.stats().await, InspectionStats::default());
}

#[tokio::test]
async fn unknown_paths_serve_frontend_shell() {
    let app = TestApp::spawn().await;

    for path in ["/", "/dashboard", "/login/deep/link"] {
        let response = app.get(path).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(response.text().await.unwrap(), INDEX_HTML, "{path}");
    }

    let asset = app.get("/app.js").send().await.unwrap();
    assert_eq!(asset.text().await.unwrap(), "console.log(1)");
}
