use cursos_api::config::{ApiConfig, EmptyListPolicy};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig::default()).await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = cursos_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create(client: &reqwest::Client, srv: &TestServer, name: &str, professor: &str) -> reqwest::Response {
    client
        .post(srv.url("/cursos"))
        .json(&json!({ "name": name, "professor": professor }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_ok_and_echoes_request_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let incoming = "0190b0f2-6c2e-7c3a-8f00-000000000001";
    let res = client
        .get(srv.url("/health"))
        .header("x-request-id", incoming)
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], incoming);
}

#[tokio::test]
async fn course_catalog_scenario_over_http() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Create
    let res = create(&client, &srv, "Algorithms", "Ada").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "Algorithms");
    assert_eq!(created["professor"], "Ada");
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["enrolledCount"], 0);

    // Enroll x3, withdraw x1
    for _ in 0..3 {
        let res = client.post(srv.url("/cursos/enroll/1")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    let res = client.post(srv.url("/cursos/withdraw/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let count: u32 = client
        .get(srv.url("/cursos/count/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count, 2);

    // Disable
    let res = client.patch(srv.url("/cursos/disable/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let disabled: Value = res.json().await.unwrap();
    assert_eq!(disabled["status"], "DISABLED");

    // Reassign professor; stays disabled
    let res = client
        .patch(srv.url("/cursos/1"))
        .json(&json!({ "professor": "Grace" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let reassigned: Value = res.json().await.unwrap();
    assert_eq!(reassigned["professor"], "Grace");
    assert_eq!(reassigned["status"], "DISABLED");

    // Disable again
    let res = client.patch(srv.url("/cursos/disable/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "already_disabled");

    // Unknown id
    let res = client.get(srv.url("/cursos/999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    assert_eq!(create(&client, &srv, "Algorithms", "Ada").await.status(), StatusCode::CREATED);
    let res = create(&client, &srv, "Algorithms", "Grace").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_course");
}

#[tokio::test]
async fn invalid_input_is_rejected_at_the_boundary() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, "  ", "Ada").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/cursos"))
        .json(&json!({ "name": "Algorithms" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_input");

    let res = client
        .post(srv.url("/cursos"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/cursos/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    create(&client, &srv, "Algorithms", "Ada").await;
    let res = client
        .patch(srv.url("/cursos/1"))
        .json(&json!({ "professor": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdraw_at_zero_is_an_invalid_operation() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, "Algorithms", "Ada").await;

    let res = client.post(srv.url("/cursos/withdraw/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_operation");

    let res = client.post(srv.url("/cursos/enroll/42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn portuguese_aliases_under_versioned_prefix() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/v1/cursos"))
        .json(&json!({ "nome": "Algoritmos", "professor": "Ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.post(srv.url("/api/v1/cursos/matricular/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.post(srv.url("/api/v1/cursos/matricular/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.post(srv.url("/api/v1/cursos/desmatricular/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let count: u32 = client
        .get(srv.url("/api/v1/cursos/total-alunos/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count, 1);

    let res = client
        .patch(srv.url("/api/v1/cursos/desabilitar-curso/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_list_follows_configured_policy() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client.get(srv.url("/cursos")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));

    let strict = TestServer::spawn_with(ApiConfig {
        empty_list: EmptyListPolicy::NotFound,
        ..ApiConfig::default()
    })
    .await;
    let res = client.get(strict.url("/cursos")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    create(&client, &strict, "Algorithms", "Ada").await;
    create(&client, &strict, "Compilers", "Niklaus").await;
    let res = client.get(strict.url("/cursos")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Algorithms", "Compilers"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrolls_over_http_are_not_lost() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, "Algorithms", "Ada").await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let client = client.clone();
        let url = srv.url("/cursos/enroll/1");
        handles.push(tokio::spawn(async move {
            client.post(url).send().await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let count: u32 = client
        .get(srv.url("/cursos/count/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count, 20);
}
