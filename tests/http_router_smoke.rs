use serde_json::{json, Value};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

struct Server {
    child: Child,
    base: String,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_server(workspace: &Path) -> Server {
    let exe = env!("CARGO_BIN_EXE_essayd");
    let mut child = Command::new(exe)
        .env("ESSAYD_BIND", "127.0.0.1:0")
        .env("ESSAYD_DATABASE", workspace.join("essayd.sqlite3"))
        .env("RUST_LOG", "off")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn essayd");
    let stdout = child.stdout.take().expect("child stdout");

    let mut line = String::new();
    BufReader::new(stdout)
        .read_line(&mut line)
        .expect("read ready line");
    let ready: Value = serde_json::from_str(line.trim()).expect("parse ready line");
    let addr = ready
        .get("listening")
        .and_then(|v| v.as_str())
        .expect("listening address");
    Server {
        base: format!("http://{addr}"),
        child,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("http client")
}

async fn get(client: &reqwest::Client, server: &Server, path: &str) -> (u16, Value) {
    let resp = client
        .get(format!("{}{}", server.base, path))
        .send()
        .await
        .expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

async fn post(client: &reqwest::Client, server: &Server, path: &str, body: Value) -> (u16, Value) {
    let resp = client
        .post(format!("{}{}", server.base, path))
        .json(&body)
        .send()
        .await
        .expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

fn result(resp: (u16, Value), what: &str) -> Value {
    assert_eq!(resp.0, 200, "{} failed: {}", what, resp.1);
    assert_eq!(resp.1["ok"], json!(true), "{} failed: {}", what, resp.1);
    resp.1["result"].clone()
}

async fn sign_in(server: &Server, email: &str) -> reqwest::Client {
    let c = client();
    result(
        post(&c, server, "/login", json!({ "email": email, "password": "pw" })).await,
        "login",
    );
    c
}

#[tokio::test]
async fn router_serves_every_route_family() {
    let workspace = temp_dir("essayd-router-smoke");
    let server = spawn_server(&workspace);
    let anon = client();

    let health = result(get(&anon, &server, "/health").await, "health");
    assert_eq!(health["service"], json!("essayd"));

    result(
        post(
            &anon,
            &server,
            "/register",
            json!({ "name": "Prof", "email": "prof@school.test", "password": "pw", "role": "teacher" }),
        )
        .await,
        "register",
    );
    let teacher = sign_in(&server, "prof@school.test").await;
    let class = result(post(&teacher, &server, "/classes", json!({ "name": "9A" })).await, "class");
    result(
        post(&teacher, &server, "/topics", json!({ "title": "T", "class_id": class["id"] })).await,
        "topic",
    );

    let dash = result(get(&teacher, &server, "/dashboard").await, "dashboard");
    assert_eq!(dash["user"]["role"], json!("teacher"));
    assert_eq!(dash["topics"].as_array().map(Vec::len), Some(1));
    assert_eq!(dash["essays"], json!([]));

    let (status, body) = get(&anon, &server, "/dashboard").await;
    assert_eq!(status, 401, "{body}");
    assert_eq!(body["ok"], json!(false));

    let (status, body) = get(&anon, &server, "/no/such/route").await;
    assert_eq!(status, 404, "{body}");
    assert_eq!(body["error"]["code"], json!("not_found"));
}
