use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use jsonform::config::{FormSettings, RemoteSettings, ServerSettings, Settings};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const SCHEMA: &str = r#"{
    "nombre": {"tipo": "texto", "placeholder": "Tu nombre"},
    "email": {"tipo": "texto", "regex": "[^@]+@[^@]+\\.[a-z]+"},
    "edad": {"tipo": "numero", "min": 0, "max": 100},
    "activo": {"tipo": "booleano"},
    "tags": {"tipo": "lista"}
}"#;

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to be ready
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    addr
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub history_path: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("esquema.json");
        std::fs::write(&schema_path, SCHEMA).unwrap();
        let history_path = dir.path().join("historial.json");

        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            form: FormSettings {
                schema_path,
                history_path: history_path.clone(),
                title: "Integration form".to_string(),
            },
            remote: RemoteSettings {
                timeout_seconds: Some(5),
            },
        };

        let state = jsonform::build_state(&settings).unwrap();
        let addr = spawn(jsonform::create_app(state)).await;

        TestServer {
            addr,
            base_url: format!("http://{}", addr),
            history_path,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

type Received = Arc<Mutex<Vec<Value>>>;

async fn accept(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::OK
}

async fn created(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::CREATED
}

async fn fail(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Stand-in for the external endpoint submissions are forwarded to.
///
/// `POST /ok` answers 200, `POST /created` answers 201 and `POST /fail`
/// answers 500; every received body is recorded.
pub struct RemoteStub {
    pub base_url: String,
    pub received: Received,
}

impl RemoteStub {
    pub async fn new() -> Self {
        let received: Received = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/ok", post(accept))
            .route("/created", post(created))
            .route("/fail", post(fail))
            .with_state(received.clone());

        let addr = spawn(app).await;
        RemoteStub {
            base_url: format!("http://{}", addr),
            received,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}
