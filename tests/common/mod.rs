#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use cernn_links::{
    AppConfig, AppState,
    auth::{AuthenticatorState, MockAuthenticator},
    classifier::{ClockState, MockProbe, ProbeState, TokioClock},
    models::{AccessLevel, Link, LinkForm, LinkId, LoginRequest},
    repository::RepositoryState,
};
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "cernn2025";

// --- Fixtures ---

pub fn link(id: i64, titulo: &str, departamento: Option<&str>, tipo_acesso: AccessLevel) -> Link {
    Link {
        id: LinkId::Number(id),
        titulo: titulo.to_string(),
        url: format!("https://example.org/{id}"),
        departamento: departamento.map(str::to_string),
        tipo_acesso,
    }
}

/// Same as [`link`] for a Link API that hands out string ids.
pub fn text_link(id: &str, titulo: &str, departamento: Option<&str>, tipo_acesso: AccessLevel) -> Link {
    Link {
        id: LinkId::Text(id.to_string()),
        ..link(0, titulo, departamento, tipo_acesso)
    }
}

/// String ids, one of them made only of digits and one that is not a
/// valid single path segment.
pub fn text_id_links() -> Vec<Link> {
    vec![
        text_link("42", "Ramais", Some("TI"), AccessLevel::Internal),
        text_link("lnk-7", "Intranet", Some("RH"), AccessLevel::Public),
        text_link("a/b", "Escala", Some("RH"), AccessLevel::Internal),
    ]
}

pub fn sample_links() -> Vec<Link> {
    vec![
        link(10, "Chamados", Some("TI"), AccessLevel::Internal),
        link(11, "Site", Some("Comunicação"), AccessLevel::Public),
        link(12, "Folha", Some("RH"), AccessLevel::Internal),
        link(13, "Wiki", None, AccessLevel::Public),
    ]
}

// Creates an AppState from mock components.
pub fn test_state(repo: RepositoryState, probe: MockProbe) -> AppState {
    AppState {
        repo,
        auth: Arc::new(MockAuthenticator::new(ADMIN_PASSWORD)) as AuthenticatorState,
        probe: Arc::new(probe) as ProbeState,
        clock: Arc::new(TokioClock) as ClockState,
        config: AppConfig::default(),
    }
}

// --- Stub upstream (Link API + Auth API + probe targets) ---

#[derive(Clone, Default)]
pub struct StubData {
    pub links: Arc<Mutex<Vec<Link>>>,
    pub next_id: Arc<Mutex<i64>>,
}

pub struct StubApi {
    pub address: String,
    pub data: StubData,
}

impl StubApi {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.address.clone(),
            probe_url: format!("{}/probe/ok", self.address),
            ..AppConfig::default()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn links(&self) -> Vec<Link> {
        self.data.links.lock().unwrap().clone()
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn stub_list(State(data): State<StubData>) -> Json<Vec<Link>> {
    Json(data.links.lock().unwrap().clone())
}

async fn stub_create(State(data): State<StubData>, Json(form): Json<LinkForm>) -> Response {
    if form.titulo.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Título é obrigatório");
    }
    let mut next_id = data.next_id.lock().unwrap();
    *next_id += 1;
    let link = Link {
        id: LinkId::Number(*next_id),
        titulo: form.titulo,
        url: form.url,
        departamento: Some(form.departamento),
        tipo_acesso: form.tipo_acesso,
    };
    data.links.lock().unwrap().push(link.clone());
    (StatusCode::CREATED, Json(link)).into_response()
}

async fn stub_update(
    State(data): State<StubData>,
    Path(id): Path<String>,
    Json(form): Json<LinkForm>,
) -> Response {
    let mut links = data.links.lock().unwrap();
    match links.iter_mut().find(|l| l.id.to_string() == id) {
        Some(slot) => {
            slot.titulo = form.titulo;
            slot.url = form.url;
            slot.departamento = Some(form.departamento);
            slot.tipo_acesso = form.tipo_acesso;
            Json(slot.clone()).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, "Link não encontrado"),
    }
}

async fn stub_delete(State(data): State<StubData>, Path(id): Path<String>) -> StatusCode {
    let mut links = data.links.lock().unwrap();
    let before = links.len();
    links.retain(|l| l.id.to_string() != id);
    if links.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn stub_login(Json(body): Json<LoginRequest>) -> StatusCode {
    if body.password == ADMIN_PASSWORD {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

/// Binds a stub of every upstream the application talks to on a random port.
pub async fn spawn_stub_api(links: Vec<Link>) -> StubApi {
    let next_id = links
        .iter()
        .filter_map(|l| match l.id {
            LinkId::Number(n) => Some(n),
            LinkId::Text(_) => None,
        })
        .max()
        .unwrap_or(0);

    let data = StubData {
        links: Arc::new(Mutex::new(links)),
        next_id: Arc::new(Mutex::new(next_id)),
    };

    let router = Router::new()
        .route("/api/links", get(stub_list).post(stub_create))
        .route("/api/links/{id}", axum::routing::put(stub_update).delete(stub_delete))
        .route("/api/login", axum::routing::post(stub_login))
        .route("/probe/ok", get(|| async { "pong" }))
        .route(
            "/probe/error",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/probe/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .with_state(data.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    StubApi { address, data }
}

/// Address on which nothing is listening.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

// --- Router helpers ---

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` part of the session cookie set by the response, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Logs in through the router and returns the authenticated session cookie.
pub async fn login(app: &Router) -> String {
    let response = send(
        app,
        form_request("/login", &format!("password={ADMIN_PASSWORD}"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin"));
    session_cookie(&response).expect("login must set a session cookie")
}
