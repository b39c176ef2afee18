// End-to-end tests for the HTTP backend and resolver against a simulated
// captive portal: the probe endpoint answers 503 until a POST arrives with
// the field names the portal accepts, then flips to 200.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use url::Url;

use portalwatch::backend::http::HttpBackend;
use portalwatch::config::{Credentials, PortalEndpoint};
use portalwatch::connectivity::{ConnectivityProbe, HttpProbe};
use portalwatch::resolver::{LoginResolver, ResolveOutcome};

#[derive(Clone)]
struct Portal {
    authenticated: Arc<AtomicBool>,
    username_key: &'static str,
    password_key: &'static str,
}

impl Portal {
    fn accepting(username_key: &'static str, password_key: &'static str) -> Self {
        Self {
            authenticated: Arc::new(AtomicBool::new(false)),
            username_key,
            password_key,
        }
    }
}

async fn probe_endpoint(State(portal): State<Portal>) -> StatusCode {
    if portal.authenticated.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn login_page() -> Html<&'static str> {
    Html(
        "<html><body><form method=\"post\">\
         <input type=\"text\" name=\"roll\"/>\
         <input type=\"password\" name=\"pwd\"/>\
         <input type=\"submit\" name=\"submit\"/>\
         </form></body></html>",
    )
}

async fn login_post(
    State(portal): State<Portal>,
    Form(fields): Form<HashMap<String, String>>,
) -> StatusCode {
    let username_ok = fields
        .get(portal.username_key)
        .is_some_and(|v| !v.is_empty());
    if username_ok && fields.contains_key(portal.password_key) {
        portal.authenticated.store(true, Ordering::SeqCst);
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    }
}

/// Serve the portal on an ephemeral port; POSTs are accepted on the login
/// page and on every derived variant path, like the real firmware.
async fn start_portal(portal: Portal) -> SocketAddr {
    let app = Router::new()
        .route("/probe", get(probe_endpoint))
        .route("/httpclient.html", get(login_page).post(login_post))
        .route("/login.html", post(login_post))
        .route("/", post(login_post))
        .route("/login", post(login_post))
        .with_state(portal);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn endpoint_for(addr: SocketAddr) -> PortalEndpoint {
    PortalEndpoint::new(Url::parse(&format!("http://{}/httpclient.html", addr)).unwrap())
}

fn probe_for(addr: SocketAddr) -> HttpProbe {
    HttpProbe::new(
        Url::parse(&format!("http://{}/probe", addr)).unwrap(),
        Duration::from_secs(2),
    )
    .unwrap()
}

fn credentials() -> Credentials {
    Credentials {
        username: "2100123".to_string(),
        password: "hostelwifi".to_string(),
    }
}

#[tokio::test]
async fn logs_in_with_fourth_catalog_pair() {
    // roll/pwd is entry #4 of the default catalog.
    let addr = start_portal(Portal::accepting("roll", "pwd")).await;
    let probe = probe_for(addr);

    // Captive state: the probe must report unreachable, not error.
    assert!(!probe.is_internet_reachable().await);

    let endpoint = endpoint_for(addr);
    let mut backend = HttpBackend::new(endpoint.clone()).unwrap();
    let mut resolver = LoginResolver::new(endpoint.field_catalog.clone(), Duration::ZERO);

    let outcome = resolver
        .resolve(&mut backend, &probe, &credentials())
        .await;

    assert_eq!(outcome, ResolveOutcome::Succeeded { attempts: 4 });
    assert!(probe.is_internet_reachable().await);
}

#[tokio::test]
async fn exhausts_catalog_when_portal_rejects_every_guess() {
    let addr = start_portal(Portal::accepting("sessionid", "secret")).await;
    let probe = probe_for(addr);

    let endpoint = endpoint_for(addr);
    let catalog_len = endpoint.field_catalog.len();
    let mut backend = HttpBackend::new(endpoint.clone()).unwrap();
    let mut resolver = LoginResolver::new(endpoint.field_catalog.clone(), Duration::ZERO);

    let outcome = resolver
        .resolve(&mut backend, &probe, &credentials())
        .await;

    assert_eq!(
        outcome,
        ResolveOutcome::Exhausted {
            attempts: catalog_len
        }
    );
    assert!(!probe.is_internet_reachable().await);
}

#[tokio::test]
async fn falls_back_to_variant_path_when_primary_rejects_posts() {
    // This firmware only takes the POST on /login.html; the configured
    // login URL serves the page but answers 405 to POST.
    let portal = Portal::accepting("username", "password");
    let app = Router::new()
        .route("/probe", get(probe_endpoint))
        .route("/httpclient.html", get(login_page))
        .route("/login.html", post(login_post))
        .with_state(portal);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let probe = probe_for(addr);
    let endpoint = endpoint_for(addr);
    let mut backend = HttpBackend::new(endpoint.clone()).unwrap();
    let mut resolver = LoginResolver::new(endpoint.field_catalog.clone(), Duration::ZERO);

    let outcome = resolver
        .resolve(&mut backend, &probe, &credentials())
        .await;

    assert_eq!(outcome, ResolveOutcome::Succeeded { attempts: 1 });
}

#[tokio::test]
async fn empty_credentials_never_authenticate() {
    let addr = start_portal(Portal::accepting("username", "password")).await;
    let probe = probe_for(addr);

    let endpoint = endpoint_for(addr);
    let mut backend = HttpBackend::new(endpoint.clone()).unwrap();
    let mut resolver = LoginResolver::new(endpoint.field_catalog.clone(), Duration::ZERO);

    let empty = Credentials {
        username: String::new(),
        password: String::new(),
    };
    let outcome = resolver.resolve(&mut backend, &probe, &empty).await;

    assert!(matches!(outcome, ResolveOutcome::Exhausted { .. }));
}
