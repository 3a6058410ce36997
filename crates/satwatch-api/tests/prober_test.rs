#![allow(clippy::unwrap_used)]
// Integration tests for `HttpProber` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use rcgen::CertifiedKey;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use satwatch_api::{HttpProber, ProbeErrorKind, TransportConfig, normalize};

// ── Helpers ─────────────────────────────────────────────────────────

fn prober(timeout: Duration) -> HttpProber {
    HttpProber::new(&TransportConfig::default().with_timeout(timeout)).unwrap()
}

async fn server_returning(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

/// TLS acceptor with a freshly generated self-signed certificate, the
/// way a router's admin page presents itself.
fn self_signed_acceptor() -> TlsAcceptor {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["router.lan".to_owned()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(vec![cert.der().clone()], key)
    .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Serve `status` to every request over self-signed HTTPS. Returns the
/// `https://` address.
async fn https_server_returning(status: u16) -> String {
    let acceptor = self_signed_acceptor();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };
                let mut buf = vec![0_u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status} Status\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    format!("https://127.0.0.1:{port}")
}

// ── Status classification ───────────────────────────────────────────

#[tokio::test]
async fn test_ok_is_up() {
    let server = server_returning(200).await;
    let origin = normalize(&server.uri()).unwrap();

    let response = prober(Duration::from_secs(5)).probe(&origin).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_up());
}

#[tokio::test]
async fn test_redirect_without_location_is_up() {
    let server = server_returning(301).await;
    let origin = normalize(&server.uri()).unwrap();

    let response = prober(Duration::from_secs(5)).probe(&origin).await.unwrap();

    assert_eq!(response.status, 301);
    assert!(response.is_up());
}

#[tokio::test]
async fn test_error_statuses_are_down_but_not_errors() {
    for status in [404, 500, 503] {
        let server = server_returning(status).await;
        let origin = normalize(&server.uri()).unwrap();

        let response = prober(Duration::from_secs(5)).probe(&origin).await.unwrap();

        assert_eq!(response.status, status);
        assert!(!response.is_up(), "{status} should classify as down");
    }
}

#[tokio::test]
async fn test_probe_hits_configured_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/luci"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let address = format!("{}/cgi-bin/luci", server.uri());
    let response = prober(Duration::from_secs(5))
        .probe(&normalize(&address).unwrap())
        .await
        .unwrap();

    assert!(response.is_up());
}

// ── Self-signed HTTPS ───────────────────────────────────────────────

#[tokio::test]
async fn test_self_signed_https_ok_is_up() {
    let address = https_server_returning(200).await;
    let origin = normalize(&address).unwrap();
    assert_eq!(origin.url().scheme(), "https");

    let response = prober(Duration::from_secs(5)).probe(&origin).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_up());
}

#[tokio::test]
async fn test_self_signed_https_error_status_is_down_not_transport_error() {
    let address = https_server_returning(503).await;
    let origin = normalize(&address).unwrap();

    let response = prober(Duration::from_secs(5)).probe(&origin).await.unwrap();

    assert_eq!(response.status, 503);
    assert!(!response.is_up());
}

#[tokio::test]
async fn test_https_against_plain_http_is_connect_error() {
    let server = server_returning(200).await;
    let address = server.uri().replacen("http://", "https://", 1);
    let origin = normalize(&address).unwrap();

    let err = prober(Duration::from_secs(5)).probe(&origin).await.unwrap_err();

    assert_eq!(err.kind, ProbeErrorKind::Connect, "got {err}");
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_connection_refused_is_connect_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let origin = normalize(&format!("127.0.0.1:{port}")).unwrap();
    let err = prober(Duration::from_secs(5)).probe(&origin).await.unwrap_err();

    assert_eq!(err.kind, ProbeErrorKind::Connect, "got {err}");
    assert!(err.is_connect());
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let origin = normalize(&server.uri()).unwrap();
    let err = prober(Duration::from_millis(100))
        .probe(&origin)
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err}");
}
