//! Integration tests for login relocation, driven through the full gateway.

use http::StatusCode;
use lockdown_gateway::config::{ConfigLoader, GatewayConfig};
use lockdown_gateway::modules::login_guard::SiteUrls;
use lockdown_gateway::pipeline::{RequestDescriptor, Response};
use lockdown_gateway::store::MemoryPolicyStore;
use lockdown_gateway::Gateway;
use std::sync::Arc;
use tempfile::tempdir;

fn gateway_with(custom: &str, redirect: &str) -> Gateway {
    let mut config = GatewayConfig::default();
    config.site.urls = SiteUrls::new("https://example.com");

    let gateway = Gateway::builder(config)
        .store(Arc::new(MemoryPolicyStore::new()))
        .dispatch(Arc::new(|request: &RequestDescriptor| {
            Response::ok().body(format!("app {}", request.path())).build()
        }))
        .login_page(Arc::new(|request: &RequestDescriptor| {
            Response::ok().body(format!("login {}", request.path())).build()
        }))
        .build()
        .unwrap();

    let settings = gateway.settings();
    settings.set_login_page_url(custom).unwrap();
    settings.set_redirect_url(redirect).unwrap();
    gateway
}

fn send(gateway: &Gateway, raw: &str) -> Response {
    gateway.handle_bytes(raw.as_bytes()).unwrap()
}

#[test]
fn test_reset_get_redirects_with_query_verbatim() {
    let gateway = gateway_with("secure-entry", "404");
    let response = send(
        &gateway,
        "GET /wp-login.php?action=rp&key=a%2Bb&login=bob HTTP/1.1\r\nHost: example.com\r\n\r\n",
    );

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.location(),
        Some("https://example.com/secure-entry?action=rp&key=a%2Bb&login=bob")
    );
}

#[test]
fn test_reset_post_passes_through() {
    let gateway = gateway_with("secure-entry", "404");
    let body = "user_login=bob";
    let raw = format!(
        "POST /wp-login.php?action=rp HTTP/1.1\r\nHost: example.com\r\n\
         Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let response = send(&gateway, &raw);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"app /wp-login.php");
}

#[test]
fn test_login_post_passes_through() {
    let gateway = gateway_with("secure-entry", "");
    let body = "log=bob&pwd=secret";
    let raw = format!(
        "POST /wp-login.php HTTP/1.1\r\nHost: example.com\r\n\
         Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );

    assert_eq!(send(&gateway, &raw).status(), StatusCode::OK);
}

#[test]
fn test_plain_get_redirects_to_site_root() {
    let gateway = gateway_with("secure-entry", "");
    let response = send(
        &gateway,
        "GET /wp-login.php?redirect_to=%2Fwp-admin HTTP/1.1\r\nHost: example.com\r\n\r\n",
    );

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.location(), Some("https://example.com"));
}

#[test]
fn test_plain_get_redirects_to_configured_path() {
    let gateway = gateway_with("secure-entry", "/404/");
    let response = send(&gateway, "GET /wp-login.php HTTP/1.1\r\n\r\n");

    assert_eq!(response.location(), Some("https://example.com/404"));
}

#[test]
fn test_custom_slug_exact_match_only() {
    let gateway = gateway_with("secure-entry", "");

    for target in ["/secure-entry", "/secure-entry/"] {
        let response = send(&gateway, &format!("GET {target} HTTP/1.1\r\n\r\n"));
        assert_eq!(response.body().as_ref(), format!("login {target}").as_bytes());
    }

    for target in ["/secure-entryextra", "/secure-entry/extra", "/x/secure-entry"] {
        let response = send(&gateway, &format!("GET {target} HTTP/1.1\r\n\r\n"));
        assert_eq!(response.body().as_ref(), format!("app {target}").as_bytes());
    }
}

#[test]
fn test_disabled_leaves_legacy_login_alone() {
    let gateway = gateway_with("", "404");
    let response = send(&gateway, "GET /wp-login.php HTTP/1.1\r\n\r\n");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"app /wp-login.php");
}

#[test]
fn test_url_and_message_rewriting() {
    let gateway = gateway_with("secure-entry", "");
    let guard = gateway.login_guard().unwrap();

    assert!(guard
        .rewrite_site_url("https://example.com/wp-login.php")
        .ends_with("secure-entry"));
    assert_eq!(
        guard.rewrite_site_url("https://example.com/wp-admin/"),
        "https://example.com/wp-admin/"
    );

    let message = "Reset your password:\n\
                   <https://example.com/wp-login.php?action=rp&key=k&login=bob>";
    let once = guard.rewrite_reset_message(message);
    assert_eq!(
        once,
        "Reset your password:\n<https://example.com/secure-entry?action=rp&key=k&login=bob>"
    );
    assert_eq!(guard.rewrite_reset_message(&once), once);
}

#[test]
fn test_settings_survive_restart() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("lockdown.toml");
    let store_path = dir.path().join("policy.json");
    std::fs::write(
        &config_path,
        format!(
            "[site]\nsite_url = \"https://example.com\"\nhome_url = \"https://example.com\"\n\n\
             [store]\npath = \"{}\"\n",
            store_path.display()
        ),
    )
    .unwrap();

    let config = ConfigLoader::with_defaults().load(&config_path).unwrap();
    let gateway = Gateway::builder(config.clone()).build().unwrap();
    gateway.settings().set_login_page_url("/secure-entry/").unwrap();
    drop(gateway);

    let gateway = Gateway::builder(config).build().unwrap();
    let response = send(&gateway, "GET /wp-login.php HTTP/1.1\r\n\r\n");
    assert_eq!(response.location(), Some("https://example.com"));
    assert_eq!(
        gateway.settings().login_page_url().unwrap().as_deref(),
        Some("secure-entry")
    );
}
