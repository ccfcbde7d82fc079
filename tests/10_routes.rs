mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};

use common::{client, ensure_server};

#[tokio::test]
async fn health_reports_database_state() -> Result<()> {
    let server = ensure_server().await?;
    let resp = client().get(server.url("/health")).send().await?;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn home_page_is_html_with_security_headers() -> Result<()> {
    let server = ensure_server().await?;
    let resp = client().get(server.url("/")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    assert!(headers[header::CONTENT_TYPE].to_str()?.starts_with("text/html"));
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    let body = resp.text().await?;
    assert!(body.contains("href=\"/login\""));
    Ok(())
}

#[tokio::test]
async fn protected_pages_redirect_to_login() -> Result<()> {
    let server = ensure_server().await?;
    for (path, expected) in [
        ("/stuff", "/login?returnTo=%2Fstuff"),
        ("/categories", "/login?returnTo=%2Fcategories"),
        ("/profile", "/login?returnTo=%2Fprofile"),
    ] {
        let resp = client().get(server.url(path)).send().await?;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(resp.headers()[header::LOCATION], expected, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn forms_posted_without_session_never_reach_store() -> Result<()> {
    let server = ensure_server().await?;
    let resp = client()
        .post(server.url("/stuff"))
        .form(&[("name", "Widget"), ("quantity", "3")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn authtest_and_forged_session() -> Result<()> {
    let server = ensure_server().await?;
    let resp = client().get(server.url("/authtest")).send().await?;
    assert_eq!(resp.text().await?, "Logged out");

    let resp = client()
        .get(server.url("/authtest"))
        .header(header::COOKIE, "app_session=eyJhbGciOiJIUzI1NiJ9.e30.forged")
        .send()
        .await?;
    assert_eq!(resp.text().await?, "Logged out");
    Ok(())
}

#[tokio::test]
async fn callback_without_login_is_unauthorized() -> Result<()> {
    let server = ensure_server().await?;
    let resp = client()
        .post(server.url("/callback"))
        .form(&[("id_token", "abc"), ("state", "xyz")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn stylesheet_is_served() -> Result<()> {
    let server = ensure_server().await?;
    let resp = client().get(server.url("/styles.css")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}
