mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_reports_memory_backend() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "memory");
    Ok(())
}

#[tokio::test]
async fn login_returns_tokens_and_user() -> Result<()> {
    let server = common::spawn_server().await?;

    let body = server.login(common::ADMIN, common::ADMIN_PASSWORD).await?;
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(body["data"]["access_token"].as_str().is_some());
    assert!(body["data"]["refresh_token"].as_str().is_some());
    assert_eq!(body["data"]["user"]["id"], common::ADMIN);
    assert!(body["data"]["user"].get("hashed_password").is_none());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": common::ADMIN, "password": "nope" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn api_requires_bearer_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/api/cctvs")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/api/cctvs", "not-a-jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_token_yields_non_fresh_access_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let login = server.login(common::ADMIN, common::ADMIN_PASSWORD).await?;
    let refresh = login["data"]["refresh_token"].as_str().unwrap_or_default().to_string();

    // A refresh token is not accepted as an access token
    let res = server.get("/api/users/me", &refresh).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/auth/refresh"))
        .bearer_auth(&refresh)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let access = body["data"]["access_token"].as_str().unwrap_or_default().to_string();

    let res = server.get("/api/users/me", &access).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Password change needs a token from a password login
    let res = server
        .put("/api/users/me/password", &access)
        .json(&json!({ "old_password": common::ADMIN_PASSWORD, "new_password": "changed-pass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_regular_users() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.admin_token().await?;
    let user = server.user_token(&admin, "budi", "BRANCH A", &["normal"]).await?;

    let res = server
        .post("/api/admin/users", &user)
        .json(&json!({
            "id": "mallory",
            "name": "Mallory",
            "roles": ["admin"],
            "branch": "BRANCH A",
            "password": "secret-pass",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.put("/api/admin/genunits/pings", &user).json(&json!([])).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get("/api/users/me", &user).send().await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["branch"], "BRANCH A");
    assert_eq!(body["data"]["roles"], json!(["NORMAL"]));
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.admin_token().await?;
    server.user_token(&admin, "siti", "BRANCH B", &["normal"]).await?;

    let res = server
        .post("/api/admin/users", &admin)
        .json(&json!({
            "id": "siti",
            "name": "Siti",
            "roles": ["normal"],
            "branch": "BRANCH B",
            "password": "secret-pass",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}
