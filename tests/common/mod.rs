#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use branch_asset_api::config::AppConfig;
use branch_asset_api::{app, AppState};

pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_BRANCH: &str = "HEAD OFFICE";

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

/// Serves the app over fresh in-memory stores on an ephemeral port
pub async fn spawn_server() -> Result<TestServer> {
    let config = AppConfig::development();
    let state = AppState::memory(&config);
    state
        .users
        .bootstrap_admin(ADMIN, ADMIN_PASSWORD, ADMIN_BRANCH)
        .await
        .context("failed to bootstrap admin")?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;
    let router = app(&config, state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: Client::new(),
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Full login response body for the given credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(res.json::<Value>().await?)
    }

    pub async fn admin_token(&self) -> Result<String> {
        let body = self.login(ADMIN, ADMIN_PASSWORD).await?;
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    /// Registers a user through the admin API and returns their access token
    pub async fn user_token(&self, admin_token: &str, id: &str, branch: &str, roles: &[&str]) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/admin/users"))
            .bearer_auth(admin_token)
            .json(&json!({
                "id": id,
                "name": id,
                "roles": roles,
                "branch": branch,
                "password": "secret-pass",
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body = self.login(id, "secret-pass").await?;
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }
}
