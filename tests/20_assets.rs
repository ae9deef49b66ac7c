mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn cctv_insert_is_mirrored_to_genunits() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let res = server
        .post("/api/cctvs", &token)
        .json(&json!({
            "name": "cam lobby",
            "ip": "10.0.0.21",
            "location": "Lobby",
            "brand": "Hikvision",
            "cctv_type": "dome",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cctv = res.json::<Value>().await?["data"].clone();
    let id = cctv["_id"].as_str().unwrap_or_default().to_string();
    assert_eq!(cctv["name"], "CAM LOBBY");
    assert_eq!(cctv["branch"], common::ADMIN_BRANCH);
    assert_eq!(cctv["created_by"], common::ADMIN);

    let res = server.get(&format!("/api/genunits/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let unit = res.json::<Value>().await?["data"].clone();
    assert_eq!(unit["category"], "CCTV");
    assert_eq!(unit["name"], "CAM LOBBY");
    assert_eq!(unit["ip"], "10.0.0.21");

    // Edit needs the last-read timestamp and renames the mirror too
    let res = server
        .put(&format!("/api/cctvs/{}", id), &token)
        .json(&json!({
            "filter_timestamp": cctv["updated_at"],
            "name": "cam entrance",
            "ip": "10.0.0.22",
            "location": "Entrance",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let unit = server
        .get(&format!("/api/genunits/{}", id), &token)
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    assert_eq!(unit["name"], "CAM ENTRANCE");
    assert_eq!(unit["ip"], "10.0.0.22");

    let res = server.delete(&format!("/api/cctvs/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server.get(&format!("/api/genunits/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn stale_edit_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let created = server
        .post("/api/computers", &token)
        .json(&json!({ "name": "pc-01", "hostname": "PC01", "client_type": "PC" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    let id = created["_id"].as_str().unwrap_or_default().to_string();
    let stamp = created["updated_at"].as_i64().unwrap_or_default();

    let res = server
        .put(&format!("/api/computers/{}", id), &token)
        .json(&json!({ "name": "pc-01", "hostname": "PC01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .put(&format!("/api/computers/{}", id), &token)
        .json(&json!({ "filter_timestamp": stamp - 1, "name": "pc-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_asset_reports_field_errors() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let res = server
        .post("/api/others", &token)
        .json(&json!({ "name": "", "ip": "not-an-ip", "sub_category": "cctv" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    let fields = &body["field_errors"];
    assert!(fields.get("name").is_some());
    assert!(fields.get("ip").is_some());
    assert!(fields.get("sub_category").is_some());
    Ok(())
}

#[tokio::test]
async fn other_branch_cannot_touch_asset() -> Result<()> {
    let server = common::spawn_server().await?;
    let admin = server.admin_token().await?;
    let outsider = server.user_token(&admin, "joko", "BRANCH C", &["normal"]).await?;

    let created = server
        .post("/api/others", &admin)
        .json(&json!({ "name": "altai ap 1", "sub_category": "altai" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    let id = created["_id"].as_str().unwrap_or_default().to_string();

    let res = server
        .put(&format!("/api/others/{}/disable", id), &outsider)
        .json(&json!({ "disable": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.delete(&format!("/api/others/{}", id), &outsider).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let unit = server
        .get(&format!("/api/genunits/{}", id), &admin)
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    assert_eq!(unit["category"], "ALTAI");
    assert_eq!(unit["disable"], false);
    Ok(())
}

#[tokio::test]
async fn pings_update_units_and_report_failures() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let created = server
        .post("/api/cctvs", &token)
        .json(&json!({ "name": "cam parking", "ip": "10.0.0.30" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    let id = created["_id"].as_str().unwrap_or_default().to_string();

    let res = server
        .put("/api/admin/genunits/pings", &token)
        .json(&json!([
            { "id": id, "code": 1 },
            { "id": "000000000000000000000000", "code": 0 },
        ]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let report = res.json::<Value>().await?["data"].clone();
    assert_eq!(report["updated"], 1);
    assert_eq!(report["failed"].as_array().map(Vec::len), Some(1));

    let unit = server
        .get(&format!("/api/genunits/{}", id), &token)
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    assert_eq!(unit["pings_state"][0]["code"], 1);
    assert!(unit["last_ping"].as_i64().unwrap_or_default() > 0);
    Ok(())
}
