mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn stock_quantity_never_goes_negative() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let res = server
        .post("/api/stocks", &token)
        .json(&json!({ "name": "rj45 connector", "category": "network", "unit": "pcs", "quantity": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let stock = res.json::<Value>().await?["data"].clone();
    let id = stock["_id"].as_str().unwrap_or_default().to_string();
    assert_eq!(stock["name"], "RJ45 CONNECTOR");

    let res = server
        .post(&format!("/api/stocks/{}/decrement", id), &token)
        .json(&json!({ "qty": 3, "note": "patch panel" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["quantity"], 2);

    let res = server
        .post(&format!("/api/stocks/{}/decrement", id), &token)
        .json(&json!({ "qty": 3 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .post(&format!("/api/stocks/{}/increment", id), &token)
        .json(&json!({ "qty": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .post(&format!("/api/stocks/{}/increment", id), &token)
        .json(&json!({ "qty": 10 }))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["data"]["quantity"], 12);

    // Disabled stock cannot move
    let res = server
        .put(&format!("/api/stocks/{}/disable", id), &token)
        .json(&json!({ "disable": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server
        .post(&format!("/api/stocks/{}/increment", id), &token)
        .json(&json!({ "qty": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let res = server
        .post("/api/stocks", &token)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn history_status_drives_unit_cases() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.admin_token().await?;

    let cctv = server
        .post("/api/cctvs", &token)
        .json(&json!({ "name": "cam server room" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]
        .clone();
    let unit_id = cctv["_id"].as_str().unwrap_or_default().to_string();

    let res = server
        .post("/api/histories", &token)
        .json(&json!({ "parent_id": unit_id, "problem": "no signal", "complete_status": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let history = res.json::<Value>().await?["data"].clone();
    let history_id = history["_id"].as_str().unwrap_or_default().to_string();
    assert_eq!(history["category"], "CCTV");
    assert_eq!(history["parent_name"], "CAM SERVER ROOM");
    assert_eq!(history["branch"], common::ADMIN_BRANCH);

    let unit_cases = |body: Value| body["data"]["cases_size"].as_i64().unwrap_or_default();
    let unit = server.get(&format!("/api/genunits/{}", unit_id), &token).send().await?.json::<Value>().await?;
    assert_eq!(unit_cases(unit), 1);

    // Completing the history closes the case and stamps date_end
    let res = server
        .put(&format!("/api/histories/{}", history_id), &token)
        .json(&json!({
            "filter_timestamp": history["updated_at"],
            "problem": "no signal",
            "problem_resolve": "replaced cable",
            "complete_status": 4,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let edited = res.json::<Value>().await?["data"].clone();
    assert!(edited["date_end"].as_i64().unwrap_or_default() > 0);

    let unit = server.get(&format!("/api/genunits/{}", unit_id), &token).send().await?.json::<Value>().await?;
    assert_eq!(unit_cases(unit), 0);

    let res = server
        .post("/api/histories", &token)
        .json(&json!({ "parent_id": "missing", "problem": "x", "complete_status": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.delete(&format!("/api/histories/{}", history_id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
