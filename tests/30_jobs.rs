mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{send, TestApp};

fn job(app: &TestApp, n: usize) -> Value {
    json!({
        "id": app.job_ids[n - 1],
        "title": format!("j{}", n),
        "salary": n * 100_000,
        "equity": format!("0.{}", n),
        "companyHandle": format!("c{}", n),
    })
}

#[tokio::test]
async fn create_job_as_admin() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    let (status, body) = send(
        app.post("/jobs")
            .bearer_auth(&app.admin_token)
            .json(&json!({ "title": "New Job", "salary": 60000, "equity": 0.05, "companyHandle": "c1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["job"]["id"].is_i64());
    assert_eq!(body["job"]["title"], "New Job");
    assert_eq!(body["job"]["salary"], 60000);
    assert_eq!(body["job"]["equity"], "0.05");
    assert_eq!(body["job"]["companyHandle"], "c1");

    app.cleanup().await
}

#[tokio::test]
async fn create_job_rejections() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    let body = json!({ "title": "New", "salary": 100000, "equity": 0.1, "companyHandle": "c1" });
    let (status, _) = send(app.post("/jobs").bearer_auth(&app.u1_token).json(&body)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app.post("/jobs")
            .bearer_auth(&app.admin_token)
            .json(&json!({ "title": "New", "salary": 100000 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app.post("/jobs")
            .bearer_auth(&app.admin_token)
            .json(&json!({ "title": "New", "salary": "not-a-number", "equity": 0.1, "companyHandle": "c1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app.post("/jobs")
            .bearer_auth(&app.admin_token)
            .json(&json!({ "title": "j1", "salary": 100000, "equity": "0.1", "companyHandle": "c1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Duplicate job: j1");

    let (status, body) = send(
        app.post("/jobs")
            .bearer_auth(&app.admin_token)
            .json(&json!({ "title": "Orphan", "companyHandle": "nope" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No company: nope");

    app.cleanup().await
}

#[tokio::test]
async fn list_jobs() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    let (status, body) = send(app.get("/jobs")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "jobs": [job(&app, 1), job(&app, 2), job(&app, 3)] }));

    let (_, body) = send(app.get("/jobs?minSalary=250000")).await?;
    assert_eq!(body, json!({ "jobs": [job(&app, 3)] }));

    let (_, body) = send(app.get("/jobs?title=J1")).await?;
    assert_eq!(body, json!({ "jobs": [job(&app, 1)] }));

    let (_, body) = send(app.get("/jobs?companyHandle=c2")).await?;
    assert_eq!(body, json!({ "jobs": [job(&app, 2)] }));

    let (status, _) = send(app.get("/jobs?minSalary=-1")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.cleanup().await
}

#[tokio::test]
async fn has_equity_only_narrows_when_true() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    sqlx::query("INSERT INTO jobs (title, salary, equity, company_handle) VALUES ('j4', NULL, 0, 'c1')")
        .execute(&app.pool)
        .await?;

    let (_, body) = send(app.get("/jobs?hasEquity=true")).await?;
    assert_eq!(body, json!({ "jobs": [job(&app, 1), job(&app, 2), job(&app, 3)] }));

    let (_, body) = send(app.get("/jobs?hasEquity=false")).await?;
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(4));

    app.cleanup().await
}

#[tokio::test]
async fn get_job() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };

    let (status, body) = send(app.get(&format!("/jobs/{}", app.job_ids[0]))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "job": job(&app, 1) }));

    let (status, body) = send(app.get("/jobs/9999")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "No job: 9999");

    let (status, _) = send(app.get("/jobs/not-a-number")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.cleanup().await
}

#[tokio::test]
async fn update_job() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let path = format!("/jobs/{}", app.job_ids[0]);

    let (status, body) = send(
        app.patch(&path)
            .bearer_auth(&app.admin_token)
            .json(&json!({ "title": "Updated Title", "salary": 120000 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "job": {
                "id": app.job_ids[0],
                "title": "Updated Title",
                "salary": 120000,
                "equity": "0.1",
                "companyHandle": "c1",
            }
        })
    );

    let (status, body) = send(app.patch(&path).bearer_auth(&app.admin_token).json(&json!({ "equity": null }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["equity"], Value::Null);

    let (status, _) = send(app.patch(&path).bearer_auth(&app.u1_token).json(&json!({ "title": "x" }))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app.patch(&path)
            .bearer_auth(&app.admin_token)
            .json(&json!({ "companyHandle": "c2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app.patch(&path).bearer_auth(&app.admin_token).json(&json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app.patch("/jobs/9999").bearer_auth(&app.admin_token).json(&json!({ "title": "No Job" }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.cleanup().await
}

#[tokio::test]
async fn delete_job() -> Result<()> {
    let Some(app) = common::spawn_app().await? else { return Ok(()) };
    let path = format!("/jobs/{}", app.job_ids[0]);

    let (status, _) = send(app.delete(&path).bearer_auth(&app.u1_token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app.delete(&path).bearer_auth(&app.admin_token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "deleted": app.job_ids[0] }));

    let (status, _) = send(app.delete(&path).bearer_auth(&app.admin_token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.cleanup().await
}
