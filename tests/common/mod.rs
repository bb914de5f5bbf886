#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

use jobly_api::auth::{create_token, hash_password};
use jobly_api::config::AppConfig;
use jobly_api::database::schema;
use jobly_api::{app, AppState};

/// A running app on an ephemeral port, backed by its own PostgreSQL schema
/// seeded with companies c1-c3, jobs j1-j3 and users u1-u3 (u2 is the admin).
pub struct TestApp {
    pub base_url: String,
    pub pool: PgPool,
    pub config: AppConfig,
    pub client: Client,
    pub job_ids: Vec<i32>,
    pub u1_token: String,
    pub u2_token: String,
    pub admin_token: String,
    schema: String,
    admin_pool: PgPool,
    server: JoinHandle<()>,
}

fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

/// Start an isolated app, or `None` when no database is reachable
pub async fn spawn_app() -> Result<Option<TestApp>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let Some(url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL to run database tests");
        return Ok(None);
    };

    let admin_pool = match PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("skipping: database unavailable at {}: {}", url, e);
            return Ok(None);
        }
    };

    let schema_name = format!("test_{}", Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema_name))
        .execute(&admin_pool)
        .await?;

    let options = PgConnectOptions::from_str(&url)?.options([("search_path", schema_name.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to connect test pool")?;

    let config = AppConfig::testing();
    schema::apply(&pool).await?;
    let job_ids = seed(&pool, &config).await?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let router = app(AppState::new(pool.clone(), config.clone()));
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let u1_token = create_token("u1", false, &config.security)?;
    let u2_token = create_token("u2", true, &config.security)?;

    Ok(Some(TestApp {
        base_url,
        pool,
        client: Client::new(),
        job_ids,
        u1_token,
        admin_token: u2_token.clone(),
        u2_token,
        config,
        schema: schema_name,
        admin_pool,
        server,
    }))
}

async fn seed(pool: &PgPool, config: &AppConfig) -> Result<Vec<i32>> {
    for n in 1..=3 {
        sqlx::query(
            "INSERT INTO companies (handle, name, num_employees, description, logo_url)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(format!("c{}", n))
        .bind(format!("C{}", n))
        .bind(n)
        .bind(format!("Desc{}", n))
        .bind(format!("http://c{}.img", n))
        .execute(pool)
        .await?;
    }

    let mut job_ids = Vec::new();
    for n in 1..=3 {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3::numeric, $4)
             RETURNING id",
        )
        .bind(format!("j{}", n))
        .bind(n * 100_000)
        .bind(format!("0.{}", n))
        .bind(format!("c{}", n))
        .fetch_one(pool)
        .await?;
        job_ids.push(id);
    }

    for n in 1..=3 {
        sqlx::query(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(format!("u{}", n))
        .bind(hash_password(&format!("password{}", n), config.security.bcrypt_cost)?)
        .bind(format!("U{}F", n))
        .bind(format!("U{}L", n))
        .bind(format!("user{}@user.com", n))
        .bind(n == 2)
        .execute(pool)
        .await?;
    }

    Ok(job_ids)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Stop the server and drop the schema
    pub async fn cleanup(self) -> Result<()> {
        self.server.abort();
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", self.schema))
            .execute(&self.admin_pool)
            .await?;
        Ok(())
    }
}

/// Send a request and return status plus JSON body (`Null` when empty)
pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Value)> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}
