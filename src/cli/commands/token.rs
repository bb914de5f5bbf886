use serde_json::json;

use crate::auth::create_token;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;

pub fn handle(username: &str, admin: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let token = create_token(username, admin, &config().security)?;
    match output_format {
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            output_format,
            &format!("Token issued for {}", username),
            Some(json!({ "token": token, "username": username, "isAdmin": admin })),
        ),
    }
}
