//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI document for the analytics, contact and admin routes.
//! Usage: `openapi [PATH]`, writing to `openapi.json` by default.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn write_document(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(path, json)?;
    println!("Wrote API document to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    write_document(&path)
}
