//! services/api/src/web/admin.rs
//!
//! Reporting views over the analytics log. Both routes sit behind
//! `require_admin`.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use site_core::csv::format_timestamp;
use site_core::domain::AnalyticsEvent;
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;

/// Escapes text for embedding in HTML element content or attribute values.
pub fn html_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Visitor Analytics</title>
    <style>
      body { font-family: Arial, sans-serif; margin: 24px; color: #111827; background: #f8fafc; }
      h1 { margin-bottom: 8px; }
      p { margin-top: 0; color: #475569; }
      a { color: #0f766e; }
      table { width: 100%; border-collapse: collapse; background: white; }
      th, td { border: 1px solid #e2e8f0; padding: 10px; text-align: left; vertical-align: top; font-size: 14px; }
      th { background: #e2e8f0; position: sticky; top: 0; }
      .wrap { overflow-x: auto; border: 1px solid #e2e8f0; }
    </style>
  </head>
  <body>
    <h1>Visitor Analytics</h1>
"#;

const TABLE_HEAD: &str = r#"    <div class="wrap">
      <table>
        <thead>
          <tr>
            <th>Timestamp</th>
            <th>Event</th>
            <th>Page</th>
            <th>Section</th>
            <th>Button Id</th>
            <th>Button Label</th>
            <th>IP</th>
            <th>Location</th>
            <th>Referrer</th>
            <th>User Agent</th>
          </tr>
        </thead>
        <tbody>
"#;

const PAGE_TAIL: &str = r#"        </tbody>
      </table>
    </div>
  </body>
</html>
"#;

/// Renders the events, in the order given, as a static HTML page.
pub fn render_admin_html(events: &[AnalyticsEvent]) -> String {
    let mut html = String::from(PAGE_HEAD);
    html.push_str(&format!(
        "    <p>Showing the most recent {} events. <a href=\"/admin/export\">Download CSV</a></p>\n",
        events.len()
    ));
    html.push_str(TABLE_HEAD);

    for event in events {
        let cells = [
            format_timestamp(&event.timestamp),
            event.event_type.to_string(),
            event.page_path.clone(),
            event.section_id.clone(),
            event.button_id.clone(),
            event.button_label.clone(),
            event.ip_address.clone(),
            event.location.clone(),
            event.referrer.clone(),
            event.user_agent.clone(),
        ];
        html.push_str("          <tr>\n");
        for cell in &cells {
            html.push_str(&format!("            <td>{}</td>\n", html_escape(cell)));
        }
        html.push_str("          </tr>\n");
    }

    html.push_str(PAGE_TAIL);
    html
}

/// Keeps a file name safe to place inside a quoted header parameter.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "visits.csv".to_string()
    } else {
        cleaned
    }
}

/// GET /admin - The most recent events as an HTML table, newest first.
pub async fn admin_dashboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let events = state
        .analytics
        .recent(state.config.admin_event_limit)
        .await
        .map_err(|e| {
            error!("Failed to load analytics: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load analytics".to_string(),
            )
        })?;

    Ok(Html(render_admin_html(&events)))
}

/// GET /admin/export - The raw analytics log as a CSV download.
pub async fn admin_export_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let csv = state.analytics.export().await.map_err(|e| {
        error!("Failed to export analytics: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to export analytics".to_string(),
        )
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&state.analytics.export_file_name())
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
