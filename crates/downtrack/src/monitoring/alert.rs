//! HTML bodies for transition alerts.

use chrono::{DateTime, Utc};

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn down_alert(url: &str, detail: &str, at: DateTime<Utc>) -> String {
    format!(
        "<h2>🔴 Service Down Alert</h2>\
         <p>Your service <strong>{}</strong> is <strong>DOWN</strong>.</p>\
         <p>Error: {}</p>\
         <p>Time: {}</p>",
        escape(url),
        escape(detail),
        format_time(at)
    )
}

pub fn recovered_alert(url: &str, at: DateTime<Utc>) -> String {
    format!(
        "<h2>🟢 Service Recovered</h2>\
         <p>Your service <strong>{}</strong> is <strong>BACK UP</strong>.</p>\
         <p>Time: {}</p>",
        escape(url),
        format_time(at)
    )
}
