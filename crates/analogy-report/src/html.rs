//! HTML attempt review page.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use analogy_core::export::{AttemptPayload, AttemptRow};
use analogy_core::model::ItemType;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Render an attempt as a standalone review page.
pub fn generate_html(payload: &AttemptPayload) -> String {
    let meta = &payload.meta;
    let score = payload.score();
    let rt = payload.response_time_stats();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>analogy attempt {}</title>\n",
        html_escape(&meta.attempt_id)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>analogy attempt</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Attempt: <strong>{}</strong> | bank {} | {} fixed + {} rotation | {} to {}</p>\n",
        html_escape(&meta.attempt_id),
        html_escape(meta.bank_version.as_deref().unwrap_or("unknown")),
        meta.assembled_counts.fixed,
        meta.assembled_counts.rotation,
        meta.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        meta.ended_at.format("%H:%M:%S UTC"),
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Raw score</th><th>Fixed correct</th><th>Rotation answered</th><th>Answered</th><th>Mean RT</th><th>Median RT</th><th>Min / Max RT</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}/{} ({:.1}%)</td><td>{}</td><td>{}/{}</td><td>{:.0}ms</td><td>{:.0}ms</td><td>{}ms / {}ms</td></tr></tbody>\n",
        score.raw(),
        score.fixed_correct,
        score.fixed_total,
        score.fixed_rate() * 100.0,
        score.rotation_answered,
        rt.answered,
        payload.responses.len(),
        rt.mean_ms,
        rt.median_ms,
        rt.min_ms,
        rt.max_ms,
    ));
    html.push_str("</table>\n");

    if rt.answered > 0 {
        html.push_str(&generate_rt_chart(&payload.responses, rt.max_ms));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Responses</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Item</th><th onclick=\"sortTable(2)\">Type</th><th onclick=\"sortTable(3)\">P+</th><th onclick=\"sortTable(4)\">Lang</th><th onclick=\"sortTable(5)\">Chosen</th><th onclick=\"sortTable(6)\">Correct</th><th onclick=\"sortTable(7)\">RT</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for row in &payload.responses {
        let (class, correct) = match row.correct {
            Some(true) => ("pass", "yes"),
            Some(false) => ("fail", "no"),
            None if row.chosen_key.is_none() => ("skip", "-"),
            None => ("", "-"),
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            row.order + 1,
            html_escape(&row.item_id),
            html_escape(&row.item_type.to_string()),
            or_dash(row.p_plus.map(|p| format!("{p:.2}"))),
            row.lang_presented,
            or_dash(row.chosen_key),
            correct,
            or_dash(row.rt_ms.map(|ms| format!("{ms}ms"))),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(payload).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the review page for an attempt.
pub fn write_html_review(payload: &AttemptPayload, path: &Path) -> Result<()> {
    let html = generate_html(payload);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    tracing::info!(path = %path.display(), "review page written");
    Ok(())
}

/// One bar per answered item, scaled to the slowest response.
fn generate_rt_chart(rows: &[AttemptRow], max_ms: u64) -> String {
    let bar_height = 18;
    let max_width = 400;
    let padding = 6;
    let label_width = 120;

    let answered: Vec<(&AttemptRow, u64)> = rows
        .iter()
        .filter_map(|r| r.rt_ms.map(|ms| (r, ms)))
        .collect();
    let total_height = answered.len() * (bar_height + padding) + padding;
    let scale = max_ms.max(1) as f64;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, (row, ms)) in answered.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = ((*ms as f64 / scale) * max_width as f64) as usize;

        let color = match (&row.item_type, row.correct) {
            (_, Some(true)) => "#22c55e",
            (_, Some(false)) => "#ef4444",
            (ItemType::Rotation, None) => "#6366f1",
            _ => "#9ca3af",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&row.item_id)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"3\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" dominant-baseline=\"middle\">{}ms</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            ms
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --skip: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --skip: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.4rem 0.8rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.skip { background: var(--skip); color: #6b7280; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = !(table.dataset.sortCol == col && table.dataset.sortDir == 'asc');
  const key = cell => {
    const n = parseFloat(cell.textContent);
    return isNaN(n) ? cell.textContent : n;
  };
  rows.sort((a, b) => {
    const va = key(a.cells[col]);
    const vb = key(b.cells[col]);
    const cmp = typeof va === 'number' && typeof vb === 'number'
      ? va - vb
      : String(va).localeCompare(String(vb));
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
