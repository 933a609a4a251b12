use std::sync::LazyLock;

use regex::Regex;

use crate::model::Bullet;

static BULLET_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*•]\s*").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*").unwrap());
static AFTER_BOLD_COLON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\*\*\s*(.+)$").unwrap());
static AFTER_COLON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\s*(.+)$").unwrap());
static KV_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*\*\*(.+?)\*\*\s*\|\s*(.+?)\s*\|").unwrap());
static KEY_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^:*]+?):\*\*").unwrap());
static SOURCE_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\*\*Source[:\s]*.*$").unwrap());
static SOURCE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\n\s*\*\*Source[:\s]*.*$").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*---\s*(\n|$)").unwrap());
static TRAILING_SEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*---\s*$").unwrap());
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-+$").unwrap());
static MERMAID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```mermaid\s*\n(.*?)\n```").unwrap());
static MERMAID_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```mermaid\s*\n(.*?)```").unwrap());

pub fn strip_bold(s: &str) -> String {
    BOLD_RE.replace_all(s, "").trim().to_string()
}

/// Value part of a `**Field:** value`, `Field: value` or `- Field: value`
/// line. Empty when the line carries no colon-separated value.
pub fn field_value(line: &str) -> String {
    let line = BULLET_PREFIX_RE.replace(line.trim(), "");
    if let Some(caps) = AFTER_BOLD_COLON_RE.captures(&line) {
        return caps[1].trim().to_string();
    }
    if let Some(caps) = AFTER_COLON_RE.captures(&line) {
        return strip_bold(caps[1].trim());
    }
    String::new()
}

/// Key-value pairs from a section body. Tries `| **Key** | Value |` table
/// rows first; only when the table form finds nothing, falls back to
/// splitting at `**Key:**` markers, each value running to the next marker
/// or a `---` separator. Numbered-list values keep their line breaks.
pub fn key_value_pairs(content: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for caps in KV_TABLE_RE.captures_iter(content) {
        let key = caps[1].trim().to_string();
        let value = SOURCE_TAIL_RE.replace(caps[2].trim(), "");
        let value = strip_bold(value.trim());
        upsert(&mut pairs, key, value);
    }
    if !pairs.is_empty() {
        return pairs;
    }

    let markers: Vec<(usize, usize, String)> = KEY_MARKER_RE
        .captures_iter(content)
        .map(|caps| {
            let m = caps.get(0).unwrap();
            (m.start(), m.end(), caps[1].trim().to_string())
        })
        .collect();

    for (i, (_, end, key)) in markers.iter().enumerate() {
        let stop = markers.get(i + 1).map(|m| m.0).unwrap_or(content.len());
        let mut span = &content[*end..stop];
        if let Some(sep) = SEPARATOR_RE.find(span) {
            span = &span[..sep.start()];
        }
        let value = TRAILING_SEP_RE.replace(span.trim(), "");
        let mut value = value.trim().to_string();
        if NUMBERED_RE.is_match(&value) {
            // Keep list items on their own lines
            value = value
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
        } else {
            value = NEWLINES_RE.replace_all(&value, " ").trim().to_string();
        }
        let value = SOURCE_LINE_RE.replace(&value, "");
        let value = strip_bold(value.trim());
        if !value.is_empty() {
            upsert(&mut pairs, key.clone(), value);
        }
    }

    pairs
}

fn upsert(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some((_, v)) => *v = value,
        None => pairs.push((key, value)),
    }
}

/// Bullet items under the header containing `keyword`. The header may be a
/// `###` heading, a bold label or a plain `Keyword ...:` line; collection
/// stops at the next header.
pub fn bullet_items(content: &str, keyword: &str) -> Vec<String> {
    let keyword_lower = keyword.to_lowercase();
    let mut items = Vec::new();
    let mut in_section = false;

    for line in content.lines() {
        let stripped = line.trim();
        let lower = line.to_lowercase();

        let is_header = lower.contains(&keyword_lower)
            && (stripped.starts_with("###")
                || stripped.starts_with("**")
                || (stripped.contains(':') && !stripped.starts_with('-')));
        if is_header {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if stripped.starts_with("###")
            || (stripped.starts_with("**")
                && stripped.contains(':')
                && !lower.contains(&keyword_lower))
        {
            break;
        }
        if stripped.starts_with("---") {
            continue;
        }
        if stripped.starts_with('-') || stripped.starts_with('*') || stripped.starts_with('•') {
            let item = BULLET_PREFIX_RE.replace(line, "");
            let item = strip_bold(&item);
            if !item.is_empty() && !DASHES_RE.is_match(&item) && item != "---" {
                items.push(item);
            }
        }
    }

    items
}

/// Prose and list lines as leveled bullets. Table rows are skipped; level
/// comes from the raw indentation of list lines.
pub fn bullets_with_levels(content: &str) -> Vec<Bullet> {
    let mut bullets = Vec::new();

    for raw in content.lines() {
        let stripped = raw.trim();
        if stripped.is_empty() || stripped.starts_with('|') {
            continue;
        }

        let mut level = 0u8;
        let mut text = stripped.to_string();
        if stripped.starts_with('-') || stripped.starts_with('*') || stripped.starts_with('•') {
            let indent = raw.len() - raw.trim_start().len();
            level = if indent >= 4 {
                2
            } else if indent >= 2 {
                1
            } else {
                0
            };
            text = BULLET_PREFIX_RE.replace(raw, "").to_string();
        }

        let text = SOURCE_TAIL_RE.replace(&text, "");
        let text = strip_bold(text.trim());
        if !text.is_empty() {
            bullets.push(Bullet { level, text });
        }
    }

    bullets
}

/// Rough table check: enough pipes to be more than a stray `|`.
pub fn is_table(content: &str) -> bool {
    content.contains('|') && content.matches('|').count() > 3
}

/// First two cells of every pipe row, delimiter rows skipped. The header
/// row is not special-cased; it comes back as the first row.
pub fn table_rows(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for line in content.lines() {
        if !line.contains('|') || line.trim().starts_with("|---") {
            continue;
        }
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 3 {
            continue;
        }
        let cells: Vec<String> = parts[1..parts.len() - 1]
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        if cells.len() >= 2 {
            rows.push(cells[..2].to_vec());
        }
    }
    rows
}

/// Mermaid code inside a fenced block, the stricter closing-fence pattern
/// tried first.
pub fn mermaid_block(content: &str) -> Option<String> {
    for re in [&*MERMAID_RE, &*MERMAID_LOOSE_RE] {
        if let Some(caps) = re.captures(content) {
            let code = caps[1].trim().to_string();
            if !code.is_empty() {
                return Some(code);
            }
        }
    }
    None
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_bold_colon() {
        assert_eq!(
            field_value("- **Module Type:** PPE Detection"),
            "PPE Detection"
        );
    }

    #[test]
    fn field_value_plain_colon() {
        assert_eq!(field_value("Purpose: Detect missing helmets"), "Detect missing helmets");
        assert_eq!(field_value("• Field: Value"), "Value");
    }

    #[test]
    fn field_value_url_keeps_scheme() {
        assert_eq!(
            field_value("- **Video URL:** https://example.com/demo.mp4"),
            "https://example.com/demo.mp4"
        );
    }

    #[test]
    fn field_value_no_colon() {
        assert_eq!(field_value("just text"), "");
    }

    #[test]
    fn key_values_from_table() {
        let md = "| **Project Owner** | Acme Ltd. |\n| **Site** | Warehouse 7 |";
        let pairs = key_value_pairs(md);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("Project Owner".into(), "Acme Ltd.".into()));
        assert_eq!(pairs[1], ("Site".into(), "Warehouse 7".into()));
    }

    #[test]
    fn key_values_from_bold_markers() {
        let md = "**Project Owner:** Acme Ltd.\n**Camera Number:** 12 cameras";
        let pairs = key_value_pairs(md);
        assert_eq!(pairs[0], ("Project Owner".into(), "Acme Ltd.".into()));
        assert_eq!(pairs[1], ("Camera Number".into(), "12 cameras".into()));
    }

    #[test]
    fn key_values_numbered_list_keeps_lines() {
        let md = "**AI Modules:**\n1. Helmet Detection\n2. Vest Detection";
        let pairs = key_value_pairs(md);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "1. Helmet Detection\n2. Vest Detection");
    }

    #[test]
    fn key_values_stop_at_separator() {
        let md = "**Owner:** Acme Ltd.\n\n---\n\ntrailing prose";
        let pairs = key_value_pairs(md);
        assert_eq!(pairs, vec![("Owner".into(), "Acme Ltd.".into())]);
    }

    #[test]
    fn bullet_items_under_heading() {
        let md = "### viAct Responsibilities:\n- Provide platform\n- **Configure** modules\n\n### Client Responsibilities:\n- Provide streams";
        let items = bullet_items(md, "viAct");
        assert_eq!(items, vec!["Provide platform", "Configure modules"]);
        let items = bullet_items(md, "Client");
        assert_eq!(items, vec!["Provide streams"]);
    }

    #[test]
    fn bullet_items_bold_header_and_separator() {
        let md = "**viAct Responsibilities:**\n- One\n---\n- Two\n**Client Responsibilities:**\n- Three";
        assert_eq!(bullet_items(md, "viAct"), vec!["One", "Two"]);
    }

    #[test]
    fn bullet_items_missing_keyword() {
        assert!(bullet_items("- Orphan item", "viAct").is_empty());
    }

    #[test]
    fn bullets_levels_from_indent() {
        let md = "- top\n  - nested\n    - deep\nplain prose\n| skipped | row |";
        let bullets = bullets_with_levels(md);
        assert_eq!(bullets.len(), 4);
        assert_eq!((bullets[0].level, bullets[0].text.as_str()), (0, "top"));
        assert_eq!((bullets[1].level, bullets[1].text.as_str()), (1, "nested"));
        assert_eq!((bullets[2].level, bullets[2].text.as_str()), (2, "deep"));
        assert_eq!((bullets[3].level, bullets[3].text.as_str()), (0, "plain prose"));
    }

    #[test]
    fn table_detection() {
        assert!(is_table("| a | b |\n| c | d |"));
        assert!(!is_table("a | b"));
        assert!(!is_table("no pipes"));
    }

    #[test]
    fn table_rows_skip_delimiter() {
        let md = "| Spec | Value |\n|---|---|\n| Resolution | 1080p |";
        let rows = table_rows(md);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Spec", "Value"]);
        assert_eq!(rows[1], vec!["Resolution", "1080p"]);
    }

    #[test]
    fn mermaid_extraction() {
        let md = "intro\n```mermaid\ngraph TD\n  A --> B\n```\noutro";
        assert_eq!(mermaid_block(md).unwrap(), "graph TD\n  A --> B");
        assert!(mermaid_block("no diagram here").is_none());
    }
}
