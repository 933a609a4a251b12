use std::sync::LazyLock;

use regex::Regex;

use crate::model::Milestone;
use crate::parser::fields::strip_bold;

static PHASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)\*\*Phase\s+(T\d+):\*\*\s*([^\n]+)").unwrap());
static NEXT_PHASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\*\*Phase\s+T\d+").unwrap());
static OFFSET_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(T\d+\s*[+\-]\s*(.+?)\)").unwrap());
static PHASE_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\*\*Phase\s+(T\d+)\*\*[:\s]+(.+?)(?:\n|\*\*)").unwrap());
static LOOSE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)T\d+\s*[+\-]\s*([^\n]+)").unwrap());
static NOTE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s*\*\*").unwrap());

/// Timeline milestones from the implementation-plan section. The
/// colon-inside-bold phase form carries a body with notes; the
/// colon-outside form is a single-line fallback without notes.
pub fn extract_milestones(content: &str) -> Vec<Milestone> {
    let mut milestones = Vec::new();

    for caps in PHASE_RE.captures_iter(content) {
        let phase = caps[1].trim().to_string();
        let event = caps[2].trim().to_string();

        let start = caps.get(0).unwrap().end();
        let end = NEXT_PHASE_RE
            .find_at(content, start)
            .map(|m| m.start())
            .unwrap_or(content.len());
        let body = &content[start..end];

        let date = OFFSET_DATE_RE
            .captures(&format!("{}{}", event, body))
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        let notes = body
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with('-') && !l.starts_with("---"))
            .map(|l| strip_bold(&NOTE_PREFIX_RE.replace(l, "")))
            .filter(|n| !n.is_empty())
            .collect();

        milestones.push(Milestone {
            phase,
            event,
            date,
            notes,
        });
    }

    if milestones.is_empty() {
        for caps in PHASE_LOOSE_RE.captures_iter(content) {
            let description = caps[2].trim().to_string();
            let date = LOOSE_DATE_RE
                .captures(&description)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();
            milestones.push(Milestone {
                phase: caps[1].trim().to_string(),
                event: description,
                date,
                notes: Vec::new(),
            });
        }
    }

    milestones
}

// ── Tests ──
