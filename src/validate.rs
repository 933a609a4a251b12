use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::checklist;
use crate::error::{Error, Result};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Z_]+\d+)\]").unwrap());

/// Findings of one validation pass. Errors fail the run; warnings are
/// advisory only.
#[derive(Debug, Default)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Findings {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn print(&self) {
        for error in &self.errors {
            println!("ERROR: {}", error);
        }
        for warning in &self.warnings {
            println!("WARNING: {}", warning);
        }
    }
}

/// Distinct placeholder IDs in a template, sorted.
pub fn template_placeholders(content: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Every checklist row must carry a non-empty presale answer. With a
/// template given, the placeholder sets are cross-referenced both ways.
pub fn checklist_completion(checklist_path: &Path, template_path: Option<&Path>) -> Result<Findings> {
    if !checklist_path.exists() {
        return Err(Error::FileNotFound(checklist_path.to_path_buf()));
    }
    let content = fs::read_to_string(checklist_path)?;
    let entries = checklist::parse_table(&content)?;
    if entries.is_empty() {
        return Err(Error::NoPlaceholders);
    }

    let mut findings = Findings::default();

    let empty: Vec<&str> = entries
        .iter()
        .filter(|(_, answer)| answer.trim().is_empty())
        .map(|(id, _)| id.as_str())
        .collect();
    if !empty.is_empty() {
        findings
            .errors
            .push(list_finding("placeholder(s) without presale answer", &empty, 10));
    }

    if let Some(template_path) = template_path {
        if template_path.exists() {
            let template = fs::read_to_string(template_path)?;
            let in_template = template_placeholders(&template);
            let in_checklist: BTreeSet<String> =
                entries.iter().map(|(id, _)| id.clone()).collect();

            let missing: Vec<&str> = in_template
                .difference(&in_checklist)
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                findings.warnings.push(list_finding(
                    "placeholder(s) in template but not in checklist",
                    &missing,
                    10,
                ));
            }

            let extra = in_checklist.difference(&in_template).count();
            if extra > 0 {
                findings.warnings.push(format!(
                    "{} placeholder(s) in checklist but not in template (may be intentional)",
                    extra
                ));
            }
        }
    }

    Ok(findings)
}

/// A finalized template must contain zero placeholder tokens. Each leftover
/// is reported with the lines it appears on.
pub fn no_placeholders(template_path: &Path) -> Result<Findings> {
    if !template_path.exists() {
        return Err(Error::FileNotFound(template_path.to_path_buf()));
    }
    let content = fs::read_to_string(template_path)?;

    let mut findings = Findings::default();
    for id in template_placeholders(&content).iter().take(20) {
        let token = format!("[{}]", id);
        let lines: Vec<String> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(&token))
            .map(|(i, _)| (i + 1).to_string())
            .take(5)
            .collect();
        findings.errors.push(format!(
            "[{}] still present (lines: {})",
            id,
            lines.join(", ")
        ));
    }

    Ok(findings)
}

/// Structural invariants of a generated slide-structure JSON: required
/// top-level fields, contiguous slide numbering, per-type payloads.
pub fn verify_deck(json_path: &Path) -> Result<Findings> {
    if !json_path.exists() {
        return Err(Error::FileNotFound(json_path.to_path_buf()));
    }
    let data: Value = serde_json::from_str(&fs::read_to_string(json_path)?)?;
    Ok(verify_value(&data))
}

fn verify_value(data: &Value) -> Findings {
    let mut findings = Findings::default();

    for field in ["project_name", "client_name", "total_slides", "slides"] {
        if data.get(field).is_none() {
            findings.errors.push(format!("missing required field: {}", field));
        }
    }

    let Some(slides) = data.get("slides").and_then(Value::as_array) else {
        return findings;
    };
    if slides.is_empty() {
        findings.errors.push("no slides found in structure".to_string());
    }

    let numbers: Vec<Option<u64>> = slides
        .iter()
        .map(|s| s.get("slide_number").and_then(Value::as_u64))
        .collect();
    let expected: Vec<Option<u64>> = (1..=slides.len() as u64).map(Some).collect();
    if numbers != expected {
        findings.errors.push(format!(
            "slide numbering is not the contiguous sequence 1..{}",
            slides.len()
        ));
    }

    for (i, slide) in slides.iter().enumerate() {
        let label = slide
            .get("slide_number")
            .and_then(Value::as_u64)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("at index {}", i));

        if slide.get("slide_number").is_none() {
            findings.errors.push(format!("slide {}: missing slide_number field", label));
        }
        if slide.get("type").is_none() {
            findings.errors.push(format!("slide {}: missing type field", label));
        }
        if slide.get("title").is_none() {
            findings.warnings.push(format!("slide {}: missing title field", label));
        }

        match slide.get("type").and_then(Value::as_str) {
            Some("two_column") => {
                for column in ["left_column", "right_column"] {
                    if slide.get(column).is_none() {
                        findings
                            .errors
                            .push(format!("slide {}: two_column type missing {}", label, column));
                    }
                }
            }
            Some("content_table") => {
                if slide.get("table").is_none() {
                    findings
                        .errors
                        .push(format!("slide {}: content_table type missing table", label));
                }
            }
            Some("timeline") => {
                if slide.get("timeline").is_none() {
                    findings
                        .errors
                        .push(format!("slide {}: timeline type missing timeline", label));
                }
            }
            Some("content_bullets") => {
                if slide.get("content").is_none() {
                    findings
                        .warnings
                        .push(format!("slide {}: content_bullets type missing content", label));
                }
            }
            Some("diagram") => {
                if slide.get("diagram").is_none() {
                    findings
                        .warnings
                        .push(format!("slide {}: diagram type missing diagram", label));
                }
            }
            Some("module_description") => {
                if slide.get("content").is_none() {
                    findings.warnings.push(format!(
                        "slide {}: module_description type missing content",
                        label
                    ));
                }
            }
            _ => {}
        }
    }

    if let Some(total) = data.get("total_slides").and_then(Value::as_u64) {
        if total != slides.len() as u64 {
            findings.errors.push(format!(
                "total_slides ({}) != actual count ({})",
                total,
                slides.len()
            ));
        }
    }

    findings
}

fn list_finding(what: &str, ids: &[&str], cap: usize) -> String {
    let mut msg = format!("{} {}:", ids.len(), what);
    for id in ids.iter().take(cap) {
        let _ = write!(msg, "\n  - {}", id);
    }
    if ids.len() > cap {
        let _ = write!(msg, "\n  ... and {} more", ids.len() - cap);
    }
    msg
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::SlideMapper;
    use crate::parser::ProposalDoc;

    #[test]
    fn placeholders_found_and_sorted() {
        let content = std::fs::read_to_string("tests/fixtures/template.md").unwrap();
        let ids: Vec<String> = template_placeholders(&content).into_iter().collect();
        assert_eq!(ids, vec!["CAMERA_001", "NETWORK_001", "SITE_001", "STORAGE_001"]);
    }

    #[test]
    fn placeholder_pattern_is_strict() {
        let ids = template_placeholders("[lowercase_1] [NO_DIGITS] [OK_001]");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["OK_001"]);
    }

    #[test]
    fn completion_flags_empty_answers() {
        let findings =
            checklist_completion(Path::new("tests/fixtures/checklist.md"), None).unwrap();
        assert!(!findings.ok());
        assert_eq!(findings.errors.len(), 1);
        assert!(findings.errors[0].contains("NETWORK_001"));
    }

    #[test]
    fn completion_cross_references_template() {
        let findings = checklist_completion(
            Path::new("tests/fixtures/checklist.md"),
            Some(Path::new("tests/fixtures/template.md")),
        )
        .unwrap();
        assert_eq!(findings.warnings.len(), 2);
        assert!(findings.warnings[0].contains("SITE_001"));
        assert!(findings.warnings[1].contains("not in template"));
    }

    #[test]
    fn leftover_placeholders_reported_with_lines() {
        let findings = no_placeholders(Path::new("tests/fixtures/template.md")).unwrap();
        assert_eq!(findings.errors.len(), 4);
        assert!(findings.errors[0].starts_with("[CAMERA_001] still present (lines:"));
    }

    #[test]
    fn clean_template_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("final.md");
        std::fs::write(&path, "Number of cameras: 12 cameras\n").unwrap();
        let findings = no_placeholders(&path).unwrap();
        assert!(findings.ok());
    }

    #[test]
    fn updated_template_has_no_placeholders_left() {
        // Answers for every template ID; the updater output must then pass
        // the no-placeholder check.
        let template = std::fs::read_to_string("tests/fixtures/template.md").unwrap();
        let entries: Vec<(String, String)> = template_placeholders(&template)
            .into_iter()
            .map(|id| (id, "confirmed".to_string()))
            .collect();
        let outcome = crate::checklist::apply_answers(&template, &entries);
        assert!(template_placeholders(&outcome.content).is_empty());
    }

    #[test]
    fn generated_deck_verifies_clean() {
        let doc = ProposalDoc::load(Path::new("tests/fixtures/proposal.md")).unwrap();
        let deck = SlideMapper::new(&doc, None).map();
        let value = serde_json::to_value(&deck).unwrap();
        let findings = verify_value(&value);
        assert!(findings.ok(), "unexpected errors: {:?}", findings.errors);
    }

    #[test]
    fn broken_deck_is_rejected() {
        let value: Value = serde_json::json!({
            "project_name": "X",
            "total_slides": 3,
            "slides": [
                { "slide_number": 1, "type": "two_column", "title": "t" },
                { "slide_number": 3, "type": "content_table", "title": "t" },
            ]
        });
        let findings = verify_value(&value);
        assert!(findings.errors.iter().any(|e| e.contains("client_name")));
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("not the contiguous sequence")));
        assert!(findings.errors.iter().any(|e| e.contains("left_column")));
        assert!(findings.errors.iter().any(|e| e.contains("missing table")));
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("total_slides (3) != actual count (2)")));
    }
}
