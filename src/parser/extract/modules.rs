use std::sync::LazyLock;

use regex::Regex;

use crate::model::Module;
use crate::parser::fields::{field_value, strip_bold};

static MODULE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^####\s+Module(?:\s+\d+)?\s*:\s*([^\n]+)$").unwrap());
static MODULE_BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Module\s+(?:\d+)?:\s*(.+?)\*\*").unwrap());
static MODULE_PLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)(?:Module|Module Name)[:\s]+([^\n]+)").unwrap());

/// Modules from the PROPOSED MODULES section. Three decreasingly strict
/// header patterns are tried in order; the first one that yields any match
/// wins. The plain-text fallback cannot delimit a body, so its modules
/// carry a name only.
pub fn extract_modules(content: &str) -> Vec<Module> {
    let mut modules = collect_with_body(&MODULE_HEADING_RE, content);
    if modules.is_empty() {
        modules = collect_with_body(&MODULE_BOLD_RE, content);
    }
    if modules.is_empty() {
        for caps in MODULE_PLAIN_RE.captures_iter(content) {
            let name = strip_bold(caps[1].trim());
            if !name.is_empty() {
                modules.push(Module {
                    name,
                    ..Default::default()
                });
            }
        }
    }
    modules
}

fn collect_with_body(header: &Regex, content: &str) -> Vec<Module> {
    let matches: Vec<_> = header.captures_iter(content).collect();
    let mut modules = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let name = caps[1].trim().to_string();
        let start = caps.get(0).unwrap().end();
        let end = matches
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(content.len());
        let mut module = module_fields(&content[start..end]);
        module.name = name;
        modules.push(module);
    }
    modules
}

/// Scan a module body for known field names, splitting each line at its
/// first colon. Later occurrences of a field overwrite earlier ones.
fn module_fields(body: &str) -> Module {
    let mut module = Module::default();

    for raw in body.lines() {
        let line = raw.trim();
        if line.is_empty() || !line.contains(':') {
            continue;
        }
        let value = field_value(line);
        if value.is_empty() {
            continue;
        }

        if line.contains("Module Type") {
            module.module_type = value;
        } else if line.contains("Purpose Description") {
            module.purpose = value;
        } else if line.contains("Alert Trigger Logic") {
            module.alert_logic = value;
        } else if line.contains("Preconditions") && !line.contains("Purpose") {
            module.preconditions = value;
        } else if line.contains("Detection Criteria") {
            module.detection_criteria = value;
        } else if line.contains("Image URL") {
            module.image_url = normalize_url(value);
        } else if line.contains("Video URL") {
            module.video_url = normalize_url(value);
        } else if line.contains("Client Data Requirements") || line.contains("Data Requirements") {
            module.data_requirements = value;
        }
    }

    module
}

fn normalize_url(value: String) -> String {
    match value.to_lowercase().as_str() {
        "[not available]" | "not available" | "n/a" => String::new(),
        _ => value,
    }
}

/// Group modules by category in the fixed PPE/Safety/Operations/Other
/// order, empty categories dropped.
pub fn group_by_category(modules: Vec<Module>) -> Vec<(&'static str, Vec<Module>)> {
    const CATEGORIES: [&str; 4] = ["PPE Detection", "Safety", "Operations", "Other"];

    let mut groups: Vec<(&'static str, Vec<Module>)> =
        CATEGORIES.iter().map(|c| (*c, Vec::new())).collect();
    for module in modules {
        let category = module.category();
        if let Some((_, group)) = groups.iter_mut().find(|(c, _)| *c == category) {
            group.push(module);
        }
    }
    groups.retain(|(_, group)| !group.is_empty());
    groups
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_pattern_from_fixture() {
        let md = std::fs::read_to_string("tests/fixtures/proposal.md").unwrap();
        let sections = crate::parser::sections::split_sections(&md);
        let modules = extract_modules(sections.get("7. PROPOSED MODULES & FUNCTIONAL DESCRIPTION"));

        assert_eq!(modules.len(), 2);
        let helmet = &modules[0];
        assert_eq!(helmet.name, "Safety Helmet Detection");
        assert_eq!(helmet.module_type, "PPE Detection");
        assert_eq!(helmet.purpose, "Detect workers without helmets in camera view.");
        assert_eq!(helmet.preconditions, "Camera covers the work zone at 1080p.");
        assert_eq!(helmet.detection_criteria, "Person detected with uncovered head.");
        assert_eq!(helmet.data_requirements, "RTSP stream per camera.");
        assert_eq!(helmet.image_url, "");
        assert_eq!(helmet.video_url, "https://example.com/demo/helmet.mp4");

        let zone = &modules[1];
        assert_eq!(zone.name, "Danger Zone Intrusion");
        assert_eq!(zone.image_url, "");
        assert_eq!(zone.video_url, "");
    }

    #[test]
    fn bold_pattern_fallback() {
        let md = "**Module 1: Forklift Proximity**\n- **Module Type:** Safety\n- **Purpose Description:** Warn on close approach.\n\n**Module 2: Queue Monitor**\n- **Module Type:** Operations\n";
        let modules = extract_modules(md);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "Forklift Proximity");
        assert_eq!(modules[0].purpose, "Warn on close approach.");
        assert_eq!(modules[1].name, "Queue Monitor");
        assert_eq!(modules[1].module_type, "Operations");
    }

    #[test]
    fn plain_pattern_names_only() {
        let md = "Module: Smoke Detection\nsome prose\n";
        let modules = extract_modules(md);
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "Smoke Detection");
        assert!(modules[0].module_type.is_empty());
    }

    #[test]
    fn unavailable_urls_become_empty() {
        let md = "#### Module: X\n- **Image URL:** [Not available]\n- **Video URL:** N/A\n";
        let modules = extract_modules(md);
        assert_eq!(modules[0].image_url, "");
        assert_eq!(modules[0].video_url, "");
    }

    #[test]
    fn grouping_keeps_fixed_order_and_drops_empty() {
        let module = |name: &str| Module {
            name: name.into(),
            ..Default::default()
        };
        let grouped = group_by_category(vec![
            module("People Counting"),
            module("Safety Helmet Detection"),
            module("Vest Check"),
        ]);
        let names: Vec<&str> = grouped.iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec!["PPE Detection", "Operations"]);
        assert_eq!(grouped[0].1.len(), 2);
    }

    #[test]
    fn no_modules_in_unrelated_text() {
        assert!(extract_modules("nothing here").is_empty());
    }
}
