use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::model::{missing, ProjectInfo};
use crate::parser::sections::{named_section, Sections};
use crate::parser::ProposalDoc;

const PROJECT_REQUIREMENT: &str = "2. PROJECT REQUIREMENT STATEMENT";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
static TECH_PROPOSAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Technical\s+Proposal.*$").unwrap());
static PROPOSAL_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Proposal Title:\*\*\s*([^\n]+)").unwrap());
static CLIENT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Client Name:\*\*\s*([^\n]+)").unwrap());
static OWNER_INSIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Project Owner:\*\*\s*([^\n]+)").unwrap());
static OWNER_OUTSIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Project Owner\*\*[:\s]+([^\n]+)").unwrap());
static DATE_OUTSIDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Date\*\*[:\s]+(\d{4}-\d{2}-\d{2}|\w+\s+\d{4})").unwrap()
});
static DATE_INSIDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Date:\*\*\s*(\d{4}-\d{2}-\d{2}|\w+\s+\d{4})").unwrap()
});
static WORK_SCOPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\*\*Work Scope\*\*[:\s]+(.+?)(?:\n\n|\n\*\*|$)").unwrap()
});
static CAMERA_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Camera Number:\*\*\s*(\d+)\s*cameras?").unwrap());
static CAMERA_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*cameras?\s*(?:\(|at|total)").unwrap());
static CAMERA_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Camera.*?(\d+)\s*cameras?").unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static MODULE_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\*\*AI Modules:\*\*.*?\n((?:\d+\.\s*[^\n]+\n?)+)").unwrap()
});
static MODULE_LIST_LOOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)AI Modules:.*?\n((?:\d+\.\s*[^\n]{0,100}\n?)+)").unwrap()
});
static NUMBERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s*([^\n]+)$").unwrap());
static DEPLOY_CLOUD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCloud-based\b|\bCloud\b|\bOn-cloud\b").unwrap());
static DEPLOY_ONPREM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bOn-premise\b|\bOn-prem\b|\bOn premise\b").unwrap());
static DEPLOY_HYBRID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bHybrid\b").unwrap());
static DEPLOY_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Deployment Method:\*\*\s*([^\n]+)").unwrap());
static NVR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNVR\b|\bNetwork Video Recorder\b").unwrap());
static NVR_OPTIONAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)NVR.*optional|optional.*NVR|NVR.*\*").unwrap());
static INTERNET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)internet connection.*?(?:required|confirmed|yes|stable)").unwrap()
});
static NET_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:internet|connection|network).*?(?:4G|5G|WiFi|Wi-Fi|Ethernet|Fiber|Satellite)")
        .unwrap()
});
static NET_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(4G|5G|WiFi|Wi-Fi|Ethernet|Fiber|Satellite|Broadband)").unwrap()
});

/// Project name for the slide deck: first `#` heading with any trailing
/// "Technical Proposal ..." removed, else the file stem.
pub fn project_name(doc: &ProposalDoc) -> String {
    if let Some(caps) = TITLE_RE.captures(&doc.content) {
        let title = TECH_PROPOSAL_RE.replace(caps[1].trim(), "");
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    doc.stem().to_string()
}

/// Proposal title for project info: `**Proposal Title:**` field, else the
/// raw first heading, else the file stem.
pub fn proposal_title(doc: &ProposalDoc) -> String {
    if let Some(caps) = PROPOSAL_TITLE_RE.captures(&doc.content) {
        return caps[1].trim().to_string();
    }
    if let Some(caps) = TITLE_RE.captures(&doc.content) {
        return caps[1].trim().to_string();
    }
    doc.stem().to_string()
}

/// Client name from the requirement statement, colon-inside-bold then
/// colon-outside-bold. Misses produce the visible sentinel.
pub fn client_name(sections: &Sections) -> String {
    let req = sections.get(PROJECT_REQUIREMENT);
    for re in [&*OWNER_INSIDE_RE, &*OWNER_OUTSIDE_RE] {
        if let Some(caps) = re.captures(req) {
            return caps[1].trim().to_string();
        }
    }
    warn!("client name (Project Owner) not found, please verify");
    missing("Client Name")
}

/// Client name for project info: whole-document scan with a neutral
/// default instead of the sentinel.
pub fn client_or_default(content: &str) -> String {
    for re in [&*CLIENT_NAME_RE, &*OWNER_INSIDE_RE] {
        if let Some(caps) = re.captures(content) {
            return caps[1].trim().to_string();
        }
    }
    "Client".to_string()
}

/// Cover date, `**Date**:` then `**Date:**` forms, ISO or "Month YYYY".
pub fn cover_date(cover: &str) -> String {
    for re in [&*DATE_OUTSIDE_RE, &*DATE_INSIDE_RE] {
        if let Some(caps) = re.captures(cover) {
            return caps[1].trim().to_string();
        }
    }
    warn!("date not found in Cover Page section, please verify");
    String::new()
}

/// Work-scope one-liner: first sentence of the bold field, capped at 100
/// characters when no sentence boundary exists.
pub fn work_scope(content: &str) -> String {
    if let Some(caps) = WORK_SCOPE_RE.captures(content) {
        let scope = caps[1].trim();
        let scope = match scope.find('.') {
            Some(idx) => scope[..idx].to_string(),
            None => scope.chars().take(100).collect(),
        };
        return scope.trim().to_string();
    }
    warn!("work scope not found, please verify");
    missing("Work Scope")
}

/// Camera count: field form, count-with-context, loose "Camera ... N"
/// pattern, then any digits inside a "Camera Number" section.
pub fn camera_count(content: &str) -> Option<u32> {
    for re in [&*CAMERA_FIELD_RE, &*CAMERA_COUNT_RE, &*CAMERA_LOOSE_RE] {
        if let Some(caps) = re.captures(content) {
            if let Ok(n) = caps[1].parse() {
                return Some(n);
            }
        }
    }
    named_section(content, "Camera Number")
        .and_then(|s| DIGITS_RE.find(s).and_then(|m| m.as_str().parse().ok()))
}

/// AI module names from the numbered list after `**AI Modules:**`.
/// Three strategies: requirement section, standalone section, whole
/// document; first one that yields anything wins.
pub fn ai_modules(content: &str) -> Vec<String> {
    const NOISE: &[&str] = &[
        "data flow",
        "capture video",
        "processes video",
        "alert data",
        "delivered via",
    ];

    let mut modules = Vec::new();

    if let Some(section) = named_section(content, "PROJECT REQUIREMENT STATEMENT") {
        if let Some(caps) = MODULE_LIST_RE.captures(section) {
            for item in NUMBERED_ITEM_RE.captures_iter(&caps[1]) {
                let name = item[1].trim().to_string();
                let lower = name.to_lowercase();
                if name.len() < 100 && !NOISE.iter().any(|n| lower.contains(n)) {
                    modules.push(name);
                }
            }
        }
    }

    if modules.is_empty() {
        if let Some(section) = named_section(content, "AI Modules") {
            for line in section.lines() {
                if let Some(caps) = NUMBERED_ITEM_RE.captures(line.trim()) {
                    let name = caps[1].trim().to_string();
                    if name.len() < 100 {
                        modules.push(name);
                    }
                } else if line.trim().is_empty() && !modules.is_empty() {
                    break;
                }
            }
        }
    }

    if modules.is_empty() {
        if let Some(caps) = MODULE_LIST_LOOSE_RE.captures(content) {
            modules = NUMBERED_ITEM_RE
                .captures_iter(&caps[1])
                .map(|c| c[1].trim().to_string())
                .filter(|name| name.len() < 100)
                .collect();
        }
    }

    modules
}

/// Deployment method: architecture-section keywords, the explicit field,
/// whole-document keywords, default on-prem.
pub fn deployment_method(content: &str) -> &'static str {
    if let Some(section) = named_section(content, "SYSTEM ARCHITECTURE") {
        if DEPLOY_CLOUD_RE.is_match(section) {
            return "cloud";
        } else if DEPLOY_ONPREM_RE.is_match(section) {
            return "on-prem";
        } else if DEPLOY_HYBRID_RE.is_match(section) {
            return "hybrid";
        }
    }

    if let Some(caps) = DEPLOY_FIELD_RE.captures(content) {
        let method = caps[1].to_lowercase();
        if method.contains("cloud") {
            return "cloud";
        } else if method.contains("on-prem") || method.contains("on premise") {
            return "on-prem";
        } else if method.contains("hybrid") {
            return "hybrid";
        }
    }

    if Regex::new(r"(?i)\bcloud\b").unwrap().is_match(content) {
        "cloud"
    } else {
        "on-prem"
    }
}

/// Alert channels from the alerts section, whole-document fallback for the
/// common three, default Email + Dashboard.
pub fn alert_methods(content: &str) -> Vec<String> {
    const CHANNELS: &[&str] = &["Email", "Telegram", "Dashboard", "Mobile", "SMS", "WhatsApp"];

    let section =
        named_section(content, "Alerts & Notifications").or_else(|| named_section(content, "Alert"));

    let mut alerts = Vec::new();
    if let Some(section) = section {
        for channel in CHANNELS {
            let re = Regex::new(&format!(r"(?i)\b{}\b", channel)).unwrap();
            if re.is_match(section) {
                alerts.push(channel.to_string());
            }
        }
    }

    if alerts.is_empty() {
        for channel in ["Email", "Telegram", "Dashboard"] {
            let re = Regex::new(&format!(r"(?i)\b{}\b", channel)).unwrap();
            if re.is_match(content) {
                alerts.push(channel.to_string());
            }
        }
    }

    if alerts.is_empty() {
        alerts = vec!["Email".to_string(), "Dashboard".to_string()];
    }
    alerts
}

/// Whether the deployment includes an NVR. Explicit mention wins unless
/// the architecture section marks it optional; otherwise cloud skips it.
pub fn include_nvr(content: &str) -> bool {
    if NVR_RE.is_match(content) {
        if let Some(section) = named_section(content, "SYSTEM ARCHITECTURE") {
            if NVR_OPTIONAL_RE.is_match(section) {
                return false;
            }
        }
        return true;
    }
    deployment_method(content) != "cloud"
}

/// (internet_connection, internet_type). The type is only looked up once a
/// connection statement is found, with a second chance inside the
/// requirements section.
pub fn network_info(content: &str) -> (bool, Option<String>) {
    if !INTERNET_RE.is_match(content) {
        return (false, None);
    }

    let mut internet_type = None;
    if NET_CONTEXT_RE.is_match(content) {
        internet_type = NET_TYPE_RE.captures(content).map(|c| c[1].to_string());
    }
    if internet_type.is_none() {
        if let Some(section) = named_section(content, "SYSTEM REQUIREMENTS") {
            internet_type = NET_TYPE_RE.captures(section).map(|c| c[1].to_string());
        }
    }

    (true, internet_type)
}

/// Full project-info record for the `parse` command.
pub fn build_info(doc: &ProposalDoc) -> ProjectInfo {
    let content = &doc.content;
    let (internet_connection, internet_type) = network_info(content);
    ProjectInfo {
        project_name: proposal_title(doc),
        client_name: client_or_default(content),
        deployment_method: deployment_method(content).to_string(),
        num_cameras: camera_count(content),
        ai_modules: ai_modules(content),
        alert_methods: alert_methods(content),
        include_nvr: include_nvr(content),
        list_ai_modules: true,
        compact_mode: true,
        internet_connection,
        internet_type,
    }
}

// ── Tests ──
