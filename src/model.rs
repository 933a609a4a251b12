use serde::{Deserialize, Serialize};

/// Sentinel emitted when a field extractor exhausts every pattern.
pub fn missing(what: &str) -> String {
    format!("[MISSING: {}]", what)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    pub project_name: String,
    pub client_name: String,
    pub total_slides: u32,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub slide_number: u32,
    #[serde(flatten)]
    pub body: SlideBody,
}

/// Slide payloads, tagged by `type` in the JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideBody {
    Title {
        title: String,
        subtitle: String,
        date: String,
    },
    ContentTable {
        title: String,
        table: Table,
    },
    TwoColumn {
        title: String,
        left_column: Column,
        right_column: Column,
    },
    Diagram {
        title: String,
        diagram: Diagram,
    },
    Timeline {
        title: String,
        timeline: Timeline,
    },
    ModuleDescription {
        title: String,
        module_type: String,
        content: ModuleContent,
    },
    ContentBullets {
        title: String,
        content: Vec<Bullet>,
    },
}

impl SlideBody {
    pub fn kind(&self) -> &'static str {
        match self {
            SlideBody::Title { .. } => "title",
            SlideBody::ContentTable { .. } => "content_table",
            SlideBody::TwoColumn { .. } => "two_column",
            SlideBody::Diagram { .. } => "diagram",
            SlideBody::Timeline { .. } => "timeline",
            SlideBody::ModuleDescription { .. } => "module_description",
            SlideBody::ContentBullets { .. } => "content_bullets",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SlideBody::Title { title, .. }
            | SlideBody::ContentTable { title, .. }
            | SlideBody::TwoColumn { title, .. }
            | SlideBody::Diagram { title, .. }
            | SlideBody::Timeline { title, .. }
            | SlideBody::ModuleDescription { title, .. }
            | SlideBody::ContentBullets { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub title: String,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub format: String,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub phase: String,
    pub event: String,
    pub date: String,
    pub notes: Vec<String>,
}

/// One detection module from the PROPOSED MODULES section. All fields are
/// best-effort extracted; an unmatched field stays empty.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub module_type: String,
    pub purpose: String,
    pub alert_logic: String,
    pub preconditions: String,
    pub detection_criteria: String,
    pub data_requirements: String,
    pub image_url: String,
    pub video_url: String,
}

impl Module {
    /// Category by keyword match on the module name.
    pub fn category(&self) -> &'static str {
        let name = self.name.to_lowercase();
        const PPE: &[&str] = &["helmet", "vest", "glove", "boot", "ppe"];
        const SAFETY: &[&str] = &["safety", "unsafe", "danger"];
        const OPERATIONS: &[&str] = &["count", "queue", "process"];
        if PPE.iter().any(|k| name.contains(k)) {
            "PPE Detection"
        } else if SAFETY.iter().any(|k| name.contains(k)) {
            "Safety"
        } else if OPERATIONS.iter().any(|k| name.contains(k)) {
            "Operations"
        } else {
            "Other"
        }
    }
}

/// Module payload carried on a module_description slide. Detection criteria
/// stay on the Module record only; the slide renderer does not use them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleContent {
    pub purpose: String,
    pub alert_logic: String,
    pub preconditions: String,
    pub data_requirements: String,
    pub image_url: String,
    pub video_url: String,
}

impl From<&Module> for ModuleContent {
    fn from(m: &Module) -> Self {
        ModuleContent {
            purpose: m.purpose.clone(),
            alert_logic: m.alert_logic.clone(),
            preconditions: m.preconditions.clone(),
            data_requirements: m.data_requirements.clone(),
            image_url: m.image_url.clone(),
            video_url: m.video_url.clone(),
        }
    }
}

/// Project summary consumed by the architecture generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_name: String,
    pub client_name: String,
    pub deployment_method: String,
    pub num_cameras: Option<u32>,
    pub ai_modules: Vec<String>,
    pub alert_methods: Vec<String>,
    pub include_nvr: bool,
    pub list_ai_modules: bool,
    pub compact_mode: bool,
    pub internet_connection: bool,
    pub internet_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfoDoc {
    pub project_info: ProjectInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_json_is_internally_tagged() {
        let slide = Slide {
            slide_number: 3,
            body: SlideBody::TwoColumn {
                title: "Scope of Work".into(),
                left_column: Column {
                    title: "viAct Responsibilities".into(),
                    content: vec!["Provide platform".into()],
                },
                right_column: Column {
                    title: "Client Responsibilities".into(),
                    content: vec!["Provide streams".into()],
                },
            },
        };
        let v: serde_json::Value = serde_json::to_value(&slide).unwrap();
        assert_eq!(v["slide_number"], 3);
        assert_eq!(v["type"], "two_column");
        assert_eq!(v["left_column"]["title"], "viAct Responsibilities");
    }

    #[test]
    fn module_categories() {
        let m = |name: &str| Module {
            name: name.into(),
            ..Default::default()
        };
        assert_eq!(m("Safety Helmet Detection").category(), "PPE Detection");
        assert_eq!(m("Danger Zone Intrusion").category(), "Safety");
        assert_eq!(m("People Counting").category(), "Operations");
        assert_eq!(m("Smoke Detection").category(), "Other");
    }

    #[test]
    fn missing_sentinel() {
        assert_eq!(missing("Client Name"), "[MISSING: Client Name]");
    }
}
