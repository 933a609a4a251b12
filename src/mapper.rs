use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::{
    missing, Column, Diagram, ModuleContent, Slide, SlideBody, SlideDeck, Table, Timeline,
};
use crate::parser::extract::{milestones, modules, project};
use crate::parser::{fields, sections, ProposalDoc};

const COVER_PAGE: &str = "1. COVER PAGE";
const PROJECT_REQUIREMENT: &str = "2. PROJECT REQUIREMENT STATEMENT";
const SCOPE_OF_WORK: &str = "3. SCOPE OF WORK";
const SYSTEM_ARCHITECTURE: &str = "4. SYSTEM ARCHITECTURE";
const SYSTEM_REQUIREMENTS: &str = "5. SYSTEM REQUIREMENTS";
const IMPLEMENTATION_PLAN: &str = "6. IMPLEMENTATION PLAN (TIMELINE)";
const PROPOSED_MODULES: &str = "7. PROPOSED MODULES & FUNCTIONAL DESCRIPTION";
const USER_INTERFACE: &str = "8. USER INTERFACE & REPORTING";

static DETAILED_DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)###\s+.*(?:Description|Data Flow|Components)").unwrap());

/// Maps the named proposal sections onto the fixed slide sequence. Slides
/// are numbered contiguously from 1 in emission order.
pub struct SlideMapper<'a> {
    doc: &'a ProposalDoc,
    diagram_path: Option<&'a Path>,
    slides: Vec<Slide>,
    next_number: u32,
}

impl<'a> SlideMapper<'a> {
    pub fn new(doc: &'a ProposalDoc, diagram_path: Option<&'a Path>) -> Self {
        SlideMapper {
            doc,
            diagram_path,
            slides: Vec::new(),
            next_number: 1,
        }
    }

    pub fn map(mut self) -> SlideDeck {
        self.cover_page();
        self.project_requirement();
        self.scope_of_work();
        self.system_architecture();
        self.system_requirements();
        self.implementation_plan();
        self.proposed_modules();
        self.user_interface();

        SlideDeck {
            project_name: project::project_name(self.doc),
            client_name: project::client_name(&self.doc.sections),
            total_slides: self.slides.len() as u32,
            slides: self.slides,
        }
    }

    fn push(&mut self, body: SlideBody) {
        self.slides.push(Slide {
            slide_number: self.next_number,
            body,
        });
        self.next_number += 1;
    }

    fn cover_page(&mut self) {
        let cover = self.doc.sections.get(COVER_PAGE);
        let requirement = self.doc.sections.get(PROJECT_REQUIREMENT);

        self.push(SlideBody::Title {
            title: format!(
                "Video Analytics Solution Proposal for {}",
                project::client_name(&self.doc.sections)
            ),
            subtitle: project::work_scope(requirement),
            date: project::cover_date(cover),
        });
    }

    fn project_requirement(&mut self) {
        let requirement = self.doc.sections.get(PROJECT_REQUIREMENT);
        let rows = fields::key_value_pairs(requirement)
            .into_iter()
            .map(|(k, v)| vec![k, v])
            .collect();

        self.push(SlideBody::ContentTable {
            title: "Project Requirement Statement".to_string(),
            table: Table {
                headers: vec!["Field".to_string(), "Value".to_string()],
                rows,
            },
        });
    }

    fn scope_of_work(&mut self) {
        let scope = self.doc.sections.get(SCOPE_OF_WORK);

        self.push(SlideBody::TwoColumn {
            title: "Scope of Work".to_string(),
            left_column: Column {
                title: "viAct Responsibilities".to_string(),
                content: fields::bullet_items(scope, "viAct"),
            },
            right_column: Column {
                title: "Client Responsibilities".to_string(),
                content: fields::bullet_items(scope, "Client"),
            },
        });
    }

    fn system_architecture(&mut self) {
        let section = self.doc.sections.get(SYSTEM_ARCHITECTURE);

        self.push(SlideBody::Diagram {
            title: "Proposed System Architecture".to_string(),
            diagram: Diagram {
                diagram_type: "mermaid".to_string(),
                code: self.read_diagram().unwrap_or_default(),
                description: architecture_description(section),
            },
        });

        if DETAILED_DESC_RE.is_match(section) {
            self.push(SlideBody::ContentBullets {
                title: "System Architecture Description".to_string(),
                content: fields::bullets_with_levels(section),
            });
        }
    }

    fn system_requirements(&mut self) {
        let section = self.doc.sections.get(SYSTEM_REQUIREMENTS);

        for (name, body) in sections::split_subsections(section) {
            if body.trim().is_empty() {
                continue;
            }
            let title = format!("System Requirements: {}", name);
            if fields::is_table(&body) {
                self.push(SlideBody::ContentTable {
                    title,
                    table: Table {
                        headers: vec!["Specification".to_string(), "Value".to_string()],
                        rows: fields::table_rows(&body),
                    },
                });
            } else {
                self.push(SlideBody::ContentBullets {
                    title,
                    content: fields::bullets_with_levels(&body),
                });
            }
        }
    }

    fn implementation_plan(&mut self) {
        let section = self.doc.sections.get(IMPLEMENTATION_PLAN);

        self.push(SlideBody::Timeline {
            title: "Implementation Plan".to_string(),
            timeline: Timeline {
                format: "milestones".to_string(),
                milestones: milestones::extract_milestones(section),
            },
        });
    }

    fn proposed_modules(&mut self) {
        let section = self.doc.sections.get(PROPOSED_MODULES);
        let grouped = modules::group_by_category(modules::extract_modules(section));

        for (_, group) in grouped {
            for module in group {
                let title = if module.name.is_empty() {
                    warn!(
                        "module name not found for module at slide {}, please verify",
                        self.next_number
                    );
                    missing("Module Name")
                } else {
                    module.name.clone()
                };
                if module.module_type.is_empty() {
                    warn!("module type not found for '{}', using empty string", title);
                }

                self.push(SlideBody::ModuleDescription {
                    title,
                    module_type: module.module_type.clone(),
                    content: ModuleContent::from(&module),
                });
            }
        }
    }

    fn user_interface(&mut self) {
        let section = self.doc.sections.get(USER_INTERFACE);

        for (name, body) in sections::split_subsections(section) {
            if body.trim().is_empty() {
                continue;
            }
            self.push(SlideBody::ContentBullets {
                title: name,
                content: fields::bullets_with_levels(&body),
            });
        }
    }

    fn read_diagram(&self) -> Option<String> {
        let path = self.diagram_path?;
        if !path.exists() {
            warn!("architecture diagram file not found: {}", path.display());
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("error reading architecture diagram: {}", e);
                return None;
            }
        };
        match fields::mermaid_block(&content) {
            Some(code) => {
                info!("extracted mermaid diagram code ({} chars)", code.len());
                Some(code)
            }
            None => {
                warn!("no mermaid code block found in {}", path.display());
                None
            }
        }
    }
}

/// First few prose lines after the first `###` heading of the architecture
/// section, joined into one description string.
fn architecture_description(section: &str) -> String {
    let mut description = Vec::new();
    let mut in_description = false;

    for line in section.lines() {
        let line = line.trim();
        if line.starts_with("###") {
            in_description = true;
            continue;
        }
        if in_description && !line.is_empty() && !line.starts_with('|') {
            description.push(line);
            if description.len() > 3 {
                break;
            }
        }
    }

    description.join(" ")
}

/// Write the slide-structure JSON and the human-readable summary next to
/// the proposal (or into `output_dir`), returning both paths.
pub fn write_outputs(
    deck: &SlideDeck,
    proposal: &Path,
    output_dir: Option<&Path>,
) -> Result<(PathBuf, PathBuf)> {
    let dir = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => proposal
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let stem = proposal
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("proposal");

    let json_path = dir.join(format!("{}_slide_structure.json", stem));
    let mut json = serde_json::to_string_pretty(deck)?;
    json.push('\n');
    fs::write(&json_path, json)?;

    let summary_path = dir.join(format!("{}_slide_content.md", stem));
    fs::write(&summary_path, render_summary(deck))?;

    Ok((json_path, summary_path))
}

pub fn render_summary(deck: &SlideDeck) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Slide Content Summary: {}\n\n", deck.project_name));
    out.push_str(&format!("**Client:** {}\n", deck.client_name));
    out.push_str(&format!("**Total Slides:** {}\n\n---\n\n", deck.total_slides));

    for slide in &deck.slides {
        out.push_str(&format!(
            "## Slide {}: {}\n\n",
            slide.slide_number,
            slide.body.title()
        ));
        out.push_str(&format!("**Type:** {}\n\n", slide.body.kind()));
        match &slide.body {
            SlideBody::ContentTable { .. } => out.push_str("**Content:** Table format\n\n"),
            SlideBody::ContentBullets { content, .. } => {
                out.push_str(&format!("**Content:** {} bullet points\n\n", content.len()))
            }
            _ => {}
        }
        out.push_str("---\n\n");
    }

    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped() -> SlideDeck {
        let doc = ProposalDoc::load(Path::new("tests/fixtures/proposal.md")).unwrap();
        SlideMapper::new(&doc, Some(Path::new("tests/fixtures/architecture.md"))).map()
    }

    #[test]
    fn slide_numbers_are_contiguous() {
        let deck = mapped();
        assert_eq!(deck.total_slides as usize, deck.slides.len());
        let numbers: Vec<u32> = deck.slides.iter().map(|s| s.slide_number).collect();
        let expected: Vec<u32> = (1..=deck.slides.len() as u32).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn slide_sequence_for_fixture() {
        let deck = mapped();
        let kinds: Vec<&str> = deck.slides.iter().map(|s| s.body.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "title",
                "content_table",
                "two_column",
                "diagram",
                "content_bullets",
                "content_table",
                "content_bullets",
                "timeline",
                "module_description",
                "module_description",
                "content_bullets",
                "content_bullets",
            ]
        );
    }

    #[test]
    fn cover_slide_content() {
        let deck = mapped();
        match &deck.slides[0].body {
            SlideBody::Title { title, subtitle, date } => {
                assert_eq!(
                    title,
                    "Video Analytics Solution Proposal for Acme Logistics Ltd."
                );
                assert_eq!(
                    subtitle,
                    "AI-assisted safety monitoring across two warehouse sites"
                );
                assert_eq!(date, "2025-03-14");
            }
            other => panic!("expected title slide, got {}", other.kind()),
        }
    }

    #[test]
    fn scope_slide_has_both_columns() {
        let deck = mapped();
        match &deck.slides[2].body {
            SlideBody::TwoColumn {
                left_column,
                right_column,
                ..
            } => {
                assert_eq!(left_column.content.len(), 3);
                assert_eq!(right_column.content.len(), 2);
            }
            other => panic!("expected two_column slide, got {}", other.kind()),
        }
    }

    #[test]
    fn diagram_slide_carries_mermaid_code() {
        let deck = mapped();
        match &deck.slides[3].body {
            SlideBody::Diagram { diagram, .. } => {
                assert!(diagram.code.starts_with("graph TD"));
                assert!(diagram.description.contains("Cameras stream RTSP"));
            }
            other => panic!("expected diagram slide, got {}", other.kind()),
        }
    }

    #[test]
    fn requirements_table_skips_delimiter_rows() {
        let deck = mapped();
        match &deck.slides[5].body {
            SlideBody::ContentTable { title, table } => {
                assert_eq!(title, "System Requirements: Camera Specification");
                assert!(table.rows.iter().all(|r| !r[0].starts_with("---")));
            }
            other => panic!("expected content_table slide, got {}", other.kind()),
        }
    }

    #[test]
    fn timeline_slide_has_milestones() {
        let deck = mapped();
        match &deck.slides[7].body {
            SlideBody::Timeline { timeline, .. } => {
                assert_eq!(timeline.format, "milestones");
                assert_eq!(timeline.milestones.len(), 3);
            }
            other => panic!("expected timeline slide, got {}", other.kind()),
        }
    }

    #[test]
    fn module_slides_grouped_by_category() {
        let deck = mapped();
        let modules: Vec<&Slide> = deck
            .slides
            .iter()
            .filter(|s| s.body.kind() == "module_description")
            .collect();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].body.title(), "Safety Helmet Detection");
        assert_eq!(modules[1].body.title(), "Danger Zone Intrusion");
    }

    #[test]
    fn missing_diagram_leaves_code_empty() {
        let doc = ProposalDoc::load(Path::new("tests/fixtures/proposal.md")).unwrap();
        let deck = SlideMapper::new(&doc, None).map();
        match &deck.slides[3].body {
            SlideBody::Diagram { diagram, .. } => assert!(diagram.code.is_empty()),
            other => panic!("expected diagram slide, got {}", other.kind()),
        }
    }

    #[test]
    fn summary_lists_every_slide() {
        let deck = mapped();
        let summary = render_summary(&deck);
        assert!(summary.starts_with("# Slide Content Summary: Acme Logistics"));
        assert!(summary.contains("**Total Slides:** 12"));
        for slide in &deck.slides {
            assert!(summary.contains(&format!("## Slide {}:", slide.slide_number)));
        }
    }

    #[test]
    fn outputs_written_to_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let deck = mapped();
        let (json_path, summary_path) = write_outputs(
            &deck,
            Path::new("tests/fixtures/proposal.md"),
            Some(tmp.path()),
        )
        .unwrap();
        assert!(json_path.ends_with("proposal_slide_structure.json"));
        let parsed: SlideDeck =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed.total_slides, deck.total_slides);
        assert!(summary_path.exists());
    }

    #[test]
    fn bullet_slides_are_never_empty() {
        let deck = mapped();
        for slide in &deck.slides {
            if let SlideBody::ContentBullets { content, .. } = &slide.body {
                assert!(!content.is_empty());
            }
        }
    }
}
