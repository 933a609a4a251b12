use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;

use crate::error::{Error, Result};

const ID_COLUMN: &str = "ID";
const ANSWER_COLUMN: &str = "presale's Answer";

static BRACKETS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\]]").unwrap());

/// Checklist rows as ordered (placeholder ID, presale answer) pairs.
/// IDs lose their surrounding brackets; a duplicate ID keeps the last
/// answer seen.
pub fn parse_table(content: &str) -> Result<Vec<(String, String)>> {
    let start = content.find("| ID |").ok_or(Error::TableNotFound)?;

    let table_lines: Vec<&str> = content[start..]
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('|') && !l.starts_with("|---"))
        .collect();
    if table_lines.len() < 2 {
        return Err(Error::TableEmpty);
    }

    let columns = row_cells(table_lines[0]);
    let id_col = columns
        .iter()
        .position(|c| c == ID_COLUMN)
        .ok_or(Error::MissingColumn(ID_COLUMN))?;
    let answer_col = columns
        .iter()
        .position(|c| c == ANSWER_COLUMN)
        .ok_or(Error::MissingColumn(ANSWER_COLUMN))?;

    let mut entries: Vec<(String, String)> = Vec::new();
    for row in &table_lines[1..] {
        let cells = row_cells(row);
        if cells.len() <= id_col.max(answer_col) {
            continue;
        }
        let id = BRACKETS_RE.replace_all(&cells[id_col], "").trim().to_string();
        if id.is_empty() {
            continue;
        }
        let answer = cells[answer_col].clone();
        match entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, a)) => *a = answer,
            None => entries.push((id, answer)),
        }
    }

    Ok(entries)
}

fn row_cells(row: &str) -> Vec<String> {
    let parts: Vec<&str> = row.split('|').collect();
    if parts.len() < 3 {
        return Vec::new();
    }
    parts[1..parts.len() - 1]
        .iter()
        .map(|c| c.trim().to_string())
        .collect()
}

/// Outcome of applying checklist answers to a template.
#[derive(Debug, Default)]
pub struct UpdateOutcome {
    pub content: String,
    /// Placeholders whose empty answer kept the estimate: (id, estimate).
    pub kept: Vec<(String, String)>,
    /// Placeholders replaced by an answer: (id, estimate, answer).
    pub replaced: Vec<(String, String, String)>,
    /// Checklist IDs with no `(estimate) [ID]` occurrence in the template.
    pub not_found: Vec<String>,
}

/// Substitute every `(estimate) [ID]` occurrence. A non-empty answer
/// replaces the whole pattern; an empty answer keeps the bare estimate.
/// Either way the parentheses and the bracketed ID are gone.
pub fn apply_answers(template: &str, entries: &[(String, String)]) -> UpdateOutcome {
    let mut outcome = UpdateOutcome {
        content: template.to_string(),
        ..Default::default()
    };

    for (id, answer) in entries {
        let re = Regex::new(&format!(r"\(([^)]+)\)\s*\[{}\]", regex::escape(id))).unwrap();
        let matches: Vec<(String, String)> = re
            .captures_iter(&outcome.content)
            .map(|caps| (caps[0].to_string(), caps[1].trim().to_string()))
            .collect();

        if matches.is_empty() {
            outcome.not_found.push(id.clone());
            continue;
        }

        for (full, estimate) in matches {
            let answer = answer.trim();
            let replacement = if answer.is_empty() {
                outcome.kept.push((id.clone(), estimate.clone()));
                estimate
            } else {
                outcome
                    .replaced
                    .push((id.clone(), estimate, answer.to_string()));
                answer.to_string()
            };
            outcome.content = outcome.content.replacen(&full, &replacement, 1);
        }
    }

    outcome
}

/// Report handed back to the CLI after a template update.
pub struct UpdateReport {
    pub kept: Vec<(String, String)>,
    pub replaced: Vec<(String, String, String)>,
    pub not_found: Vec<String>,
    pub backup: Option<PathBuf>,
    pub target: PathBuf,
}

impl UpdateReport {
    pub fn print(&self) {
        if let Some(backup) = &self.backup {
            println!("Backup created: {}", backup.display());
        }
        println!("Template updated: {}", self.target.display());

        if !self.kept.is_empty() {
            println!("\nKept estimates (no presale answer): {}", self.kept.len());
            for (id, value) in self.kept.iter().take(5) {
                println!("  [{}]: {}", id, truncate(value, 60));
            }
            if self.kept.len() > 5 {
                println!("  ... and {} more", self.kept.len() - 5);
            }
        }

        if !self.replaced.is_empty() {
            println!("\nReplaced with presale answers: {}", self.replaced.len());
            for (id, old, new) in self.replaced.iter().take(5) {
                println!("  [{}]: {} -> {}", id, truncate(old, 50), truncate(new, 50));
            }
            if self.replaced.len() > 5 {
                println!("  ... and {} more", self.replaced.len() - 5);
            }
        }

        if !self.not_found.is_empty() {
            println!(
                "\nIn checklist but not in template: {}",
                self.not_found.len()
            );
            for id in self.not_found.iter().take(5) {
                println!("  {}", id);
            }
            if self.not_found.len() > 5 {
                println!("  ... and {} more", self.not_found.len() - 5);
            }
        }
    }
}

/// Apply a checklist to a template file. Without an explicit output path
/// the template is rewritten in place after a timestamped backup copy.
pub fn update_template(
    checklist_path: &Path,
    template_path: &Path,
    output: Option<&Path>,
) -> Result<UpdateReport> {
    if !checklist_path.exists() {
        return Err(Error::FileNotFound(checklist_path.to_path_buf()));
    }
    if !template_path.exists() {
        return Err(Error::FileNotFound(template_path.to_path_buf()));
    }

    let checklist = fs::read_to_string(checklist_path)?;
    let entries = parse_table(&checklist)?;
    if entries.is_empty() {
        return Err(Error::NoPlaceholders);
    }

    let template = fs::read_to_string(template_path)?;
    let outcome = apply_answers(&template, &entries);
    if outcome.content == template {
        return Err(Error::NothingToUpdate);
    }

    let (backup, target) = match output {
        Some(path) => {
            fs::write(path, &outcome.content)?;
            (None, path.to_path_buf())
        }
        None => {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            let backup_path = template_path.with_extension(format!("backup_{}.md", stamp));
            fs::write(&backup_path, &template)?;
            fs::write(template_path, &outcome.content)?;
            (Some(backup_path), template_path.to_path_buf())
        }
    };

    Ok(UpdateReport {
        kept: outcome.kept,
        replaced: outcome.replaced,
        not_found: outcome.not_found,
        backup,
        target,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
