use std::sync::LazyLock;

use regex::Regex;

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+)$").unwrap());
static SUBSECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^###\s+(.+)$").unwrap());

#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub body: String,
}

/// Named `##` sections in document order. Duplicate headings keep their
/// first position but the later body wins.
#[derive(Debug, Default)]
pub struct Sections(Vec<Section>);

impl Sections {
    /// Body of the named section, empty if the heading is absent.
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.body.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, name: String, body: String) {
        match self.0.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.body = body,
            None => self.0.push(Section { name, body }),
        }
    }
}

/// Partition a document at `## Heading` lines. Each span between two
/// consecutive headings (or end of document) belongs to the preceding one.
pub fn split_sections(content: &str) -> Sections {
    let mut sections = Sections::default();
    for (name, body) in split_at(&SECTION_RE, content) {
        sections.insert(name, body);
    }
    sections
}

/// Same span rule one level down, at `### Subheading` lines. Returned in
/// document order; subsection slides follow it.
pub fn split_subsections(body: &str) -> Vec<(String, String)> {
    split_at(&SUBSECTION_RE, body)
}

fn split_at(heading: &Regex, content: &str) -> Vec<(String, String)> {
    let matches: Vec<_> = heading.captures_iter(content).collect();
    let mut spans = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let name = caps[1].trim().to_string();
        let start = caps.get(0).unwrap().end();
        let end = matches
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(content.len());
        spans.push((name, content[start..end].trim().to_string()));
    }
    spans
}

/// Loose section lookup: `##+ <name>` anywhere on the heading line,
/// case-insensitive, span running to the next `##` or end of document.
/// A numbered heading like `## 2. NAME` does not match; callers fall
/// through to their whole-document patterns in that case.
pub fn named_section<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!(r"(?is)##+\s*{}.*?\n", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(content)?;
    let rest = &content[m.end()..];
    let end = rest.find("##").unwrap_or(rest.len());
    Some(&rest[..end])
}

// ── Tests ──
