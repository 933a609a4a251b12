pub mod extract;
pub mod fields;
pub mod sections;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use sections::Sections;

/// A proposal document loaded into memory with its `##` sections split out.
/// All extraction downstream works on this one pass.
#[derive(Debug)]
pub struct ProposalDoc {
    pub path: PathBuf,
    pub content: String,
    pub sections: Sections,
}

impl ProposalDoc {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let sections = sections::split_sections(&content);
        Ok(ProposalDoc {
            path: path.to_path_buf(),
            content,
            sections,
        })
    }

    /// File stem, the fallback for a missing document title.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("proposal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fixture() {
        let doc = ProposalDoc::load(Path::new("tests/fixtures/proposal.md")).unwrap();
        assert_eq!(doc.stem(), "proposal");
        assert_eq!(doc.sections.len(), 8);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ProposalDoc::load(Path::new("tests/fixtures/nope.md")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
