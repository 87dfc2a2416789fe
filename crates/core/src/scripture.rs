//! Canonical scripture reference data.

use serde::{Deserialize, Serialize};

/// Which scripture a line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptureSource {
    Sggs,
    DasamGranth,
    Other,
}

impl ScriptureSource {
    /// Human-readable name used in rendered transcripts.
    pub fn display_name(&self) -> &'static str {
        match self {
            ScriptureSource::Sggs => "Sri Guru Granth Sahib Ji",
            ScriptureSource::DasamGranth => "Dasam Granth",
            ScriptureSource::Other => "Other Literature",
        }
    }
}

/// A canonical line from the scripture index. Treated as immutable
/// reference data for the lifetime of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptureLine {
    /// Stable identifier within the source corpus.
    pub line_id: String,
    pub source: ScriptureSource,
    /// Canonical Gurmukhi text.
    pub gurmukhi: String,
    /// Roman transliteration, when the corpus carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roman: Option<String>,
    /// Page number (1–1430 for SGGS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ang: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Shabad this line belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shabad_id: Option<String>,
    /// Position of the line within its shabad.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_position: Option<u32>,
}

impl ScriptureLine {
    pub fn new(
        line_id: impl Into<String>,
        source: ScriptureSource,
        gurmukhi: impl Into<String>,
    ) -> Self {
        Self {
            line_id: line_id.into(),
            source,
            gurmukhi: gurmukhi.into(),
            roman: None,
            ang: None,
            raag: None,
            author: None,
            shabad_id: None,
            line_position: None,
        }
    }

    pub fn with_roman(mut self, roman: impl Into<String>) -> Self {
        self.roman = Some(roman.into());
        self
    }

    pub fn with_ang(mut self, ang: u16) -> Self {
        self.ang = Some(ang);
        self
    }

    pub fn with_raag(mut self, raag: impl Into<String>) -> Self {
        self.raag = Some(raag.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_shabad(mut self, shabad_id: impl Into<String>, position: u32) -> Self {
        self.shabad_id = Some(shabad_id.into());
        self.line_position = Some(position);
        self
    }
}
