//! In-memory scripture index: record store, trigram search, shabad context.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use katha_core::{ScriptureLine, ScriptureSource};

use crate::normalize::{normalize_gurmukhi_query, tokenize, trigrams};
use crate::store::load_lines;
use crate::ScriptureError;

/// A search result with its lexical similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub line: ScriptureLine,
    /// Normalized edit similarity between query and line, in [0, 1].
    pub score: f32,
}

/// Read-only scripture index shared across the pipeline.
pub struct ScriptureIndex {
    lines: Vec<ScriptureLine>,
    /// Normalized Gurmukhi per line, parallel to `lines`.
    normalized: Vec<String>,
    by_id: HashMap<String, usize>,
    /// Line indices per shabad, sorted by line position.
    by_shabad: HashMap<String, Vec<usize>>,
    /// Character-trigram postings over normalized text.
    trigram_postings: HashMap<String, Vec<u32>>,
    /// Every distinct token of the corpus, for vocabulary-density checks.
    vocabulary: HashSet<String>,
    has_dasam: bool,
}

impl ScriptureIndex {
    /// Open the index from the configured databases. The primary corpus is
    /// required; the secondary Dasam corpus is loaded when present.
    pub fn open(sggs_path: &Path, dasam_path: Option<&Path>) -> Result<Self, ScriptureError> {
        let mut lines = load_lines(sggs_path, ScriptureSource::Sggs)?;

        let mut has_dasam = false;
        if let Some(dasam) = dasam_path {
            if dasam.exists() {
                match load_lines(dasam, ScriptureSource::DasamGranth) {
                    Ok(mut dasam_lines) => {
                        has_dasam = !dasam_lines.is_empty();
                        lines.append(&mut dasam_lines);
                    }
                    Err(e) => {
                        // Secondary corpus is best-effort; quote matching
                        // falls back to SGGS only.
                        tracing::warn!(error = %e, "failed to load Dasam Granth corpus");
                    }
                }
            } else {
                debug!(path = %dasam.display(), "Dasam Granth corpus not present");
            }
        }

        Ok(Self::build(lines, has_dasam))
    }

    /// Build an index directly from lines. Used by tests and by callers
    /// that source the corpus from something other than SQLite.
    pub fn from_lines(lines: Vec<ScriptureLine>) -> Self {
        let has_dasam = lines
            .iter()
            .any(|l| l.source == ScriptureSource::DasamGranth);
        Self::build(lines, has_dasam)
    }

    fn build(lines: Vec<ScriptureLine>, has_dasam: bool) -> Self {
        let mut normalized = Vec::with_capacity(lines.len());
        let mut by_id = HashMap::with_capacity(lines.len());
        let mut by_shabad: HashMap<String, Vec<usize>> = HashMap::new();
        let mut trigram_postings: HashMap<String, Vec<u32>> = HashMap::new();
        let mut vocabulary = HashSet::new();

        for (idx, line) in lines.iter().enumerate() {
            let norm = normalize_gurmukhi_query(&line.gurmukhi);

            for token in norm.split_whitespace() {
                vocabulary.insert(token.to_string());
            }
            for gram in trigrams(&norm) {
                let postings = trigram_postings.entry(gram).or_default();
                // A line contributes each trigram once.
                if postings.last() != Some(&(idx as u32)) {
                    postings.push(idx as u32);
                }
            }

            by_id.insert(line.line_id.clone(), idx);
            if let Some(shabad) = &line.shabad_id {
                by_shabad.entry(shabad.clone()).or_default().push(idx);
            }
            normalized.push(norm);
        }

        for indices in by_shabad.values_mut() {
            indices.sort_by_key(|&i| lines[i].line_position.unwrap_or(u32::MAX));
        }

        info!(
            lines = lines.len(),
            vocabulary = vocabulary.len(),
            trigrams = trigram_postings.len(),
            "scripture index ready"
        );

        Self {
            lines,
            normalized,
            by_id,
            by_shabad,
            trigram_postings,
            vocabulary,
            has_dasam,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the secondary Dasam corpus is loaded.
    pub fn has_dasam(&self) -> bool {
        self.has_dasam
    }

    /// Whether a normalized token appears anywhere in the corpus.
    pub fn vocabulary_contains(&self, token: &str) -> bool {
        self.vocabulary.contains(token)
    }

    /// Up to `top_k` lines ordered by lexical similarity to the query.
    /// An empty result is normal, not an error.
    pub fn search_by_text(&self, query_gurmukhi: &str, top_k: usize) -> Vec<SearchHit> {
        let query = normalize_gurmukhi_query(query_gurmukhi);
        if query.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut candidates = self.trigram_candidates(&query);
        if candidates.is_empty() {
            // Short or noisy queries may share no trigram with the corpus;
            // fall back to token overlap so they still produce candidates.
            candidates = self.token_overlap_candidates(&query);
        }
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .map(|idx| {
                let score = lexical_similarity(&query, &self.normalized[idx]);
                SearchHit {
                    line: self.lines[idx].clone(),
                    score,
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }

    /// Exact retrieval by line id.
    pub fn get_line(&self, line_id: &str) -> Result<&ScriptureLine, ScriptureError> {
        self.by_id
            .get(line_id)
            .map(|&idx| &self.lines[idx])
            .ok_or_else(|| ScriptureError::LineNotFound(line_id.to_string()))
    }

    /// Lines of the same shabad within `radius` positions of the given
    /// line, ordered by position. A line without a shabad yields itself.
    pub fn get_context(&self, line_id: &str, radius: u32) -> Result<Vec<ScriptureLine>, ScriptureError> {
        let line = self.get_line(line_id)?;

        let Some(shabad_id) = &line.shabad_id else {
            return Ok(vec![line.clone()]);
        };
        let Some(members) = self.by_shabad.get(shabad_id) else {
            return Ok(vec![line.clone()]);
        };

        let center = members
            .iter()
            .position(|&i| self.lines[i].line_id == line.line_id)
            .unwrap_or(0);
        let start = center.saturating_sub(radius as usize);
        let end = (center + radius as usize + 1).min(members.len());

        Ok(members[start..end]
            .iter()
            .map(|&i| self.lines[i].clone())
            .collect())
    }

    /// Candidate line indices sharing trigrams with the query, best first.
    fn trigram_candidates(&self, query: &str) -> Vec<usize> {
        const MAX_CANDIDATES: usize = 200;

        let grams = trigrams(query);
        if grams.is_empty() {
            return Vec::new();
        }

        let mut counts: HashMap<u32, u32> = HashMap::new();
        for gram in &grams {
            if let Some(postings) = self.trigram_postings.get(gram) {
                for &idx in postings {
                    *counts.entry(idx).or_insert(0) += 1;
                }
            }
        }

        let mut scored: Vec<(u32, u32)> = counts.into_iter().collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|(idx, _)| idx as usize)
            .collect()
    }

    /// Word-overlap fallback for queries with no trigram hits.
    fn token_overlap_candidates(&self, query: &str) -> Vec<usize> {
        const MAX_CANDIDATES: usize = 100;

        let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, usize)> = self
            .normalized
            .iter()
            .enumerate()
            .filter_map(|(idx, norm)| {
                let overlap = norm
                    .split_whitespace()
                    .filter(|t| query_tokens.contains(*t))
                    .count();
                (overlap > 0).then_some((idx, overlap))
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Normalized edit similarity, with a containment boost so a query that is
/// a clean prefix or infix of a longer canonical line still ranks high.
fn lexical_similarity(query: &str, line: &str) -> f32 {
    let edit = strsim::normalized_levenshtein(query, line) as f32;
    if line.contains(query) || query.contains(line) {
        let shorter = query.chars().count().min(line.chars().count()) as f32;
        let longer = query.chars().count().max(line.chars().count()) as f32;
        let containment = if longer > 0.0 { shorter / longer } else { 0.0 };
        edit.max(0.5 + 0.5 * containment)
    } else {
        edit
    }
}
