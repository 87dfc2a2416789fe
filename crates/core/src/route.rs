//! Routing decisions attached to chunks by the language/domain router.

use serde::{Deserialize, Serialize};

/// Processing route for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Punjabi,
    English,
    ScriptureQuoteLikely,
    Mixed,
    Unknown,
}

impl Route {
    /// ISO 639-1 language hint to pass to ASR engines, when the route
    /// implies one. Gurbani is decoded with the Punjabi hint.
    pub fn language_hint(&self) -> Option<&'static str> {
        match self {
            Route::Punjabi | Route::ScriptureQuoteLikely => Some("pa"),
            Route::English => Some("en"),
            Route::Mixed | Route::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Punjabi => "punjabi",
            Route::English => "english",
            Route::ScriptureQuoteLikely => "scripture_quote_likely",
            Route::Mixed => "mixed",
            Route::Unknown => "unknown",
        }
    }
}

/// A route plus the rule that produced it. The reason string is retained
/// on the final segment for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub route: Route,
    pub reason: String,
}

impl RouteDecision {
    pub fn new(route: Route, reason: impl Into<String>) -> Self {
        Self {
            route,
            reason: reason.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Route::Unknown, "no signal fired")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_hints() {
        assert_eq!(Route::Punjabi.language_hint(), Some("pa"));
        assert_eq!(Route::ScriptureQuoteLikely.language_hint(), Some("pa"));
        assert_eq!(Route::English.language_hint(), Some("en"));
        assert_eq!(Route::Mixed.language_hint(), None);
    }

    #[test]
    fn test_serde_route_names() {
        let json = serde_json::to_string(&Route::ScriptureQuoteLikely).unwrap();
        assert_eq!(json, "\"scripture_quote_likely\"");
    }
}
