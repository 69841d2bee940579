//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse route patterns (`/services/:slug`, `/:pathMatch(.*)*`)
//! - Match normalized paths and extract params
//! - Rank patterns so the most specific one wins
//! - Build concrete paths from a pattern and params
//!
//! # Design Decisions
//! - Static segments are case-sensitive
//! - Catch-all params must be the last segment
//! - No regex; custom param syntax is limited to `(.*)`

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::routing::target::ResolveError;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    Optional(String),
    CatchAll(String),
}

impl Segment {
    fn score(&self) -> u8 {
        match self {
            Segment::Static(_) => 4,
            Segment::Param(_) => 3,
            Segment::Optional(_) => 2,
            Segment::CatchAll(_) => 1,
        }
    }

    fn parse(raw: &str) -> Result<Self, ResolveError> {
        let Some(name) = raw.strip_prefix(':') else {
            return Ok(Segment::Static(raw.to_string()));
        };

        let (name, segment): (&str, fn(String) -> Segment) =
            if let Some(n) = name.strip_suffix("(.*)*").or_else(|| name.strip_suffix("(.*)")) {
                (n, Segment::CatchAll)
            } else if let Some(n) = name.strip_suffix('?') {
                (n, Segment::Optional)
            } else {
                (name, Segment::Param)
            };

        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ResolveError::InvalidPath(format!("bad param segment '{}'", raw)));
        }
        Ok(segment(name.to_string()))
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. Must be absolute.
    pub fn parse(pattern: &str) -> Result<Self, ResolveError> {
        if !pattern.starts_with('/') {
            return Err(ResolveError::InvalidPath(format!(
                "pattern '{}' must start with '/'",
                pattern
            )));
        }

        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(pos) = segments.iter().position(|s| matches!(s, Segment::CatchAll(_))) {
            if pos + 1 != segments.len() {
                return Err(ResolveError::InvalidPath(format!(
                    "catch-all must be the last segment in '{}'",
                    pattern
                )));
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern has no params at all.
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Static(_)))
    }

    /// Names of params that must be supplied to build a path.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(n) => Some(n.as_str()),
            _ => None,
        })
    }

    /// Match a normalized path. Returns extracted params on success.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = BTreeMap::new();
        if match_segments(&self.segments, &parts, &mut params) {
            Some(params)
        } else {
            None
        }
    }

    /// Specificity ordering; `Greater` means `self` should be tried first.
    ///
    /// Segments are compared pairwise; on a shared prefix the shorter pattern
    /// wins, since the longer one can only match the same path through
    /// optional or catch-all tails.
    pub fn compare_rank(&self, other: &PathPattern) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match a.score().cmp(&b.score()) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        other.segments.len().cmp(&self.segments.len())
    }

    /// Build a concrete path from params.
    pub fn build(&self, params: &BTreeMap<String, String>) -> Result<String, String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => parts.push(s.clone()),
                Segment::Param(n) => match params.get(n).filter(|v| !v.is_empty()) {
                    Some(v) => parts.push(v.clone()),
                    None => return Err(n.clone()),
                },
                Segment::Optional(n) | Segment::CatchAll(n) => {
                    if let Some(v) = params.get(n).filter(|v| !v.is_empty()) {
                        parts.push(v.trim_matches('/').to_string());
                    }
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }
}

fn match_segments(
    segments: &[Segment],
    parts: &[&str],
    params: &mut BTreeMap<String, String>,
) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match first {
        Segment::Static(s) => {
            matches!(parts.first(), Some(p) if p == s) && match_segments(rest, &parts[1..], params)
        }
        Segment::Param(n) => {
            let Some(p) = parts.first() else {
                return false;
            };
            params.insert(n.clone(), p.to_string());
            if match_segments(rest, &parts[1..], params) {
                return true;
            }
            params.remove(n);
            false
        }
        Segment::Optional(n) => {
            if let Some(p) = parts.first() {
                params.insert(n.clone(), p.to_string());
                if match_segments(rest, &parts[1..], params) {
                    return true;
                }
                params.remove(n);
            }
            match_segments(rest, parts, params)
        }
        Segment::CatchAll(n) => {
            params.insert(n.clone(), parts.join("/"));
            true
        }
    }
}
