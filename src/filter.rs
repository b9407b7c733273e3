//! Entity filtering for -e expressions
//!
//! Supports:
//! - Explicit names: -e "only=Roland Banks,Zoey Samaras"
//! - Regex match: -e "regex=^(Roland|Jenny)"
//!
//! Filtering drops matrix columns only; the time axis is unaffected.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::HashSet;

/// Filter that determines which entities are kept
#[derive(Debug, Clone)]
pub struct EntityFilter {
    rule: Rule,
}

#[derive(Debug, Clone)]
enum Rule {
    All,
    Only(HashSet<String>),
    Pattern(Regex),
}

impl EntityFilter {
    /// Create a filter that keeps every entity
    pub fn all() -> Self {
        Self { rule: Rule::All }
    }

    /// Parse a filter expression like "only=A,B" or "regex=PATTERN"
    pub fn from_expr(expr: &str) -> Result<Self> {
        if let Some(names) = expr.strip_prefix("only=") {
            let include: HashSet<String> = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            Ok(Self {
                rule: Rule::Only(include),
            })
        } else if let Some(pattern) = expr.strip_prefix("regex=") {
            let regex = Regex::new(pattern)
                .with_context(|| format!("Invalid entity regex: {}", pattern))?;
            Ok(Self {
                rule: Rule::Pattern(regex),
            })
        } else {
            bail!(
                "Invalid entity filter: {}. Expected only=NAME[,NAME...] or regex=PATTERN",
                expr
            );
        }
    }

    /// Check if an entity should be kept
    pub fn matches(&self, entity: &str) -> bool {
        match &self.rule {
            Rule::All => true,
            Rule::Only(set) => set.contains(entity),
            Rule::Pattern(regex) => regex.is_match(entity),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self.rule, Rule::All)
    }
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self::all()
    }
}
