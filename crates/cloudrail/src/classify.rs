//! Provider error normalization
//!
//! Maps an arbitrary error value, of unknown origin among several provider
//! SDK families, to a normalized HTTP-style status. Families are data: an
//! ordered list of named extraction rules evaluated in sequence, so adding a
//! provider is pushing a rule rather than growing a type hierarchy.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

/// Normalized status for one provider error.
///
/// `code: None` means no known family matched ("unclassifiable"), which is
/// deliberately distinct from a classified code of 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub code: Option<u16>,
    pub reason: Option<String>,
}

impl NormalizedError {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            reason: Some(reason.into()),
        }
    }

    pub fn code_only(code: u16) -> Self {
        Self {
            code: Some(code),
            reason: None,
        }
    }

    pub fn unclassified() -> Self {
        Self::default()
    }

    pub fn is_classified(&self) -> bool {
        self.code.is_some()
    }
}

/// Extraction function for one provider family.
///
/// Returns `Some` when the error belongs to the family, with the family's
/// embedded status; `None` otherwise. Must never panic.
pub type ExtractFn = fn(&(dyn StdError + 'static)) -> Option<NormalizedError>;

/// One `(predicate, extractor)` entry in the classification table.
#[derive(Clone, Copy)]
pub struct ClassifierRule {
    /// Family name, for logs and debugging only.
    pub family: &'static str,
    pub extract: ExtractFn,
}

impl ClassifierRule {
    pub const fn new(family: &'static str, extract: ExtractFn) -> Self {
        Self { family, extract }
    }
}

impl std::fmt::Debug for ClassifierRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierRule")
            .field("family", &self.family)
            .finish()
    }
}

/// Ordered family table. First matching rule wins.
///
/// Pure and total: classification never fails and never panics; an error
/// from no known family yields [`NormalizedError::unclassified`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassifierRule>,
}

impl Default for Classifier {
    /// The built-in table: only the provider-agnostic [`HttpApiError`]
    /// family. Provider crates prepend their SDK families.
    fn default() -> Self {
        Self {
            rules: vec![http_api_rule()],
        }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from provider rules; the built-in [`HttpApiError`]
    /// family is appended after them.
    pub fn with_rules(rules: impl IntoIterator<Item = ClassifierRule>) -> Self {
        let mut rules: Vec<ClassifierRule> = rules.into_iter().collect();
        rules.push(http_api_rule());
        Self { rules }
    }

    /// Append a family at the end of the table.
    pub fn push_rule(&mut self, rule: ClassifierRule) {
        self.rules.push(rule);
    }

    /// Classify a typed error, walking its `source()` chain outermost first.
    pub fn classify(&self, error: &(dyn StdError + 'static)) -> NormalizedError {
        let mut current = Some(error);
        while let Some(err) = current {
            for rule in &self.rules {
                if let Some(normalized) = (rule.extract)(err) {
                    tracing::trace!(family = rule.family, code = normalized.code, "error classified");
                    return normalized;
                }
            }
            current = err.source();
        }
        NormalizedError::unclassified()
    }

    /// Classify an `anyhow` report, walking its cause chain outermost first.
    pub fn classify_report(&self, error: &anyhow::Error) -> NormalizedError {
        for cause in error.chain() {
            for rule in &self.rules {
                if let Some(normalized) = (rule.extract)(cause) {
                    tracing::trace!(family = rule.family, code = normalized.code, "error classified");
                    return normalized;
                }
            }
        }
        NormalizedError::unclassified()
    }
}

/// Provider-agnostic HTTP service error: the built-in family.
///
/// Thin wrappers whose SDK surfaces a bare status code raise this directly
/// instead of contributing a dedicated classifier rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("http {code}: {reason}")]
pub struct HttpApiError {
    pub code: u16,
    pub reason: String,
}

impl HttpApiError {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

fn http_api_rule() -> ClassifierRule {
    ClassifierRule::new("http-api", |err| {
        err.downcast_ref::<HttpApiError>()
            .map(|e| NormalizedError::new(e.code, e.reason.clone()))
    })
}
