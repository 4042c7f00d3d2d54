//=========================================================================
// Context Rules
//=========================================================================
//
// Ordered substring rules resolving a context name (e.g. the name of
// the loaded scene) to a typed target such as a canvas kind or a
// screen id.
//
// Resolution walks the rules in insertion order and the first pattern
// contained in the context name wins. Insertion order therefore is the
// precedence order: a rule for "Game" inserted before a rule for
// "GameOver" will also claim "GameOverScene". Callers that need the
// narrower rule must insert it first.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;

use log::{debug, error};

//=== Context Rule ========================================================

/// A single substring → target mapping.
#[derive(Debug, Clone)]
struct ContextRule<T> {
    pattern: String,
    target: T,
}

//=== Context Matcher =====================================================

/// Ordered first-match-wins substring resolver.
///
/// Matching is case-sensitive. Empty patterns are rejected at insert
/// time because an empty substring would match every context and
/// shadow all later rules.
#[derive(Debug, Clone)]
pub struct ContextMatcher<T> {
    rules: Vec<ContextRule<T>>,
}

impl<T: Copy + Debug> ContextMatcher<T> {
    /// Creates a matcher with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule at the end of the precedence order.
    pub fn insert(&mut self, pattern: impl Into<String>, target: T) {
        let pattern = pattern.into();
        if pattern.is_empty() {
            error!("Refusing empty context pattern for target {:?}", target);
            return;
        }

        debug!("Context rule added: {:?} -> {:?}", pattern, target);
        self.rules.push(ContextRule { pattern, target });
    }

    /// Resolves a context name to the first matching target.
    pub fn resolve(&self, context: &str) -> Option<T> {
        self.rules
            .iter()
            .find(|rule| context.contains(&rule.pattern))
            .map(|rule| rule.target)
    }

    /// Number of installed rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are installed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T: Copy + Debug> Default for ContextMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
