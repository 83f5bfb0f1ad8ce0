//! Rule engine: dispatch, isolation, cancellation.
//!
//! Rules are free functions registered against one syntax-node kind. The
//! runner walks a tree in pre-order and invokes every rule whose kind
//! matches the visited node. Rules are independent and side-effect-free; a
//! panicking rule is contained and the rest of the file still gets
//! analyzed. Output ordering is deterministic: visit order, then
//! registration order within a node.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::semantic::{DomainVocabulary, SemanticOracle};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};

use super::types::{CancellationToken, Error, Finding, RuleDescriptor};
use super::{backing_members, callbacks, registrations, wrappers};

/// Everything a rule check sees: the matched node plus the read-only
/// analysis surfaces. Built fresh per node visit.
pub struct RuleContext<'t> {
    pub node: SyntaxNode<'t>,
    pub tree: &'t SyntaxTree,
    pub oracle: &'t dyn SemanticOracle,
    pub vocab: &'t DomainVocabulary,
}

/// A registered rule: one syntax kind, one check function, and the
/// descriptors it may emit.
#[derive(Clone)]
pub struct Rule {
    pub kind: SyntaxKind,
    pub descriptors: Vec<&'static RuleDescriptor>,
    pub check: fn(&RuleContext<'_>) -> Vec<Finding>,
}

/// Executes registered rules over syntax trees.
pub struct Runner {
    rules: Vec<Rule>,
    by_kind: HashMap<SyntaxKind, Vec<usize>>,
}

impl Runner {
    /// An empty runner; register rules explicitly.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            by_kind: HashMap::new(),
        }
    }

    /// The correctness rule set.
    pub fn with_default_rules() -> Self {
        let mut runner = Self::new();
        for rule in backing_members::rules() {
            runner.register(rule);
        }
        for rule in registrations::default_rules() {
            runner.register(rule);
        }
        for rule in wrappers::rules() {
            runner.register(rule);
        }
        for rule in callbacks::rules() {
            runner.register(rule);
        }
        runner
    }

    /// Correctness rules plus the style rules.
    pub fn with_all_rules() -> Self {
        let mut runner = Self::with_default_rules();
        for rule in registrations::style_rules() {
            runner.register(rule);
        }
        runner
    }

    pub fn register(&mut self, rule: Rule) {
        let index = self.rules.len();
        self.by_kind.entry(rule.kind).or_default().push(index);
        self.rules.push(rule);
    }

    /// Descriptors of every registered rule, in registration order.
    pub fn descriptors(&self) -> Vec<&'static RuleDescriptor> {
        self.rules
            .iter()
            .flat_map(|r| r.descriptors.iter().copied())
            .collect()
    }

    /// Run all registered rules over one tree.
    pub fn run(
        &self,
        tree: &SyntaxTree,
        oracle: &dyn SemanticOracle,
        vocab: &DomainVocabulary,
        cancel: &CancellationToken,
    ) -> Result<Vec<Finding>, Error> {
        let mut findings = Vec::new();
        for node in tree.root().descendants() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let indices = match self.by_kind.get(&node.kind()) {
                Some(indices) => indices,
                None => continue,
            };
            for &index in indices {
                let rule = &self.rules[index];
                let ctx = RuleContext {
                    node,
                    tree,
                    oracle,
                    vocab,
                };
                // One failing rule must not abort analysis of the rest of
                // the file.
                match catch_unwind(AssertUnwindSafe(|| (rule.check)(&ctx))) {
                    Ok(batch) => findings.extend(batch),
                    Err(_) => {
                        let rules: Vec<_> =
                            rule.descriptors.iter().map(|d| d.id.as_str()).collect();
                        warn!(rules = ?rules, node = %node.id(), "rule panicked; skipping node");
                    }
                }
            }
        }
        Ok(findings)
    }

    /// Run over several compilation units concurrently.
    ///
    /// Findings come back in unit order, so output is deterministic
    /// regardless of scheduling.
    pub fn run_parallel(
        &self,
        trees: &[&SyntaxTree],
        oracle: &dyn SemanticOracle,
        vocab: &DomainVocabulary,
        cancel: &CancellationToken,
    ) -> Result<Vec<Finding>, Error> {
        use rayon::prelude::*;

        let results: Vec<_> = trees
            .par_iter()
            .map(|tree| self.run(tree, oracle, vocab, cancel))
            .collect();

        let mut findings = Vec::new();
        for result in results {
            findings.extend(result?);
        }
        Ok(findings)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
