//! # Style Resolution
//!
//! Walks an element tree in pre-order and writes style patches into each
//! node's [`Styled`](super::Styled) slots: first the node kind's implicit
//! style at `ImplicitStyle`, then the node's keyed style at `ExplicitStyle`.
//!
//! A style with a `based_on` key is flattened into one patch before anything
//! is written: base entries first, derived entries layered on top. The patch
//! is applied only once the whole chain resolved, so a broken chain never
//! leaves a node half-styled.
//!
//! Nothing is inherited from ancestors. A container's style only touches the
//! container; its children see their own styles and, at render time, the
//! page defaults.

use super::resources::DictionaryChain;
use super::{Priority, StylePatch};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::error::FolioError;
use crate::model::{Element, ElementType};
use std::collections::HashMap;

/// What looking up a style key produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleLookup {
    /// The chain flattened cleanly.
    Resolved {
        target: ElementType,
        patch: StylePatch,
    },
    /// No dictionary in the chain holds the key.
    NotFound,
    /// Some style in the chain names a base nobody defines.
    MissingBase { style: String, base: String },
    /// The chain loops. Holds the keys walked, ending with the repeated one.
    Cycle(Vec<String>),
}

/// Applies styles from one dictionary chain. Flattened chains are cached
/// per key for the lifetime of the resolver.
pub struct StyleResolver<'a> {
    chain: DictionaryChain<'a>,
    cache: HashMap<String, StyleLookup>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(chain: DictionaryChain<'a>) -> Self {
        Self {
            chain,
            cache: HashMap::new(),
        }
    }

    /// Flatten the style stored under `key` and its based-on chain.
    pub fn lookup(&mut self, key: &str) -> StyleLookup {
        if let Some(hit) = self.cache.get(key) {
            return hit.clone();
        }
        let outcome = self.flatten(key);
        self.cache.insert(key.to_string(), outcome.clone());
        outcome
    }

    fn flatten(&self, key: &str) -> StyleLookup {
        let Some(top) = self.chain.lookup(key) else {
            return StyleLookup::NotFound;
        };

        // Walk derived -> base, collecting patches.
        let mut walked = vec![key.to_string()];
        let mut patches = vec![&top.setters];
        let mut current = top;
        while let Some(base) = current.based_on.as_deref() {
            if walked.iter().any(|k| k == base) {
                walked.push(base.to_string());
                return StyleLookup::Cycle(walked);
            }
            let Some(def) = self.chain.lookup(base) else {
                return StyleLookup::MissingBase {
                    style: walked.last().cloned().unwrap_or_default(),
                    base: base.to_string(),
                };
            };
            walked.push(base.to_string());
            patches.push(&def.setters);
            current = def;
        }

        let patch = patches
            .iter()
            .rev()
            .fold(StylePatch::default(), |acc, p| acc.merge(p));
        StyleLookup::Resolved {
            target: top.target,
            patch,
        }
    }

    /// Style `root` and every descendant in pre-order.
    ///
    /// Recoverable problems go to `sink`. A based-on cycle is reported and
    /// then returned as [`FolioError::StyleCycle`].
    pub fn resolve(
        &mut self,
        root: &mut Element,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), FolioError> {
        self.style_node(root, sink)?;
        for child in root.children_mut() {
            self.resolve(child, sink)?;
        }
        Ok(())
    }

    fn style_node(
        &mut self,
        element: &mut Element,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), FolioError> {
        let kind = element.element_type();
        self.apply(
            element,
            kind.implicit_style_key(),
            Priority::ImplicitStyle,
            sink,
        )?;
        if let Some(key) = element.style.clone() {
            self.apply(element, &key, Priority::ExplicitStyle, sink)?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        element: &mut Element,
        key: &str,
        priority: Priority,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), FolioError> {
        match self.lookup(key) {
            StyleLookup::Resolved { target, patch } => {
                if target != element.element_type() {
                    log::debug!("skipping style '{}' on {}", key, element.describe());
                    sink.report(Diagnostic::warning(
                        DiagnosticCode::StyleTargetMismatch,
                        format!(
                            "Style '{}' targets {} but {} is a {}",
                            key,
                            target,
                            element.describe(),
                            element.element_type()
                        ),
                    ));
                    return Ok(());
                }
                element.apply_patch(&patch, priority);
            }
            StyleLookup::NotFound => {
                // Implicit styles are optional.
                if priority == Priority::ExplicitStyle {
                    sink.report(Diagnostic::error(
                        DiagnosticCode::MissingStyleKey,
                        format!("Style '{}' requested by {} was not found", key, element.describe()),
                    ));
                }
            }
            StyleLookup::MissingBase { style, base } => {
                sink.report(Diagnostic::error(
                    DiagnosticCode::MissingBasedOnKey,
                    format!(
                        "Style '{}' is based on '{}', which was not found (applying '{}' to {})",
                        style,
                        base,
                        key,
                        element.describe()
                    ),
                ));
            }
            StyleLookup::Cycle(chain) => {
                let element = element.describe();
                sink.report(Diagnostic::error(
                    DiagnosticCode::StyleCycle,
                    format!(
                        "Based-on cycle {} while styling {}",
                        chain.join(" -> "),
                        element
                    ),
                ));
                return Err(FolioError::StyleCycle { chain, element });
            }
        }
        Ok(())
    }
}
