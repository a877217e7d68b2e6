//! # Resource Dictionaries
//!
//! Named style definitions, looked up by key. A page owns one dictionary and
//! the document owns another; lookups walk a [`DictionaryChain`] (page first,
//! then document) that is passed around explicitly.

use super::StylePatch;
use crate::model::ElementType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A style: which element kind it targets, an optional base style, and the
/// sparse set of properties it writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    pub target: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(default)]
    pub setters: StylePatch,
}

impl StyleDefinition {
    pub fn new(target: ElementType) -> Self {
        Self {
            target,
            based_on: None,
            setters: StylePatch::default(),
        }
    }

    pub fn based_on(mut self, key: &str) -> Self {
        self.based_on = Some(key.to_string());
        self
    }

    /// Record property writes.
    ///
    /// ```
    /// use folio::model::ElementType;
    /// use folio::style::{resources::StyleDefinition, Color};
    ///
    /// let heading = StyleDefinition::new(ElementType::Paragraph).set(|p| {
    ///     p.font_size = Some(20.0);
    ///     p.color = Some(Color::BLUE);
    /// });
    /// assert_eq!(heading.setters.font_size, Some(20.0));
    /// ```
    pub fn set(mut self, f: impl FnOnce(&mut StylePatch)) -> Self {
        f(&mut self.setters);
        self
    }
}

/// Style definitions keyed by string identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceDictionary {
    styles: HashMap<String, StyleDefinition>,
}

impl ResourceDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: &str, definition: StyleDefinition) -> &mut Self {
        self.styles.insert(key.to_string(), definition);
        self
    }

    /// Register a style applied to every element of `kind`.
    pub fn style_type(&mut self, kind: ElementType, setters: StylePatch) -> &mut Self {
        let definition = StyleDefinition {
            target: kind,
            based_on: None,
            setters,
        };
        self.insert(kind.implicit_style_key(), definition)
    }

    pub fn get(&self, key: &str) -> Option<&StyleDefinition> {
        self.styles.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.styles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Dictionaries to search in order. The first hit wins.
#[derive(Debug, Clone, Copy)]
pub struct DictionaryChain<'a> {
    levels: [Option<&'a ResourceDictionary>; 2],
}

impl<'a> DictionaryChain<'a> {
    pub fn new(page: &'a ResourceDictionary, document: &'a ResourceDictionary) -> Self {
        Self {
            levels: [Some(page), Some(document)],
        }
    }

    /// A chain of one dictionary with no fallback.
    pub fn single(dictionary: &'a ResourceDictionary) -> Self {
        Self {
            levels: [Some(dictionary), None],
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&'a StyleDefinition> {
        self.levels.iter().flatten().find_map(|d| d.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn page_level_shadows_document_level() {
        let mut doc = ResourceDictionary::new();
        doc.insert(
            "Body",
            StyleDefinition::new(ElementType::Paragraph).set(|p| p.color = Some(Color::RED)),
        );
        let mut page = ResourceDictionary::new();
        page.insert(
            "Body",
            StyleDefinition::new(ElementType::Paragraph).set(|p| p.color = Some(Color::BLUE)),
        );
        let chain = DictionaryChain::new(&page, &doc);
        assert_eq!(chain.lookup("Body").unwrap().setters.color, Some(Color::BLUE));
    }

    #[test]
    fn falls_back_to_document() {
        let mut doc = ResourceDictionary::new();
        doc.insert("Note", StyleDefinition::new(ElementType::Line));
        let page = ResourceDictionary::new();
        let chain = DictionaryChain::new(&page, &doc);
        assert_eq!(chain.lookup("Note").unwrap().target, ElementType::Line);
        assert!(chain.lookup("Other").is_none());
    }

    #[test]
    fn style_type_uses_implicit_key() {
        let mut dict = ResourceDictionary::new();
        dict.style_type(
            ElementType::Paragraph,
            StylePatch {
                font_size: Some(15.0),
                ..Default::default()
            },
        );
        assert!(dict.contains("type:Paragraph"));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn dictionary_from_json() {
        let json = r#"{
            "Base": { "target": "Paragraph", "setters": { "fontSize": 20 } },
            "Derived": { "target": "Paragraph", "basedOn": "Base" }
        }"#;
        let dict: ResourceDictionary = serde_json::from_str(json).unwrap();
        assert_eq!(dict.get("Derived").unwrap().based_on.as_deref(), Some("Base"));
        assert_eq!(dict.get("Base").unwrap().setters.font_size, Some(20.0));
    }
}
