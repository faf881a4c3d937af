// src/tracking/element.rs
//! Target element abstraction and editability classification
//!
//! The host platform exposes event targets through the [`Element`] trait.
//! Every accessor is optional so that partially populated nodes (text nodes,
//! SVG elements, detached fragments) classify without failing.
//! [`ElementNode`] is a concrete element for hosts that snapshot the document.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Class attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassName {
    /// Plain HTML `className` string
    Plain(String),

    /// SVG animated class value; only `baseVal` is reported
    Animated {
        #[serde(rename = "baseVal")]
        base_val: String,
    },
}

impl ClassName {
    /// Resolve to the reportable class string
    pub fn resolve(&self) -> &str {
        match self {
            ClassName::Plain(value) => value,
            ClassName::Animated { base_val } => base_val,
        }
    }
}

/// An event target as seen by the tracker
pub trait Element: Send + Sync {
    /// Tag name as reported by the platform (usually upper-case for HTML)
    fn tag_name(&self) -> Option<String>;

    fn class_name(&self) -> Option<ClassName>;

    fn id(&self) -> Option<String>;

    fn href(&self) -> Option<String>;

    /// Rendered text content, untrimmed
    fn inner_text(&self) -> Option<String>;

    /// Control type, e.g. "password" for password inputs
    fn input_type(&self) -> Option<String>;

    /// Raw `contentEditable` value
    fn content_editable(&self) -> Option<String>;

    /// Attribute lookup; `Some("")` for a present attribute with no value
    fn attribute(&self, name: &str) -> Option<String>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// Returns true if `element` accepts typed input.
///
/// An element is editable when its `contentEditable` is "true" (any case) or
/// it is an `INPUT` or `TEXTAREA` control.
pub fn is_editable(element: Option<&dyn Element>) -> bool {
    let Some(element) = element else {
        return false;
    };

    if element
        .content_editable()
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    {
        return true;
    }

    element.tag_name().is_some_and(|tag| {
        tag.eq_ignore_ascii_case("INPUT") || tag.eq_ignore_ascii_case("TEXTAREA")
    })
}

/// Serializable element description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSnapshot {
    pub tag_name: Option<String>,
    pub class_name: Option<ClassName>,
    pub id: Option<String>,
    pub href: Option<String>,
    pub inner_text: Option<String>,
    pub content_editable: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

/// In-memory element with mutable attributes
#[derive(Debug, Default)]
pub struct ElementNode {
    tag_name: Option<String>,
    class_name: Option<ClassName>,
    id: Option<String>,
    href: Option<String>,
    inner_text: Option<String>,
    content_editable: Option<String>,
    attributes: RwLock<BTreeMap<String, String>>,
}

impl ElementNode {
    /// Create an element with the given tag name
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(ClassName::Plain(class_name.into()));
        self
    }

    /// Set an SVG-style class value
    pub fn with_svg_class(mut self, base_val: impl Into<String>) -> Self {
        self.class_name = Some(ClassName::Animated {
            base_val: base_val.into(),
        });
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.inner_text = Some(text.into());
        self
    }

    pub fn with_content_editable(mut self, value: impl Into<String>) -> Self {
        self.content_editable = Some(value.into());
        self
    }

    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.write().insert(name.into(), value.into());
        self
    }

    /// Set an attribute on a live element
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.write().insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.attributes.write().remove(name);
    }
}

impl From<ElementSnapshot> for ElementNode {
    fn from(snapshot: ElementSnapshot) -> Self {
        Self {
            tag_name: snapshot.tag_name,
            class_name: snapshot.class_name,
            id: snapshot.id,
            href: snapshot.href,
            inner_text: snapshot.inner_text,
            content_editable: snapshot.content_editable,
            attributes: RwLock::new(snapshot.attributes),
        }
    }
}

impl Element for ElementNode {
    fn tag_name(&self) -> Option<String> {
        self.tag_name.clone()
    }

    fn class_name(&self) -> Option<ClassName> {
        self.class_name.clone()
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn href(&self) -> Option<String> {
        self.href.clone()
    }

    fn inner_text(&self) -> Option<String> {
        self.inner_text.clone()
    }

    fn input_type(&self) -> Option<String> {
        self.attribute("type")
    }

    fn content_editable(&self) -> Option<String> {
        self.content_editable.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().get(name).cloned()
    }
}
