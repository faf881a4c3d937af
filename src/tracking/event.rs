// src/tracking/event.rs
//! Event parsing and formatting
//!
//! An [`EventRecord`] wraps one raw interaction, decides whether it is worth
//! reporting and projects it into the sanitized wire shape.

use crate::tracking::element::{is_editable, Element, ElementNode, ElementSnapshot};
use crate::tracking::sanitize::{sanitize, Prop};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Attribute that opts an element out of tracking
pub const IGNORE_ATTR: &str = "data-bd-ignore";

/// Raw interaction event delivered by the host
#[derive(Clone, Default)]
pub struct RawEvent {
    /// Event type, e.g. "click"
    pub event_type: Option<String>,

    /// Element the event targeted
    pub target: Option<Arc<dyn Element>>,

    pub which: Option<u32>,
    pub button: Option<u32>,
    pub key_code: Option<u32>,
}

impl RawEvent {
    pub fn new(event_type: impl Into<String>, target: Arc<dyn Element>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            target: Some(target),
            ..Default::default()
        }
    }

    pub fn with_which(mut self, which: u32) -> Self {
        self.which = Some(which);
        self
    }

    pub fn with_button(mut self, button: u32) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = Some(key_code);
        self
    }

    /// Numeric code: first non-zero of `which` and `button`, else `key_code`
    pub fn resolved_which(&self) -> Option<u32> {
        self.which
            .filter(|w| *w != 0)
            .or(self.button.filter(|b| *b != 0))
            .or(self.key_code)
    }
}

impl fmt::Debug for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawEvent")
            .field("event_type", &self.event_type)
            .field("has_target", &self.target.is_some())
            .field("which", &self.which)
            .field("button", &self.button)
            .field("key_code", &self.key_code)
            .finish()
    }
}

/// Serializable raw event, as read by the replay binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEventSpec {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub target: Option<ElementSnapshot>,
    pub which: Option<u32>,
    pub button: Option<u32>,
    pub key_code: Option<u32>,
}

impl From<RawEventSpec> for RawEvent {
    fn from(spec: RawEventSpec) -> Self {
        Self {
            event_type: spec.event_type,
            target: spec
                .target
                .map(|snapshot| Arc::new(ElementNode::from(snapshot)) as Arc<dyn Element>),
            which: spec.which,
            button: spec.button,
            key_code: spec.key_code,
        }
    }
}

/// Sanitized event properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub which: Option<u32>,
}

impl EventProperties {
    fn set(&mut self, prop: Prop, raw: Option<String>) {
        let value = raw
            .map(|v| sanitize(prop, &v))
            .filter(|v| !v.is_empty());

        let slot = match prop {
            Prop::TagName => &mut self.tag_name,
            Prop::ClassName => &mut self.class_name,
            Prop::Id => &mut self.id,
            Prop::Href => &mut self.href,
            Prop::InnerText => &mut self.inner_text,
            Prop::EventType => &mut self.event_type,
        };
        *slot = value;
    }
}

/// One record of the delivered batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// Marker identifying the record as a DOM event
    pub event_name: String,

    #[serde(flatten)]
    pub properties: EventProperties,
}

/// A captured interaction
#[derive(Debug, Clone)]
pub struct EventRecord {
    source: RawEvent,
}

impl EventRecord {
    pub fn new(source: RawEvent) -> Self {
        Self { source }
    }

    pub fn event_type(&self) -> Option<&str> {
        self.source.event_type.as_deref()
    }

    pub fn element(&self) -> Option<&dyn Element> {
        self.source.target.as_deref()
    }

    pub fn source(&self) -> &RawEvent {
        &self.source
    }

    /// Whether this event should be reported, using the default opt-out attribute
    pub fn is_trackable(&self) -> bool {
        self.is_trackable_with(IGNORE_ATTR)
    }

    /// Whether this event should be reported.
    ///
    /// Password fields and opted-out elements are never tracked. Key events
    /// on editable elements are dropped so keystrokes are not captured, and
    /// focus/blur on anything else is dropped as noise.
    pub fn is_trackable_with(&self, ignore_attribute: &str) -> bool {
        let (Some(element), Some(event_type)) = (self.element(), self.event_type()) else {
            return false;
        };
        if event_type.is_empty() {
            return false;
        }

        if element.input_type().as_deref() == Some("password") {
            return false;
        }
        if element.has_attribute(ignore_attribute) {
            return false;
        }

        if is_editable(Some(element)) {
            !event_type.contains("key")
        } else {
            event_type != "focus" && event_type != "blur"
        }
    }

    /// Project the event into sanitized properties
    pub fn to_properties(&self) -> EventProperties {
        let mut props = EventProperties::default();

        if let Some(element) = self.element() {
            props.set(Prop::TagName, element.tag_name().map(|t| t.to_lowercase()));
            props.set(
                Prop::ClassName,
                element.class_name().map(|c| c.resolve().to_string()),
            );
            props.set(Prop::Id, element.id());
            props.set(Prop::Href, element.href());
            props.set(
                Prop::InnerText,
                element.inner_text().map(|t| t.trim().to_string()),
            );
        }

        props.set(Prop::EventType, self.source.event_type.clone());
        props.which = self.source.resolved_which();

        props
    }

    /// Project the event into a record tagged with `event_name`
    pub fn to_tracking_record(&self, event_name: &str) -> TrackingRecord {
        TrackingRecord {
            event_name: event_name.to_string(),
            properties: self.to_properties(),
        }
    }
}

impl From<RawEvent> for EventRecord {
    fn from(source: RawEvent) -> Self {
        Self::new(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event_type: &str, element: ElementNode) -> EventRecord {
        EventRecord::new(RawEvent::new(event_type, Arc::new(element)))
    }

    #[test]
    fn test_missing_element_or_type() {
        let no_target = EventRecord::new(RawEvent {
            event_type: Some("click".to_string()),
            ..Default::default()
        });
        assert!(!no_target.is_trackable());

        let no_type = EventRecord::new(RawEvent {
            target: Some(Arc::new(ElementNode::new("BUTTON"))),
            ..Default::default()
        });
        assert!(!no_type.is_trackable());

        assert!(!record("", ElementNode::new("BUTTON")).is_trackable());
    }

    #[test]
    fn test_password_never_tracked() {
        let password = ElementNode::new("INPUT").with_attribute("type", "password");
        assert!(!record("change", password).is_trackable());
    }

    #[test]
    fn test_opt_out_attribute() {
        let ignored = ElementNode::new("BUTTON").with_attribute(IGNORE_ATTR, "");
        assert!(!record("click", ignored).is_trackable());

        let custom = ElementNode::new("BUTTON").with_attribute("data-no-track", "1");
        let custom_record = record("click", custom);
        assert!(custom_record.is_trackable());
        assert!(!custom_record.is_trackable_with("data-no-track"));
    }

    #[test]
    fn test_key_events_on_editable_dropped() {
        assert!(!record("keyup", ElementNode::new("INPUT")).is_trackable());
        assert!(!record("keydown", ElementNode::new("TEXTAREA")).is_trackable());
        assert!(record("change", ElementNode::new("INPUT")).is_trackable());

        let editable_div = ElementNode::new("DIV").with_content_editable("true");
        assert!(!record("keyup", editable_div).is_trackable());
    }

    #[test]
    fn test_focus_on_non_editable_dropped() {
        assert!(!record("focus", ElementNode::new("DIV")).is_trackable());
        assert!(!record("blur", ElementNode::new("DIV")).is_trackable());
        assert!(record("focus", ElementNode::new("INPUT")).is_trackable());
        assert!(record("keyup", ElementNode::new("DIV")).is_trackable());
    }

    #[test]
    fn test_button_click_properties() {
        let button = ElementNode::new("BUTTON")
            .with_id("go")
            .with_class("btn")
            .with_text("Go");
        let event = EventRecord::new(
            RawEvent::new("click", Arc::new(button))
                .with_which(1)
                .with_button(0),
        );

        let props = event.to_properties();
        assert_eq!(props.tag_name.as_deref(), Some("button"));
        assert_eq!(props.class_name.as_deref(), Some("btn"));
        assert_eq!(props.id.as_deref(), Some("go"));
        assert_eq!(props.inner_text.as_deref(), Some("Go"));
        assert_eq!(props.event_type.as_deref(), Some("click"));
        assert_eq!(props.which, Some(1));
        assert!(props.href.is_none());

        let json = serde_json::to_value(event.to_tracking_record("$dom_event")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event_name": "$dom_event",
                "tag_name": "button",
                "class_name": "btn",
                "id": "go",
                "inner_text": "Go",
                "type": "click",
                "which": 1
            })
        );
    }

    #[test]
    fn test_empty_values_dropped() {
        let link = ElementNode::new("A")
            .with_id("")
            .with_href("https://example.com/")
            .with_text("   \n ");
        let props = record("click", link).to_properties();

        assert!(props.id.is_none());
        assert!(props.inner_text.is_none());
        assert_eq!(props.href.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_svg_class_and_trimmed_text() {
        let icon = ElementNode::new("svg")
            .with_svg_class("icon icon-close")
            .with_text("  Close  ");
        let props = record("click", icon).to_properties();

        assert_eq!(props.class_name.as_deref(), Some("icon icon-close"));
        assert_eq!(props.inner_text.as_deref(), Some("Close"));
    }

    #[test]
    fn test_which_resolution() {
        let target: Arc<dyn Element> = Arc::new(ElementNode::new("INPUT"));

        let key = RawEvent::new("change", target.clone()).with_which(0).with_key_code(13);
        assert_eq!(key.resolved_which(), Some(13));

        let button = RawEvent::new("click", target.clone()).with_button(2);
        assert_eq!(button.resolved_which(), Some(2));

        let none = RawEvent::new("scroll", target);
        assert_eq!(none.resolved_which(), None);
    }

    #[test]
    fn test_to_properties_is_idempotent() {
        let event = record("click", ElementNode::new("A").with_class("nav").with_text("Home"));
        assert_eq!(event.to_properties(), event.to_properties());
    }

    #[test]
    fn test_raw_event_spec_conversion() {
        let json = r#"{"type": "click", "which": 1, "target": {"tag_name": "A", "href": "/docs"}}"#;
        let spec: RawEventSpec = serde_json::from_str(json).unwrap();
        let event = EventRecord::from(RawEvent::from(spec));

        assert!(event.is_trackable());
        let props = event.to_properties();
        assert_eq!(props.tag_name.as_deref(), Some("a"));
        assert_eq!(props.href.as_deref(), Some("/docs"));
    }
}
