//! Element references: the lookup keys handed to the polling locator.
//!
//! An [`ElementRef`] is never a live element. It names a selection strategy
//! and a value, optionally scoped under a parent reference and narrowed to
//! the n-th match. Resolution happens in [`crate::Session`] on every call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum By {
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// Single class name
    ClassName(String),
    /// Tag name (e.g., "h1")
    TagName(String),
    /// CSS selector
    Css(String),
    /// XPath expression (relative expressions start with `.`)
    XPath(String),
    /// Exact visible text of an anchor
    LinkText(String),
}

impl By {
    /// Create an id strategy
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a name strategy
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a class strategy
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Create a tag strategy
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Create a CSS strategy
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath strategy
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a link-text strategy
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Short strategy label used in diagnostics
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ClassName(_) => "class",
            Self::TagName(_) => "tag",
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::LinkText(_) => "link",
        }
    }

    /// The raw selector value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::Name(v)
            | Self::ClassName(v)
            | Self::TagName(v)
            | Self::Css(v)
            | Self::XPath(v)
            | Self::LinkText(v) => v,
        }
    }

    /// Equivalent CSS selector, when one exists
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("[id={}]", css_string(id))),
            Self::Name(name) => Some(format!("[name={}]", css_string(name))),
            Self::ClassName(class) => Some(format!(".{class}")),
            Self::TagName(tag) => Some(tag.clone()),
            Self::Css(css) => Some(css.clone()),
            Self::XPath(_) | Self::LinkText(_) => None,
        }
    }

    /// Equivalent relative XPath expression, when one exists
    #[must_use]
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!(".//*[@id={}]", xpath_string(id))),
            Self::Name(name) => Some(format!(".//*[@name={}]", xpath_string(name))),
            Self::ClassName(class) => Some(format!(
                ".//*[contains(concat(' ', normalize-space(@class), ' '), ' {class} ')]"
            )),
            Self::TagName(tag) => Some(format!(".//{tag}")),
            Self::XPath(expr) => Some(expr.clone()),
            Self::LinkText(text) => {
                Some(format!(".//a[normalize-space(.)={}]", xpath_string(text)))
            }
            Self::Css(_) => None,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

fn css_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn xpath_string(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

/// An immutable element reference: strategy, optional parent scope, optional index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    by: By,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Box<ElementRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
}

impl ElementRef {
    /// Create a reference from a strategy
    #[must_use]
    pub const fn new(by: By) -> Self {
        Self {
            by,
            scope: None,
            index: None,
        }
    }

    /// Reference by id
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(By::id(id))
    }

    /// Reference by name attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(By::name(name))
    }

    /// Reference by class name
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::new(By::class(class))
    }

    /// Reference by tag name
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(By::tag(tag))
    }

    /// Reference by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(By::css(selector))
    }

    /// Reference by XPath expression
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::new(By::xpath(expr))
    }

    /// Reference by exact link text
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(By::link_text(text))
    }

    /// Search only inside the element resolved by `parent`
    #[must_use]
    pub fn within(mut self, parent: ElementRef) -> Self {
        self.scope = Some(Box::new(parent));
        self
    }

    /// Narrow to the n-th match (zero-based, document order)
    #[must_use]
    pub const fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// The selection strategy
    #[must_use]
    pub const fn by(&self) -> &By {
        &self.by
    }

    /// The parent scope, if any
    #[must_use]
    pub fn scope(&self) -> Option<&ElementRef> {
        self.scope.as_deref()
    }

    /// The match index, if any
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }
}

impl From<By> for ElementRef {
    fn from(by: By) -> Self {
        Self::new(by)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope} >> ")?;
        }
        write!(f, "{}", self.by)?;
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}
