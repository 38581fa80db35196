use std::collections::HashMap;
use std::fmt::{self, Display};

/// Build a [`DOMAttributes`] from `key => value` pairs
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::DOMAttributes::empty()
    };
    ($($k:expr => $v:expr),+ $(,)?) => {
        $crate::DOMAttributes(::std::collections::HashMap::from([
            $(($k.to_string(), $v.to_string())),+
        ]))
    };
}

mod events;
mod parsing;
mod style;
#[cfg(test)]
mod tests;

pub use events::{dispatch, Action, EventType, Listener, Pointer};
pub use parsing::document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DOMElement {
    pub name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
    pub listeners: Vec<Listener>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DOMContent {
    Element(DOMElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DOMAttributes(pub HashMap<String, String>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

impl From<DOMElement> for DOMContent {
    fn from(el: DOMElement) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for DOMContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl DOMElement {
    pub fn new(
        name: impl Display,
        attributes: Option<DOMAttributes>,
        contents: Vec<DOMContent>,
    ) -> Self {
        Self {
            name: name.to_string(),
            attributes: attributes.unwrap_or_default(),
            contents,
            listeners: vec![],
        }
    }

    /// Case-insensitive tag name comparison
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&String> {
        self.attributes.0.get(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.0.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.0.remove(name)
    }

    /// Immediate element children, skipping text
    pub fn children(&self) -> impl Iterator<Item = &DOMElement> {
        self.contents.iter().filter_map(|c| match c {
            DOMContent::Element(el) => Some(el),
            DOMContent::Text(_) => None,
        })
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut DOMElement> {
        self.contents.iter_mut().filter_map(|c| match c {
            DOMContent::Element(el) => Some(el),
            DOMContent::Text(_) => None,
        })
    }

    /// Follow a path of element-child indices from this element
    pub fn element_at(&self, path: &[usize]) -> Option<&DOMElement> {
        path.iter()
            .try_fold(self, |el, &idx| el.children().nth(idx))
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut DOMElement> {
        path.iter()
            .try_fold(self, |el, &idx| el.children_mut().nth(idx))
    }

    /// Collect elements called `name` below this one. If `recursive` is false only
    /// immediate children are checked
    pub fn get_elements_by_name(&self, name: &str, recursive: bool) -> Vec<&DOMElement> {
        let mut found = Vec::new();
        for child in self.children() {
            if child.is(name) {
                found.push(child);
            }
            if recursive {
                found.extend(child.get_elements_by_name(name, true));
            }
        }
        found
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&DOMElement> {
        if self.get_attribute("id").map(String::as_str) == Some(id) {
            return Some(self);
        }
        self.children().find_map(|c| c.get_element_by_id(id))
    }

    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut DOMElement> {
        if self.get_attribute("id").map(String::as_str) == Some(id) {
            return Some(self);
        }
        self.children_mut().find_map(|c| c.get_element_by_id_mut(id))
    }

    /// First element called `name` in document order, this one included
    pub fn find_mut(&mut self, name: &str) -> Option<&mut DOMElement> {
        if self.is(name) {
            return Some(self);
        }
        self.children_mut().find_map(|c| c.find_mut(name))
    }

    /// Text placed directly inside this element
    pub fn own_text(&self) -> String {
        self.contents
            .iter()
            .filter_map(|c| match c {
                DOMContent::Text(t) => Some(t.as_str()),
                DOMContent::Element(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// All text below this element in document order
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        for c in &self.contents {
            match c {
                DOMContent::Text(t) => parts.push(t.clone()),
                DOMContent::Element(el) => {
                    let inner = el.text_content();
                    if !inner.is_empty() {
                        parts.push(inner);
                    }
                }
            }
        }
        parts.join(" ")
    }
}

impl Display for DOMElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        let mut attrs: Vec<_> = self.attributes.0.iter().collect();
        attrs.sort();
        for (k, v) in attrs {
            if v.is_empty() {
                write!(f, " {}", k)?;
            } else {
                write!(f, " {}=\"{}\"", k, v.replace('"', "&quot;"))?;
            }
        }
        write!(f, ">")?;
        if parsing::is_void(&self.name) {
            return Ok(());
        }
        for c in &self.contents {
            match c {
                DOMContent::Element(el) => write!(f, "{}", el)?,
                DOMContent::Text(t) => write!(f, "{}", t)?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}
