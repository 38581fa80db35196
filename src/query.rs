use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

use crate::codec::decode;

/// Somewhere the current page address can be read from. Readers call [`Location::href`]
/// every time they need the address, so a location that changes is always seen fresh
pub trait Location {
    fn href(&self) -> String;
}

impl Location for str {
    fn href(&self) -> String {
        self.to_string()
    }
}

impl Location for String {
    fn href(&self) -> String {
        self.clone()
    }
}

impl Location for Url {
    fn href(&self) -> String {
        self.as_str().to_string()
    }
}

impl<L: Location + ?Sized> Location for &L {
    fn href(&self) -> String {
        (**self).href()
    }
}

impl<L: Location + ?Sized> Location for RefCell<L> {
    fn href(&self) -> String {
        self.borrow().href()
    }
}

impl<L: Location + ?Sized> Location for Rc<L> {
    fn href(&self) -> String {
        (**self).href()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    pub name: String,
    pub value: String,
}

/// Byte offsets of the first two `?` in `url`
fn separators(url: &str) -> Option<(usize, usize)> {
    let first = url.find('?')?;
    let second = first + 1 + url[first + 1..].find('?')?;
    Some((first, second))
}

/// Everything after the second `?`, if there is one
fn parameter_block(url: &str) -> Option<&str> {
    separators(url).map(|(_, second)| &url[second + 1..])
}

/// The query block between the second `?` and the next `?` (or the end)
pub fn query_block_name(url: &str) -> String {
    parameter_block(url)
        .map(|block| block.split('?').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

/// The page identity segment between the first and second `?`
pub fn page_name(url: &str) -> String {
    separators(url)
        .map(|(first, second)| url[first + 1..second].to_string())
        .unwrap_or_default()
}

/// `key=value` fragments of the parameter block. Fragments without a key or without
/// `=` are skipped
fn fragments(url: &str) -> impl Iterator<Item = (&str, &str)> {
    parameter_block(url)
        .into_iter()
        .flat_map(|block| block.split('&'))
        .filter_map(|fragment| {
            let mut parts = fragment.split('=');
            let key = parts.next().filter(|k| !k.is_empty())?;
            let value = parts.next()?;
            Some((key, value))
        })
}

/// The decoded value of the first parameter called `name`, or an empty string
pub fn get_parameter(url: &str, name: &str) -> String {
    fragments(url)
        .find(|(key, _)| *key == name)
        .map(|(_, value)| decode(value))
        .unwrap_or_default()
}

pub fn has_parameter(url: &str, name: &str) -> bool {
    !get_parameter(url, name).is_empty()
}

/// All parameters of the parameter block in order, values decoded
pub fn parameters(url: &str) -> Vec<QueryParameter> {
    fragments(url)
        .map(|(name, value)| QueryParameter {
            name: name.to_string(),
            value: decode(value),
        })
        .collect()
}

/// Reads parameters from the address of a page. Nothing is cached: each call reads
/// the location again
#[derive(Debug, Clone)]
pub struct PageQuery<L> {
    location: L,
}

impl<L: Location> PageQuery<L> {
    pub fn new(location: L) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn block_name(&self) -> String {
        query_block_name(&self.location.href())
    }

    pub fn page_name(&self) -> String {
        page_name(&self.location.href())
    }

    pub fn has(&self, name: &str) -> bool {
        has_parameter(&self.location.href(), name)
    }

    pub fn get(&self, name: &str) -> String {
        get_parameter(&self.location.href(), name)
    }

    pub fn params(&self) -> Vec<QueryParameter> {
        parameters(&self.location.href())
    }
}

#[cfg(test)]
#[test]
fn test_needs_two_separators() {
    for url in ["", "page.html", "page.html?x=1", "?x=1&y=2"] {
        assert_eq!(get_parameter(url, "x"), "");
        assert_eq!(query_block_name(url), "");
        assert_eq!(page_name(url), "");
        assert!(parameters(url).is_empty());
    }
}

#[cfg(test)]
#[test]
fn test_get_parameter() {
    let url = "a?b?x=1&y=2";
    assert_eq!(get_parameter(url, "y"), "2");
    assert_eq!(get_parameter(url, "x"), "1");
    assert_eq!(get_parameter(url, "z"), "");
    assert_eq!(query_block_name(url), "x=1&y=2");
    assert_eq!(page_name(url), "b");
}

#[cfg(test)]
#[test]
fn test_block_name_stops_at_next_separator() {
    assert_eq!(query_block_name("a?b?c?d"), "c");
    assert_eq!(query_block_name("a??x=1"), "x=1");
    assert_eq!(page_name("a??x=1"), "");
}

#[cfg(test)]
#[test]
fn test_malformed_fragments_skipped() {
    let url = "menu.html?menu?flag&=orphan&name=first&name=second&empty=&eq=a=b";
    assert_eq!(get_parameter(url, "flag"), "");
    assert_eq!(get_parameter(url, ""), "");
    assert_eq!(get_parameter(url, "name"), "first");
    assert_eq!(get_parameter(url, "empty"), "");
    assert_eq!(get_parameter(url, "eq"), "a");
    assert!(!has_parameter(url, "empty"));
    assert!(has_parameter(url, "name"));
    assert_eq!(
        parameters(url)
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>(),
        vec!["name", "name", "empty", "eq"]
    );
}

#[cfg(test)]
#[test]
fn test_values_decoded() {
    let url = "chat.html?chat?msg=hello%20world%3F&pct=100%25";
    assert_eq!(get_parameter(url, "msg"), "hello world?");
    assert_eq!(get_parameter(url, "pct"), "100%");
}

#[cfg(test)]
#[test]
fn test_has_mirrors_get() {
    let url = "a?b?x=1&y=&z=%20";
    for name in ["x", "y", "z", "w"] {
        assert_eq!(has_parameter(url, name), !get_parameter(url, name).is_empty());
    }
}

#[cfg(test)]
#[test]
fn test_location_read_live() {
    let location = Rc::new(RefCell::new(String::from("status.html?status?hp=10")));
    let query = PageQuery::new(Rc::clone(&location));
    assert_eq!(query.get("hp"), "10");
    *location.borrow_mut() = String::from("status.html?status?hp=7&mp=3");
    assert_eq!(query.get("hp"), "7");
    assert!(query.has("mp"));
    assert_eq!(query.params().len(), 2);
}

#[cfg(test)]
#[test]
fn test_url_location() {
    let url = Url::parse("file:///ui/menubar.html?menubar?title=File%20Menu").unwrap();
    let query = PageQuery::new(url);
    assert_eq!(query.page_name(), "menubar");
    assert_eq!(query.get("title"), "File Menu");
    let query = PageQuery::new("inline.html?x?k=v");
    assert_eq!(query.get("k"), "v");
}
