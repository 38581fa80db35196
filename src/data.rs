//! The host end of the status channel: parsing data messages back out of status lines
//! and handing them to whoever bound to their name.

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::char,
    combinator::rest,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, span, trace, Level};

use crate::codec::{decode, encode, looks_numeric};
use crate::message::{StatusChannel, STATUS_TAG};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("'{name}' has no parameter '{key}'")]
    Missing { name: String, key: String },
    #[error("parameter '{key}' of '{name}' is not numeric: {value:?}")]
    NotNumeric {
        name: String,
        key: String,
        value: String,
    },
    #[error("could not convert parameter '{key}' with a value of {value:?}")]
    Parse { key: String, value: String },
}

/// A named set of parameters received from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaviData {
    name: String,
    params: Vec<(String, String)>,
}

/// `NAVI_DATA:...?name?query`, returning `(name, query)`. Anything between the tag and
/// the first `?` is ignored
fn status_line(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        tuple((tag(STATUS_TAG), take_until("?"))),
        tuple((delimited(char('?'), take_until("?"), char('?')), rest)),
    )(input)
}

impl NaviData {
    /// Build from a name and an encoded `key=value&...` query string
    pub fn new(name: impl Into<String>, query: &str) -> Self {
        let mut data = Self {
            name: name.into(),
            params: vec![],
        };
        for fragment in query.split('&').filter(|f| !f.is_empty()) {
            match fragment.split_once('=') {
                Some((key, value)) => data.insert(key, decode(value)),
                None => trace!(fragment, "Skipping fragment without a value"),
            }
        }
        data
    }

    /// Parse a status line. Anything that is not a data message gives `None`
    pub fn from_status(status: &str) -> Option<Self> {
        let (_, (name, query)) = status_line(status).ok()?;
        Some(Self::new(name, query))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self, name: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.name == name
        } else {
            self.name.eq_ignore_ascii_case(name)
        }
    }

    /// Set `key`, replacing an earlier value in place
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((key.to_string(), value)),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Convert the value of `key`. A missing key is `Ok(None)`
    pub fn get_as<T: FromStr>(&self, key: &str) -> Result<Option<T>, DataError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| DataError::Parse {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
        }
    }

    /// Check that every key is present. Keys written as `#key` must also hold a number
    pub fn ensure(&self, keys: &[&str]) -> Result<(), DataError> {
        for key in keys {
            let (key, numeric) = match key.strip_prefix('#') {
                Some(key) => (key, true),
                None => (*key, false),
            };
            let value = self.get(key).ok_or_else(|| DataError::Missing {
                name: self.name.clone(),
                key: key.to_string(),
            })?;
            if numeric && (value.trim().is_empty() || !looks_numeric(value)) {
                return Err(DataError::NotNumeric {
                    name: self.name.clone(),
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.params.iter().cloned().collect()
    }

    /// Encode the parameters back into a query string
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

type Callback = Box<dyn FnMut(&NaviData)>;

/// Receives status lines and calls back with the data messages among them. General
/// listeners see every message, bound callbacks only messages with their name
#[derive(Default)]
pub struct DataDispatcher {
    listeners: Vec<Callback>,
    bindings: Vec<(String, Callback)>,
}

impl fmt::Debug for DataDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataDispatcher")
            .field("listeners", &self.listeners.len())
            .field(
                "bindings",
                &self.bindings.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl DataDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, callback: impl FnMut(&NaviData) + 'static) {
        self.listeners.push(Box::new(callback));
    }

    pub fn bind(&mut self, name: impl Into<String>, callback: impl FnMut(&NaviData) + 'static) {
        self.bindings.push((name.into(), Box::new(callback)));
    }

    /// Remove every callback bound to `name`, returning how many there were
    pub fn unbind(&mut self, name: &str) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|(n, _)| n != name);
        before - self.bindings.len()
    }

    /// Handle one status line, returning the number of callbacks run
    pub fn dispatch(&mut self, status: &str) -> usize {
        let data = match NaviData::from_status(status) {
            Some(data) => data,
            None => return 0,
        };
        let span = span!(Level::DEBUG, "Dispatching data", name = data.name());
        let _enter = span.enter();
        let mut ran = 0;
        for listener in &mut self.listeners {
            listener(&data);
            ran += 1;
        }
        for (_, callback) in self.bindings.iter_mut().filter(|(n, _)| n == data.name()) {
            callback(&data);
            ran += 1;
        }
        debug!(ran, "Dispatched");
        ran
    }
}

impl StatusChannel for DataDispatcher {
    fn publish(&mut self, status: &str) {
        self.dispatch(status);
    }
}

#[cfg(test)]
use crate::message::QueryMessage;
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[cfg(test)]
#[test]
fn test_from_status() {
    let data = NaviData::from_status("NAVI_DATA:?chat?msg=hi%20there&to=all").unwrap();
    assert_eq!(data.name(), "chat");
    assert_eq!(data.get("msg"), Some("hi there"));
    assert_eq!(data.get("to"), Some("all"));
    assert_eq!(data.get("from"), None);
    assert_eq!(data.len(), 2);

    assert!(NaviData::from_status("Loading page...").is_none());
    assert!(NaviData::from_status("NAVI_DATA:chat").is_none());
    assert!(NaviData::from_status("NAVI_DATA:?chat").is_none());

    let empty = NaviData::from_status("NAVI_DATA:?ping?").unwrap();
    assert!(empty.is_empty());
}

#[cfg(test)]
#[test]
fn test_duplicates_overwrite() {
    let data = NaviData::new("d", "a=1&b=2&a=3&broken");
    assert_eq!(data.get("a"), Some("3"));
    assert_eq!(data.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
}

#[cfg(test)]
#[test]
fn test_is_named() {
    let data = NaviData::new("MenuBar", "");
    assert!(data.is_named("MenuBar", true));
    assert!(!data.is_named("menubar", true));
    assert!(data.is_named("menubar", false));
}

#[cfg(test)]
#[test]
fn test_typed_get() {
    let data = NaviData::new("equip", "slot=3&weight=2.5&name=Sword");
    assert_eq!(data.get_as::<i32>("slot"), Ok(Some(3)));
    assert_eq!(data.get_as::<f32>("weight"), Ok(Some(2.5)));
    assert_eq!(data.get_as::<i32>("missing"), Ok(None));
    assert_eq!(
        data.get_as::<i32>("name"),
        Err(DataError::Parse {
            key: "name".to_string(),
            value: "Sword".to_string()
        })
    );
}

#[cfg(test)]
#[test]
fn test_ensure() {
    let data = NaviData::new("equip", "slot=3&name=Sword&blank=");
    assert_eq!(data.ensure(&["slot", "name", "#slot"]), Ok(()));
    assert_eq!(
        data.ensure(&["slot", "armor"]),
        Err(DataError::Missing {
            name: "equip".to_string(),
            key: "armor".to_string()
        })
    );
    assert!(matches!(
        data.ensure(&["#name"]),
        Err(DataError::NotNumeric { .. })
    ));
    assert!(matches!(
        data.ensure(&["#blank"]),
        Err(DataError::NotNumeric { .. })
    ));
}

#[cfg(test)]
#[test]
fn test_query_string() {
    let data = NaviData::new("q", "text=a%20%26%20b&n=1");
    assert_eq!(data.to_query_string(), "text=a%20%26%20b&n=1");
    assert_eq!(data.to_map().get("text").map(String::as_str), Some("a & b"));
}

#[cfg(test)]
#[test]
fn test_dispatch() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = DataDispatcher::new();
    {
        let seen = Rc::clone(&seen);
        dispatcher.add_listener(move |d| seen.borrow_mut().push(format!("any:{}", d.name())));
    }
    {
        let seen = Rc::clone(&seen);
        dispatcher.bind("equip", move |d| {
            seen.borrow_mut()
                .push(format!("equip:{}", d.get("slot").unwrap_or_default()))
        });
    }

    QueryMessage::new("equip").add("slot", 4).send(&mut dispatcher);
    QueryMessage::new("chat").add("msg", "hi").send(&mut dispatcher);
    assert_eq!(dispatcher.dispatch("not a data message"), 0);
    assert_eq!(
        *seen.borrow(),
        vec!["any:equip", "equip:4", "any:chat"]
    );

    assert_eq!(dispatcher.unbind("equip"), 1);
    assert_eq!(dispatcher.unbind("equip"), 0);
    assert_eq!(dispatcher.dispatch("NAVI_DATA:?equip?slot=1"), 1);
}

#[cfg(test)]
#[test]
fn test_status_prefix_ignored() {
    let data = NaviData::from_status("NAVI_DATA:junk?chat?msg=hi").unwrap();
    assert_eq!(data.name(), "chat");
    assert_eq!(data.get("msg"), Some("hi"));
    assert!(NaviData::from_status("NAVI_DATA:junk?chat").is_none());
}
