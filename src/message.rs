use std::fmt::{self, Display};
use std::io::{self, Write};
use tracing::{debug, warn};

use crate::codec::{encode, looks_numeric};

/// Marks a status line as a data message for the host
pub const STATUS_TAG: &str = "NAVI_DATA:";

/// Anything that can receive a status line
pub trait StatusChannel {
    fn publish(&mut self, status: &str);
}

impl StatusChannel for Vec<String> {
    fn publish(&mut self, status: &str) {
        self.push(status.to_string());
    }
}

impl<C: StatusChannel + ?Sized> StatusChannel for &mut C {
    fn publish(&mut self, status: &str) {
        (**self).publish(status)
    }
}

/// Writes each status line to stdout
#[derive(Debug, Default)]
pub struct StdoutChannel;

impl StatusChannel for StdoutChannel {
    fn publish(&mut self, status: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", status) {
            warn!("Could not write status: {}", e);
        }
    }
}

/// Builds a `NAVI_DATA:?name?key=value&...` status line. Values which look numeric
/// are written as they are, everything else is encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMessage {
    name: String,
    data: String,
    count: usize,
}

impl QueryMessage {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let data = format!("{}?{}?", STATUS_TAG, name);
        Self {
            name,
            data,
            count: 0,
        }
    }

    pub fn add(mut self, key: &str, value: impl Display) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        if self.count > 0 {
            self.data.push('&');
        }
        self.data.push_str(key);
        self.data.push('=');
        // Numeric-looking values go out verbatim, surrounding whitespace included
        if looks_numeric(&value) {
            self.data.push_str(&value);
        } else {
            self.data.push_str(&encode(&value));
        }
        self.count += 1;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn send(&self, channel: &mut impl StatusChannel) {
        debug!(name = %self.name, params = self.count, "Sending message");
        channel.publish(&self.data);
    }
}

impl Display for QueryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

#[cfg(test)]
#[test]
fn test_send() {
    let mut sent: Vec<String> = vec![];
    QueryMessage::new("foo")
        .add("x", 5)
        .add("y", "a b")
        .send(&mut sent);
    assert_eq!(sent, vec!["NAVI_DATA:?foo?x=5&y=a%20b"]);
}

#[cfg(test)]
#[test]
fn test_empty_message() {
    let msg = QueryMessage::new("ping");
    assert!(msg.is_empty());
    assert_eq!(msg.to_string(), "NAVI_DATA:?ping?");
}

#[cfg(test)]
#[test]
fn test_numeric_values_unescaped() {
    let mut msg = QueryMessage::new("equip");
    msg.push("slot", "3");
    msg.push("weight", 2.5);
    msg.push("padded", " 7 ");
    msg.push("label", "Sword & Shield");
    assert_eq!(msg.len(), 4);
    assert_eq!(msg.name(), "equip");
    assert_eq!(
        msg.as_str(),
        "NAVI_DATA:?equip?slot=3&weight=2.5&padded= 7 &label=Sword%20%26%20Shield"
    );
}

#[cfg(test)]
#[test]
fn test_send_twice() {
    let msg = QueryMessage::new("a").add("k", "v");
    let mut sent: Vec<String> = vec![];
    msg.send(&mut sent);
    msg.send(&mut sent);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}
