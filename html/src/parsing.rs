use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, tag_no_case, take_till1, take_until},
    character::complete::{alphanumeric1, char, multispace0, multispace1, none_of},
    combinator::{map, opt, value},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};
use std::collections::{HashMap, HashSet};
use tracing::{span, Level};

use crate::{DOMAttributes, DOMContent, DOMElement};

lazy_static::lazy_static! {
    static ref VOID_ELEMENTS: HashSet<&'static str> = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect();
}

/// Elements which never have contents or a closing tag
pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(name.to_ascii_lowercase().as_str())
}

/// Parse a full document: an optional doctype followed by a single root element
pub fn document(input: &str) -> IResult<&str, DOMElement> {
    let span = span!(Level::DEBUG, "Parsing document", len = input.len());
    let _enter = span.enter();
    let (rest, _) = tuple((skip_misc, opt(doctype), skip_misc))(input)?;
    let (rest, root) = parse_element(rest)?;
    let (rest, _) = skip_misc(rest)?;
    Ok((rest, root))
}

/// Whitespace and comments between nodes
fn skip_misc(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, comment))))(input)
}

fn doctype(input: &str) -> IResult<&str, &str> {
    delimited(tag_no_case("<!doctype"), take_until(">"), char('>'))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn parse_tag_name(input: &str) -> IResult<&str, &str> {
    alphanumeric1(input)
}

/// Parse a tag in the form `<name attr=value ...>` or `<name ... />`. The flag is set
/// for self-closing tags
fn parse_open_tag(input: &str) -> IResult<&str, (DOMElement, bool)> {
    let (rest, (_, name, attrs, _, closing, _)) = tuple((
        char('<'),
        parse_tag_name,
        many0(preceded(multispace1, single_attr_parser)),
        multispace0,
        opt(char('/')),
        char('>'),
    ))(input)?;
    let attributes = DOMAttributes(
        attrs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    );
    Ok((
        rest,
        (DOMElement::new(name, Some(attributes), vec![]), closing.is_some()),
    ))
}

/// Parse a tag in the form `</name>`, returning `name`
fn parse_close_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), parse_tag_name, preceded(multispace0, char('>')))(input)
}

/// Text up to the next tag, trimmed. Whitespace-only runs produce no node
fn parse_text(input: &str) -> IResult<&str, Option<DOMContent>> {
    map(take_till1(|c| c == '<'), |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| DOMContent::Text(s.to_string()))
    })(input)
}

fn parse_contents(input: &str) -> IResult<&str, Vec<DOMContent>> {
    let (rest, nodes) = many0(alt((
        map(comment, |_| None),
        map(parse_element, |el| Some(el.into())),
        parse_text,
    )))(input)?;
    Ok((rest, nodes.into_iter().flatten().collect()))
}

/// Parse a complete element including its contents and closing tag
pub fn parse_element(input: &str) -> IResult<&str, DOMElement> {
    let (rest, (mut element, self_closing)) = parse_open_tag(input)?;
    if self_closing || is_void(&element.name) {
        return Ok((rest, element));
    }
    let (rest, contents) = parse_contents(rest)?;
    let (rest, close) = parse_close_tag(rest)?;
    if !element.is(close) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    element.contents = contents;
    Ok((rest, element))
}

// Attribute parsing below

fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    let esc = escaped(none_of("\\\'"), '\\', tag("'"));
    let esc_or_empty = alt((esc, tag("")));
    delimited(tag("'"), esc_or_empty, tag("'"))(input)
}

fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    let esc = escaped(none_of("\\\""), '\\', tag("\""));
    let esc_or_empty = alt((esc, tag("")));
    delimited(tag("\""), esc_or_empty, tag("\""))(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'=<>`")(input)
}

fn value_parser(input: &str) -> IResult<&str, &str> {
    alt((parse_single_quoted, parse_double_quoted, parse_unquoted))(input)
}

fn name_parser(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'>/=")(input)
}

fn single_attr_parser(input: &str) -> IResult<&str, (&str, &str)> {
    alt((
        separated_pair(
            name_parser,
            delimited(multispace0, char('='), multispace0),
            value_parser,
        ),
        map(name_parser, |name| (name, "")),
    ))(input)
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    let (rest, (el, closing)) = parse_open_tag("<div>").unwrap();
    assert_eq!(rest, "");
    assert!(!closing);
    assert_eq!(el, DOMElement::new("div", None, vec![]));

    let (_, (el, _)) =
        parse_open_tag(r#"<div attr1 attr2=two attr3='three' attr4="number four">"#).unwrap();
    let target = DOMElement::new(
        "div",
        Some(crate::attributes!(
            "attr1" => "",
            "attr2" => "two",
            "attr3" => "three",
            "attr4" => "number four",
        )),
        vec![],
    );
    assert_eq!(el, target);

    let (_, (_, closing)) = parse_open_tag("<br />").unwrap();
    assert!(closing);
}

#[cfg(test)]
#[test]
fn test_parse_malformed() {
    assert!(parse_element("<html></closing><opening></html>").is_err());
    assert!(parse_element("<---></--->").is_err());
    assert!(parse_element("<ul><li>unclosed</ul>").is_err());
}
