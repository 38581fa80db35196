use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, multispace0, multispace1},
    combinator::map,
    multi::many0,
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::DOMElement;

/// A `name: value` pair from an inline `style` attribute
fn declaration(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        delimited(multispace0, is_not(":;"), multispace0),
        char(':'),
        is_not(";"),
    )(input)
}

fn declarations(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    let (rest, decls) = many0(alt((
        map(declaration, Some),
        map(char(';'), |_| None),
        map(multispace1, |_| None),
        // Skip a malformed declaration up to the next `;`
        map(is_not(";"), |_| None),
    )))(input)?;
    Ok((rest, decls.into_iter().flatten().collect()))
}

impl DOMElement {
    /// The inline style declarations of this element, in order
    pub fn inline_style(&self) -> Vec<(String, String)> {
        let style = match self.get_attribute("style") {
            Some(style) => style,
            None => return vec![],
        };
        declarations(style)
            .map(|(_, decls)| {
                decls
                    .into_iter()
                    .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_style(&self, property: &str) -> Option<String> {
        self.inline_style()
            .into_iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
            .map(|(_, v)| v)
    }

    /// Set an inline style property. An empty value removes the property, and the
    /// `style` attribute is dropped once nothing is left in it
    pub fn set_style(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        let mut decls = self.inline_style();
        let existing = decls.iter().position(|(k, _)| *k == property);
        decls.retain(|(k, _)| *k != property);
        if !value.is_empty() {
            let at = existing.unwrap_or(decls.len()).min(decls.len());
            decls.insert(at, (property, value.to_string()));
        }
        if decls.is_empty() {
            self.remove_attribute("style");
        } else {
            let style = decls
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attribute("style", style);
        }
    }

    pub fn hide(&mut self) {
        self.set_style("display", "none");
    }

    /// Drop the inline `display` so the element falls back to its stylesheet display
    pub fn show(&mut self) {
        self.set_style("display", "");
    }

    pub fn is_hidden(&self) -> bool {
        self.get_style("display").as_deref() == Some("none")
    }
}

#[cfg(test)]
#[test]
fn test_inline_style() {
    let mut el = DOMElement::new(
        "ul",
        Some(crate::attributes!("style" => "color: red;  ; margin : 0 ;")),
        vec![],
    );
    assert_eq!(
        el.inline_style(),
        vec![
            ("color".to_string(), "red".to_string()),
            ("margin".to_string(), "0".to_string())
        ]
    );

    el.hide();
    assert!(el.is_hidden());
    assert_eq!(
        el.get_attribute("style").map(String::as_str),
        Some("color: red; margin: 0; display: none")
    );

    el.set_style("COLOR", "blue");
    assert_eq!(el.get_style("color").as_deref(), Some("blue"));
    assert_eq!(
        el.get_attribute("style").map(String::as_str),
        Some("color: blue; margin: 0; display: none")
    );

    el.show();
    assert!(!el.is_hidden());
    assert_eq!(el.get_style("display"), None);

    el.set_style("color", "");
    el.set_style("margin", "");
    assert_eq!(el.get_attribute("style"), None);
}

#[cfg(test)]
#[test]
fn test_malformed_declarations_skipped() {
    let mut el = DOMElement::new(
        "ul",
        Some(crate::attributes!("style" => "color:; margin: 0")),
        vec![],
    );
    assert_eq!(
        el.inline_style(),
        vec![("margin".to_string(), "0".to_string())]
    );
    el.hide();
    assert_eq!(
        el.get_attribute("style").map(String::as_str),
        Some("margin: 0; display: none")
    );

    let el = DOMElement::new(
        "ul",
        Some(crate::attributes!("style" => "bogus; display: none")),
        vec![],
    );
    assert!(el.is_hidden());
}
