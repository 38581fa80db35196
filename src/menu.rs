use html::{Action, DOMContent, DOMElement, EventType};
use tracing::{debug, span, Level};

/// Hover behaviour for a nested list menu:
///
/// ```html
/// <ul id="dropdownMenu">
///     <li>
///         <a href="#">Menu 1</a>
///         <ul>
///             <li><a href="#">SubMenu 1</a></li>
///             <li><a href="#">SubMenu 2</a></li>
///         </ul>
///     </li>
///     <li><a href="#">Menu 2</a></li>
/// </ul>
/// ```
///
/// Each `li` owning a nested `ul` shows it while the pointer is over the item and
/// hides it again when the pointer leaves. The widget keeps no state of its own:
/// visibility lives in the submenu's inline style and the handlers live on the item.
pub struct DropdownMenu;

impl DropdownMenu {
    /// Instrument `list` and every list nested below it, returning the number of
    /// submenus found. Items with more than one nested list are left alone
    pub fn attach(list: &mut DOMElement) -> usize {
        let span = span!(Level::DEBUG, "Attaching dropdown menu", list = %list.name);
        let _enter = span.enter();
        let mut count = 0;
        for item in list.children_mut().filter(|el| el.is("li")) {
            let nested: Vec<usize> = item
                .contents
                .iter()
                .enumerate()
                .filter(|(_, c)| matches!(c, DOMContent::Element(el) if el.is("ul")))
                .map(|(idx, _)| idx)
                .collect();
            let idx = match nested.as_slice() {
                [idx] => *idx,
                [] => continue,
                _ => {
                    debug!(lists = nested.len(), "Skipping item with several submenus");
                    continue;
                }
            };
            item.add_event(EventType::PointerEnter, Action::Show(idx));
            item.add_event(EventType::PointerLeave, Action::Hide(idx));
            if let Some(DOMContent::Element(submenu)) = item.contents.get_mut(idx) {
                submenu.hide();
                count += 1 + Self::attach(submenu);
            }
        }
        debug!(count, "Attached");
        count
    }
}

#[cfg(test)]
use html::{dispatch, document, Pointer};

#[cfg(test)]
const THREE_LEVELS: &str = r##"<ul id="dropdownMenu">
<li><a href="#">File</a>
    <ul>
        <li><a href="#">Open</a></li>
        <li><a href="#">Recent</a>
            <ul>
                <li><a href="#">save1.dat</a></li>
                <li><a href="#">save2.dat</a></li>
            </ul>
        </li>
    </ul>
</li>
<li><a href="#">Help</a></li>
</ul>"##;

#[cfg(test)]
const OUTER: &[usize] = &[0];
#[cfg(test)]
const OUTER_SUB: &[usize] = &[0, 1];
#[cfg(test)]
const INNER: &[usize] = &[0, 1, 1];
#[cfg(test)]
const INNER_SUB: &[usize] = &[0, 1, 1, 1];

#[cfg(test)]
fn visible(root: &DOMElement, path: &[usize]) -> bool {
    !root.element_at(path).unwrap().is_hidden()
}

#[cfg(test)]
fn menu() -> DOMElement {
    let (_, mut root) = document(THREE_LEVELS).unwrap();
    assert_eq!(DropdownMenu::attach(&mut root), 2);
    root
}

#[cfg(test)]
#[test]
fn test_submenus_start_hidden() {
    let root = menu();
    assert!(!visible(&root, OUTER_SUB));
    assert!(!visible(&root, INNER_SUB));
    assert!(visible(&root, &[]));
    assert!(root.element_at(&[1]).unwrap().listeners.is_empty());
}

#[cfg(test)]
#[test]
fn test_nested_levels_toggle_independently() {
    let mut root = menu();

    dispatch(&mut root, OUTER, EventType::PointerEnter);
    assert!(visible(&root, OUTER_SUB));
    assert!(!visible(&root, INNER_SUB));

    dispatch(&mut root, INNER, EventType::PointerEnter);
    assert!(visible(&root, OUTER_SUB));
    assert!(visible(&root, INNER_SUB));

    dispatch(&mut root, INNER, EventType::PointerLeave);
    assert!(visible(&root, OUTER_SUB));
    assert!(!visible(&root, INNER_SUB));

    dispatch(&mut root, INNER, EventType::PointerEnter);
    dispatch(&mut root, OUTER, EventType::PointerLeave);
    assert!(!visible(&root, OUTER_SUB));
    assert!(visible(&root, INNER_SUB));
}

#[cfg(test)]
#[test]
fn test_pointer_moves() {
    let mut root = menu();
    let mut pointer = Pointer::new();

    pointer.move_to(&mut root, Some(&[0, 1, 1, 1, 0]));
    assert!(visible(&root, OUTER_SUB));
    assert!(visible(&root, INNER_SUB));

    pointer.move_to(&mut root, Some(&[0, 1, 0]));
    assert!(visible(&root, OUTER_SUB));
    assert!(!visible(&root, INNER_SUB));

    pointer.move_to(&mut root, Some(&[1]));
    assert!(!visible(&root, OUTER_SUB));
    assert!(!visible(&root, INNER_SUB));
}

#[cfg(test)]
#[test]
fn test_other_styles_kept() {
    let (_, mut root) =
        document(r#"<ul><li>Item<ul style="color: red"><li>Sub</li></ul></li></ul>"#).unwrap();
    DropdownMenu::attach(&mut root);
    let sub = root.element_at(&[0, 0]).unwrap();
    assert_eq!(
        sub.get_attribute("style").map(String::as_str),
        Some("color: red; display: none")
    );
    dispatch(&mut root, &[0], EventType::PointerEnter);
    let sub = root.element_at(&[0, 0]).unwrap();
    assert_eq!(sub.get_attribute("style").map(String::as_str), Some("color: red"));
}

#[cfg(test)]
#[test]
fn test_malformed_structures_untouched() {
    let src = r#"<ul>
<li>Two lists<ul><li>a</li></ul><ul><li>b</li></ul></li>
<div>Not an item<ul><li>c</li></ul></div>
<LI>Upper<UL><li>d</li></UL></LI>
</ul>"#;
    let (_, mut root) = document(src).unwrap();
    assert_eq!(DropdownMenu::attach(&mut root), 1);
    assert!(root.element_at(&[0]).unwrap().listeners.is_empty());
    assert!(visible(&root, &[0, 0]));
    assert!(visible(&root, &[0, 1]));
    assert!(visible(&root, &[1, 0]));
    assert!(!visible(&root, &[2, 0]));
}

#[cfg(test)]
#[test]
fn test_no_items() {
    let mut root = DOMElement::new("ul", None, vec!["empty".into()]);
    assert_eq!(DropdownMenu::attach(&mut root), 0);
    assert_eq!(root, DOMElement::new("ul", None, vec!["empty".into()]));
}
