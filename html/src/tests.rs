use super::*;

#[test]
fn test_document() {
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let target = DOMElement::new(
        "html",
        Some(attributes!("lang" => "en")),
        vec![
            DOMElement::new(
                "head",
                None,
                vec![
                    DOMElement::new("meta", Some(attributes!("charset" => "utf-8")), vec![]).into(),
                    DOMElement::new(
                        "title",
                        None,
                        vec!["The minimal, valid HTML5 document".into()],
                    )
                    .into(),
                ],
            )
            .into(),
            DOMElement::new(
                "body",
                None,
                vec![
                    DOMElement::new("p", None, vec!["Some paragraph".into()]).into(),
                    "Some untagged text".into(),
                ],
            )
            .into(),
        ],
    );
    assert_eq!(document(i), Ok(("", target)));
}

fn menu() -> DOMElement {
    document(
        r##"<ul id="dropdownMenu">
    <li><a href="#">Menu 1</a>
        <ul>
            <li><a href="#">SubMenu 1</a></li>
            <li><a href="#">SubMenu 2</a></li>
        </ul>
    </li>
    <li><a href="#">Menu 2</a></li>
</ul>"##,
    )
    .unwrap()
    .1
}

#[test]
fn test_lookup() {
    let root = menu();
    assert_eq!(root.children().count(), 2);
    assert_eq!(root.get_elements_by_name("li", false).len(), 2);
    assert_eq!(root.get_elements_by_name("li", true).len(), 4);
    assert_eq!(root.get_elements_by_name("LI", true).len(), 4);
    assert!(root.get_element_by_id("dropdownMenu").is_some());
    assert!(root.get_element_by_id("missing").is_none());

    let sub = root.element_at(&[0, 1, 1]).unwrap();
    assert!(sub.is("li"));
    assert_eq!(sub.text_content(), "SubMenu 2");
    assert!(root.element_at(&[0, 2]).is_none());
    assert_eq!(root.element_at(&[]), Some(&root));
}

#[test]
fn test_display() {
    let el = DOMElement::new(
        "li",
        Some(attributes!("class" => "item", "style" => "display: none")),
        vec![
            "Label".into(),
            DOMElement::new("br", None, vec![]).into(),
        ],
    );
    assert_eq!(
        el.to_string(),
        r#"<li class="item" style="display: none">Label<br></li>"#
    );
    let (_, reparsed) = document(&el.to_string()).unwrap();
    assert_eq!(reparsed, el);
}

#[test]
fn test_fire_listeners() {
    let mut root = menu();
    let item = root.element_at_mut(&[0]).unwrap();
    let sub_idx = item
        .contents
        .iter()
        .position(|c| matches!(c, DOMContent::Element(e) if e.is("ul")))
        .unwrap();
    item.add_event(EventType::PointerEnter, Action::Show(sub_idx));
    item.add_event(EventType::PointerLeave, Action::Hide(sub_idx));

    assert!(dispatch(&mut root, &[0], EventType::PointerLeave));
    assert!(root.element_at(&[0, 1]).unwrap().is_hidden());
    assert!(dispatch(&mut root, &[0], EventType::PointerEnter));
    assert!(!root.element_at(&[0, 1]).unwrap().is_hidden());
    assert!(!dispatch(&mut root, &[5], EventType::PointerEnter));
    // No listeners on the second item
    assert_eq!(
        root.element_at_mut(&[1]).unwrap().fire(EventType::PointerEnter),
        0
    );
}

#[test]
fn test_pointer_enter_leave_order() {
    let mut root = menu();
    let item = root.element_at_mut(&[0]).unwrap();
    item.add_event(EventType::PointerEnter, Action::Show(1));
    item.add_event(EventType::PointerLeave, Action::Hide(1));
    root.element_at_mut(&[0, 1]).unwrap().hide();

    let mut pointer = Pointer::new();
    assert!(pointer.move_to(&mut root, Some(&[0])));
    assert!(!root.element_at(&[0, 1]).unwrap().is_hidden());

    // Moving into a descendant does not leave the item
    assert!(pointer.move_to(&mut root, Some(&[0, 1, 0])));
    assert_eq!(pointer.hovered(), Some(&[0usize, 1, 0][..]));
    assert!(!root.element_at(&[0, 1]).unwrap().is_hidden());

    // Unknown paths are ignored
    assert!(!pointer.move_to(&mut root, Some(&[9])));
    assert_eq!(pointer.hovered(), Some(&[0usize, 1, 0][..]));

    assert!(pointer.move_to(&mut root, Some(&[1])));
    assert!(root.element_at(&[0, 1]).unwrap().is_hidden());

    assert!(pointer.move_to(&mut root, Some(&[0])));
    assert!(!root.element_at(&[0, 1]).unwrap().is_hidden());
    assert!(pointer.move_to(&mut root, None));
    assert_eq!(pointer.hovered(), None);
    assert!(root.element_at(&[0, 1]).unwrap().is_hidden());
}
