//! CSS path and XPath synthesis from a clicked element.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::node::DomNode;
use crate::types::locator::{make_label, Locator};

/// Class names that only reflect transient interaction state.
const TRANSIENT_CLASS_MARKERS: [&str; 2] = ["hover", "active"];

/// Both locators for one clicked element, plus its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedLocators {
    pub css_path: String,
    pub xpath: String,
    pub label: String,
}

impl SynthesizedLocators {
    pub fn css_locator(&self) -> Locator {
        Locator::css(self.css_path.clone()).with_label(self.label.clone())
    }

    pub fn xpath_locator(&self) -> Locator {
        Locator::xpath(self.xpath.clone()).with_label(self.label.clone())
    }
}

/// Build both locators and the label for `element`.
pub fn synthesize<N: DomNode>(element: &N) -> SynthesizedLocators {
    SynthesizedLocators {
        css_path: css_path(element),
        xpath: xpath(element),
        label: make_label(&element.text_content()),
    }
}

fn stable_classes(classes: Vec<String>) -> Vec<String> {
    classes
        .into_iter()
        .filter(|class| !TRANSIENT_CLASS_MARKERS.iter().any(|m| class.contains(m)))
        .collect()
}

/// CSS path from the nearest id-bearing ancestor (or the root) down to `element`.
///
/// Per level: `#id` ends the walk, otherwise `.class1.class2`, otherwise
/// `tag:nth-child(k)` with `k` counted among same-tag siblings, matching the
/// XPath index. The root element contributes its bare tag.
pub fn css_path<N: DomNode>(element: &N) -> String {
    let mut segments = VecDeque::new();
    let mut current = Some(element.clone());

    while let Some(node) = current {
        if let Some(id) = node.id() {
            segments.push_front(format!("#{id}"));
            break;
        }

        let parent = node.parent_element();
        let classes = stable_classes(node.class_names());

        let segment = if !classes.is_empty() {
            format!(".{}", classes.join("."))
        } else if parent.is_none() {
            node.tag_name()
        } else {
            format!("{}:nth-child({})", node.tag_name(), node.same_tag_position())
        };
        segments.push_front(segment);

        current = parent;
    }

    Vec::from(segments).join(" > ")
}

/// Absolute XPath to `element`, anchored at the nearest id-bearing ancestor.
///
/// Without any id on the way up this is `/html/body/...` with `[k]` added
/// where the element is not the first of its name among its siblings.
pub fn xpath<N: DomNode>(element: &N) -> String {
    let mut segments = VecDeque::new();
    let mut anchor = None;
    let mut current = Some(element.clone());

    while let Some(node) = current {
        if let Some(id) = node.id() {
            anchor = Some(format!("//*[@id='{id}']"));
            break;
        }

        let tag = node.tag_name();
        let position = node.same_tag_position();
        segments.push_front(if position > 1 {
            format!("{tag}[{position}]")
        } else {
            tag
        });

        current = node.parent_element();
    }

    let mut path = anchor.unwrap_or_default();
    for segment in segments {
        path.push('/');
        path.push_str(&segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{ElementRef, Html, Selector};

    fn pick<'a>(html: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        html.select(&selector).next().expect("fixture element")
    }

    #[test]
    fn test_id_halts_both_walks() {
        let html = Html::parse_document(
            r#"<html><body><div class="wrap"><span id="X">Price</span></div></body></html>"#,
        );
        let locators = synthesize(&pick(&html, "span"));

        assert_eq!(locators.css_path, "#X");
        assert_eq!(locators.xpath, "//*[@id='X']");
        assert_eq!(locators.label, "Price");
    }

    #[test]
    fn test_third_sibling_li() {
        let html = Html::parse_document(
            "<html><body><ul><li>one</li><li>two</li><li>three</li></ul></body></html>",
        );
        let locators = synthesize(&pick(&html, "li:nth-child(3)"));

        assert!(locators.css_path.ends_with(" > li:nth-child(3)"), "{}", locators.css_path);
        assert!(locators.xpath.ends_with("/li[3]"), "{}", locators.xpath);
        assert_eq!(locators.xpath, "/html/body/ul/li[3]");
        assert_eq!(
            locators.css_path,
            "html > body:nth-child(1) > ul:nth-child(1) > li:nth-child(3)"
        );
    }

    #[test]
    fn test_position_counts_same_tag_siblings() {
        let html = Html::parse_document(
            r#"<html><body><div id="d"><span></span><p>a</p><p>b</p></div></body></html>"#,
        );
        let last = pick(&html, "p:last-child");

        assert_eq!(css_path(&last), "#d > p:nth-child(2)");
        assert_eq!(xpath(&last), "//*[@id='d']/p[2]");
    }

    #[test]
    fn test_root_element() {
        let html = Html::parse_document("<html><body></body></html>");
        let root = html.root_element();

        assert_eq!(css_path(&root), "html");
        assert_eq!(xpath(&root), "/html");
    }

    #[test]
    fn test_classes_filtered_and_walk_continues() {
        let html = Html::parse_document(
            r#"<html><body><div id="main"><a class="btn hover-state is-active primary">Go</a></div></body></html>"#,
        );
        let link = pick(&html, "a");

        assert_eq!(css_path(&link), "#main > .btn.primary");
        assert_eq!(xpath(&link), "//*[@id='main']/a");
    }

    #[test]
    fn test_only_transient_classes_fall_back_to_position() {
        let html = Html::parse_document(
            r#"<html><body><div id="nav"><a>Home</a><a class="active">About</a></div></body></html>"#,
        );
        let link = pick(&html, "a.active");

        assert_eq!(css_path(&link), "#nav > a:nth-child(2)");
        assert_eq!(xpath(&link), "//*[@id='nav']/a[2]");
    }

    #[test]
    fn test_label_placeholder_for_empty_text() {
        let html = Html::parse_document(r#"<html><body><img id="logo"></body></html>"#);
        assert_eq!(synthesize(&pick(&html, "img")).label, "Selected element");
    }

    #[test]
    fn test_deterministic() {
        let html = Html::parse_document(
            "<html><body><section><p>a</p><p>b</p></section></body></html>",
        );
        let p = pick(&html, "p:nth-child(2)");
        assert_eq!(synthesize(&p), synthesize(&p));
    }

    #[test]
    fn test_locators_carry_label() {
        let html = Html::parse_document(r#"<html><body><h1 id="t">Title</h1></body></html>"#);
        let locators = synthesize(&pick(&html, "h1"));

        let css = locators.css_locator();
        assert_eq!(css.value, "#t");
        assert_eq!(css.label, "Title");
        assert_eq!(locators.xpath_locator().value, "//*[@id='t']");
    }
}
