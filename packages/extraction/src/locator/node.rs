//! Element access needed by the synthesizer.

use scraper::ElementRef;

/// Read-only view of a document element with a parent link.
///
/// Implemented for [`scraper::ElementRef`]; click-capture collaborators that
/// hold their own DOM can implement it for their element handle.
pub trait DomNode: Clone {
    /// Lowercase tag name.
    fn tag_name(&self) -> String;

    /// Non-empty `id` attribute.
    fn id(&self) -> Option<String>;

    /// Class names in attribute order.
    fn class_names(&self) -> Vec<String>;

    /// Parent element, `None` at the document root element.
    fn parent_element(&self) -> Option<Self>;

    /// 1-based position among element siblings with the same tag name.
    fn same_tag_position(&self) -> usize;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self) -> String;
}

impl<'a> DomNode for ElementRef<'a> {
    fn tag_name(&self) -> String {
        self.value().name().to_ascii_lowercase()
    }

    fn id(&self) -> Option<String> {
        self.value()
            .attr("id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn class_names(&self) -> Vec<String> {
        self.value()
            .attr("class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn same_tag_position(&self) -> usize {
        let name = self.value().name();
        1 + self
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|sibling| sibling.value().name() == name)
            .count()
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}
