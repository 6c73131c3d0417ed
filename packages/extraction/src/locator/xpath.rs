//! XPath evaluation over a fetched page, backed by libxml2's HTML parser.
//!
//! libxml types are reference counted and not `Send`; an [`XPathDocument`]
//! lives only inside the synchronous document-reading step.

use libxml::parser::Parser;
use libxml::tree::Document;
use libxml::xpath::Context;

use crate::error::{LocatorError, LocatorResult};

/// A page parsed for XPath queries.
pub struct XPathDocument {
    // The context points into the document; keep the document alive with it.
    _document: Document,
    context: Context,
}

impl XPathDocument {
    pub fn parse(html: &str) -> LocatorResult<Self> {
        let document = Parser::default_html()
            .parse_string(html)
            .map_err(|e| LocatorError::XPathDocument {
                reason: format!("{e:?}"),
            })?;
        let context = Context::new(&document).map_err(|_| LocatorError::XPathDocument {
            reason: "XPath context initialisation failed".to_string(),
        })?;

        Ok(Self {
            _document: document,
            context,
        })
    }

    /// Text content of every node the expression selects, in document order.
    ///
    /// Expressions that evaluate to a number, string or boolean select no
    /// nodes and yield an empty list.
    pub fn select_text(&self, expression: &str) -> LocatorResult<Vec<String>> {
        let object = self
            .context
            .evaluate(expression)
            .map_err(|_| LocatorError::UnsupportedXPath {
                expression: expression.to_string(),
                reason: "rejected by the XPath evaluator".to_string(),
            })?;

        Ok(object
            .get_nodes_as_vec()
            .iter()
            .map(|node| node.get_content())
            .collect())
    }
}
