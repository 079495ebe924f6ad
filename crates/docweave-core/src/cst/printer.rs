//! Output serializer
//!
//! Flattens a (possibly rewritten) tree back to text. Every token is emitted
//! verbatim in document order, so printing an untouched tree reproduces the
//! parsed source byte for byte.

use rowan::{GreenNode, GreenNodeData, NodeOrToken};

use super::CsSyntaxNode;

/// Accumulates token text into a single buffer
pub struct Printer {
    buffer: String,
}

impl Printer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    /// Append every token of a green subtree in document order
    pub fn write_node(&mut self, node: &GreenNodeData) {
        for child in node.children() {
            match child {
                NodeOrToken::Node(node) => self.write_node(node),
                NodeOrToken::Token(token) => self.buffer.push_str(token.text()),
            }
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Print a syntax tree to text
pub fn print(root: &CsSyntaxNode) -> String {
    print_green(&root.green().into_owned())
}

/// Print a green tree to text
pub fn print_green(green: &GreenNode) -> String {
    let mut printer = Printer::with_capacity(usize::from(green.text_len()));
    printer.write_node(green);
    printer.finish()
}
