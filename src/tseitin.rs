use std::sync::Arc;

use log::{debug, trace};

use crate::expression::Node;
use crate::naming::NamingAuthority;

/// How literal and negation subformulas are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Literals pass through untouched and negations wrap the encoded operand
    /// without a witness of their own. Only flat formulas (a terminal, or one
    /// binary operator over two plain literals) are guaranteed to come out as
    /// clauses; deeper nesting leaves compound subtrees inside disjunctions.
    #[default]
    Shallow,
    /// Every binary operator is named by its own witness and its three clauses
    /// mention terminals only, so the result is always a conjunction of clauses.
    Full,
}

/// Result of a transformation: the encoded tree and the top-level witness.
///
/// The witness is not asserted by the tree. Conjoin it as a unit clause to
/// require the original formula to be true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    pub tree: Node,
    pub witness: Node,
}

pub struct TseitinTransform<'a> {
    authority: &'a NamingAuthority,
    encoding: Encoding,
}

impl Default for TseitinTransform<'static> {
    fn default() -> Self {
        Self::new(NamingAuthority::global())
    }
}

impl<'a> TseitinTransform<'a> {
    pub fn new(authority: &'a NamingAuthority) -> Self {
        Self { authority, encoding: Encoding::default() }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn fresh_witness(&self) -> Arc<Node> {
        Arc::new(Node::Literal(self.authority.fresh()))
    }

    pub fn to_cnf(&self, root: &Node) -> Node {
        self.transform(root).tree
    }

    pub fn transform(&self, root: &Node) -> Cnf {
        debug!("transform(root = {}, encoding = {:?})", root, self.encoding);

        match self.encoding {
            Encoding::Shallow => {
                let witness = self.fresh_witness();
                let tree = self.encode_shallow(root, &witness);
                Cnf { tree, witness: witness.as_ref().clone() }
            }
            Encoding::Full => {
                let mut clauses = vec![];
                let witness = self.encode_full(root, &mut clauses);
                debug!("transform: {} clauses", clauses.len());

                let tree = clauses
                    .into_iter()
                    .rev()
                    .reduce(|rest, clause| Node::conjunction(clause, rest))
                    .unwrap_or_else(|| witness.as_ref().clone());
                Cnf { tree, witness: witness.as_ref().clone() }
            }
        }
    }

    fn encode_shallow(&self, node: &Node, witness: &Arc<Node>) -> Node {
        trace!("encode_shallow(node = {}, witness = {})", node, witness);

        match node {
            Node::Literal(_) => node.clone(),
            Node::Negation(operand) => Node::negation(self.encode_shallow(operand, witness)),
            Node::Conjunction(left, right) => {
                // W <=> L.R   becomes   (L + ~W) . (R + ~W) . (~L + ~R + W)
                let fresh = self.fresh_witness();
                let left = Arc::new(self.encode_shallow(left, &fresh));
                let right = Arc::new(self.encode_shallow(right, &fresh));

                let c1 = Node::disjunction(Arc::clone(&left), Node::negation(Arc::clone(witness)));
                let c2 = Node::disjunction(Arc::clone(&right), Node::negation(Arc::clone(witness)));
                let c3 = Node::disjunction(
                    Node::negation(left),
                    Node::disjunction(Node::negation(right), Arc::clone(witness)),
                );

                Node::conjunction(c1, Node::conjunction(c2, c3))
            }
            Node::Disjunction(left, right) => {
                // W <=> L+R   becomes   (~L + W) . (~R + W) . (L + R + ~W)
                let fresh = self.fresh_witness();
                let left = Arc::new(self.encode_shallow(left, &fresh));
                let right = Arc::new(self.encode_shallow(right, &fresh));

                let c1 = Node::disjunction(Node::negation(Arc::clone(&left)), Arc::clone(witness));
                let c2 = Node::disjunction(Node::negation(Arc::clone(&right)), Arc::clone(witness));
                let c3 = Node::disjunction(
                    left,
                    Node::disjunction(right, Node::negation(Arc::clone(witness))),
                );

                Node::conjunction(c1, Node::conjunction(c2, c3))
            }
        }
    }

    /// Returns the terminal standing for `node` and appends the clauses that
    /// define it.
    fn encode_full(&self, node: &Node, clauses: &mut Vec<Node>) -> Arc<Node> {
        trace!("encode_full(node = {})", node);

        match node {
            Node::Literal(_) => Arc::new(node.clone()),
            Node::Negation(operand) => complement(&self.encode_full(operand, clauses)),
            Node::Conjunction(left, right) => {
                let witness = self.fresh_witness();
                let left = self.encode_full(left, clauses);
                let right = self.encode_full(right, clauses);

                clauses.push(Node::disjunction(Arc::clone(&left), complement(&witness)));
                clauses.push(Node::disjunction(Arc::clone(&right), complement(&witness)));
                clauses.push(Node::disjunction(
                    complement(&left),
                    Node::disjunction(complement(&right), Arc::clone(&witness)),
                ));

                witness
            }
            Node::Disjunction(left, right) => {
                let witness = self.fresh_witness();
                let left = self.encode_full(left, clauses);
                let right = self.encode_full(right, clauses);

                clauses.push(Node::disjunction(complement(&left), Arc::clone(&witness)));
                clauses.push(Node::disjunction(complement(&right), Arc::clone(&witness)));
                clauses.push(Node::disjunction(
                    left,
                    Node::disjunction(right, complement(&witness)),
                ));

                witness
            }
        }
    }
}

/// Negates a terminal, unwrapping an existing negation instead of stacking a second one.
fn complement(terminal: &Arc<Node>) -> Arc<Node> {
    match terminal.as_ref() {
        Node::Negation(operand) => Arc::clone(operand),
        _ => Arc::new(Node::negation(Arc::clone(terminal))),
    }
}

/// Converts `root` with the shallow encoding and the process-wide naming authority.
pub fn to_cnf(root: &Node) -> Node {
    TseitinTransform::default().to_cnf(root)
}
