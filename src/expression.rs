use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Write};
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::naming::{NamingAuthority, RESERVED_PREFIX};
use crate::truth_table::{BuildTruthTable, TruthTable};

/// A named Boolean variable.
///
/// Names coming from user code are validated by [`Literal::new`]; names
/// starting with `_` are reserved for witnesses produced by a
/// [`NamingAuthority`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    name: Arc<str>,
}

impl Literal {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidName { name, reason: "name is empty" });
        }
        if name.starts_with(RESERVED_PREFIX) {
            return Err(Error::InvalidName {
                name,
                reason: "names starting with `_` are reserved for generated literals",
            });
        }

        Ok(Self { name: name.into() })
    }

    /// Fresh reserved-name literal from the process-wide authority.
    pub fn new_internal() -> Self {
        NamingAuthority::global().fresh()
    }

    pub(crate) fn internal(name: String) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_internal(&self) -> bool {
        self.name.starts_with(RESERVED_PREFIX)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Immutable formula tree. Children are shared, so cloning a node or reusing
/// a subtree in several parents never copies the subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Literal(Literal),
    Negation(Arc<Node>),
    Conjunction(Arc<Node>, Arc<Node>),
    Disjunction(Arc<Node>, Arc<Node>),
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal(literal)
    }
}

impl Node {
    pub fn literal(name: impl Into<String>) -> Result<Self> {
        Literal::new(name).map(Node::Literal)
    }

    pub fn negation(operand: impl Into<Arc<Node>>) -> Self {
        Node::Negation(operand.into())
    }

    pub fn conjunction(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Self {
        Node::Conjunction(left.into(), right.into())
    }

    pub fn disjunction(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Self {
        Node::Disjunction(left.into(), right.into())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    pub fn is_conjunction(&self) -> bool {
        matches!(self, Node::Conjunction(_, _))
    }

    fn is_binary(&self) -> bool {
        matches!(self, Node::Conjunction(_, _) | Node::Disjunction(_, _))
    }

    /// A literal or a negated literal: the only nodes allowed inside a clause.
    pub fn is_terminal(&self) -> bool {
        self.signed_literal().is_some()
    }

    /// The literal of a terminal node together with its polarity.
    pub fn signed_literal(&self) -> Option<(&Literal, bool)> {
        match self {
            Node::Literal(literal) => Some((literal, true)),
            Node::Negation(operand) => match operand.as_ref() {
                Node::Literal(literal) => Some((literal, false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// A disjunction-tree whose leaves are all terminals.
    pub fn is_clause(&self) -> bool {
        match self {
            Node::Disjunction(left, right) => left.is_clause() && right.is_clause(),
            node => node.is_terminal(),
        }
    }

    /// Whether the tree reads as nested conjunctions of clauses.
    pub fn is_cnf(&self) -> bool {
        match self {
            Node::Conjunction(left, right) => left.is_cnf() && right.is_cnf(),
            node => node.is_clause(),
        }
    }

    pub fn extract_leafs(&self) -> Vec<&Literal> {
        let mut result = vec![];
        self.extract_leafs_internal(&mut result);
        result
    }

    fn extract_leafs_internal<'a>(&'a self, result: &mut Vec<&'a Literal>) {
        match self {
            Node::Literal(literal) => result.push(literal),
            Node::Negation(operand) => operand.extract_leafs_internal(result),
            Node::Conjunction(left, right) | Node::Disjunction(left, right) => {
                left.extract_leafs_internal(result);
                right.extract_leafs_internal(result);
            }
        }
    }

    pub fn evaluate<F: Fn(&Literal) -> bool>(&self, assignment: &F) -> bool {
        match self {
            Node::Literal(literal) => assignment(literal),
            Node::Negation(operand) => !operand.evaluate(assignment),
            Node::Conjunction(left, right) => left.evaluate(assignment) && right.evaluate(assignment),
            Node::Disjunction(left, right) => left.evaluate(assignment) || right.evaluate(assignment),
        }
    }

    /// Indented multi-line rendering, one node per line.
    pub fn render_tree(&self) -> String {
        let mut output = String::new();
        self.render_tree_internal(&mut output, 0);
        output
    }

    fn render_tree_internal(&self, output: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Node::Literal(literal) => {
                let _ = writeln!(output, "{indent}{literal}");
            }
            Node::Negation(operand) => {
                let _ = writeln!(output, "{indent}NOT");
                operand.render_tree_internal(output, depth + 1);
            }
            Node::Conjunction(left, right) => {
                let _ = writeln!(output, "{indent}AND");
                left.render_tree_internal(output, depth + 1);
                right.render_tree_internal(output, depth + 1);
            }
            Node::Disjunction(left, right) => {
                let _ = writeln!(output, "{indent}OR");
                left.render_tree_internal(output, depth + 1);
                right.render_tree_internal(output, depth + 1);
            }
        }
    }

    fn evaluate_with(&self, index_map: &BTreeMap<&Literal, usize>, arrangement: u128) -> bool {
        self.evaluate(&|literal: &Literal| {
            index_map
                .get(literal)
                .is_some_and(|&index| arrangement & (1 << index) != 0)
        })
    }
}

impl BitAnd for Node {
    type Output = Node;

    fn bitand(self, rhs: Self) -> Self::Output {
        Node::conjunction(self, rhs)
    }
}

impl BitOr for Node {
    type Output = Node;

    fn bitor(self, rhs: Self) -> Self::Output {
        Node::disjunction(self, rhs)
    }
}

impl Not for Node {
    type Output = Node;

    fn not(self) -> Self::Output {
        Node::negation(self)
    }
}

fn write_operand(f: &mut Formatter<'_>, operand: &Node) -> std::fmt::Result {
    if operand.is_binary() {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Literal(literal) => write!(f, "{literal}"),
            Node::Negation(operand) => {
                write!(f, "~")?;
                write_operand(f, operand)
            }
            Node::Conjunction(left, right) => {
                write_operand(f, left)?;
                write!(f, " . ")?;
                write_operand(f, right)
            }
            Node::Disjunction(left, right) => {
                write_operand(f, left)?;
                write!(f, " + ")?;
                write_operand(f, right)
            }
        }
    }
}

impl<'a> BuildTruthTable<'a, Literal> for Node {
    fn build_truth_table(&'a self) -> TruthTable<'a, Literal> {
        let mut tt = TruthTable::from(self.extract_leafs());

        for arrangement in 0..(1u128 << tt.num_vars()) {
            let evaluate_result = self.evaluate_with(&tt.var_to_index_map, arrangement);
            tt.add_row(arrangement, evaluate_result);
        }

        tt
    }
}

#[allow(unused_macros)]
pub mod macros {
    #[macro_export]
    macro_rules! e_not {
        ($node:expr) => {
            $crate::expression::Node::negation($node)
        };
    }

    #[macro_export]
    macro_rules! e_or {
        ($left:expr, $right:expr) => {
            $crate::expression::Node::disjunction($left, $right)
        };
    }

    #[macro_export]
    macro_rules! e_and {
        ($left:expr, $right:expr) => {
            $crate::expression::Node::conjunction($left, $right)
        };
    }
}
