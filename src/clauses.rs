use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::expression::{Literal, Node};
use crate::truth_table::{BuildTruthTable, TruthTable};

/// A disjunction of terminals (literals or negated literals), in the order
/// they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause(Vec<Node>);

impl Clause {
    pub fn new<I: IntoIterator<Item=Node>>(terminals: I) -> Result<Self> {
        let terminals = terminals.into_iter().collect::<Vec<_>>();
        if let Some(node) = terminals.iter().find(|node| !node.is_terminal()) {
            return Err(invalid_shape(node));
        }
        Ok(Self(terminals))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn literals(&self) -> &[Node] {
        &self.0
    }

    /// `(name, polarity)` pairs, `false` meaning the literal appears negated.
    pub fn signed_names(&self) -> impl Iterator<Item=(&str, bool)> + '_ {
        self.0
            .iter()
            .filter_map(Node::signed_literal)
            .map(|(literal, polarity)| (literal.name(), polarity))
    }

    pub fn evaluate<F: Fn(&Literal) -> bool>(&self, assignment: &F) -> bool {
        self.0.iter().any(|terminal| terminal.evaluate(assignment))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self.0.iter().map(|terminal| terminal.to_string()).collect::<Vec<_>>();
        write!(f, "{}", parts.join(" + "))
    }
}

/// Conjunction of clauses; the artifact handed to a solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseList(Vec<Clause>);

impl ClauseList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.0.iter()
    }

    pub fn push(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Appends a single-terminal clause, e.g. to assert a top-level witness.
    pub fn assert_unit(&mut self, terminal: Node) -> Result<()> {
        let clause = Clause::new([terminal])?;
        self.0.push(clause);
        Ok(())
    }

    /// Distinct variables in order of first appearance.
    pub fn variables(&self) -> Vec<&Literal> {
        let mut seen = BTreeSet::new();
        self.0
            .iter()
            .flat_map(|clause| clause.literals())
            .filter_map(|terminal| terminal.signed_literal().map(|(literal, _)| literal))
            .filter(|literal| seen.insert(*literal))
            .collect()
    }

    pub fn evaluate<F: Fn(&Literal) -> bool>(&self, assignment: &F) -> bool {
        self.0.iter().all(|clause| clause.evaluate(assignment))
    }
}

impl IntoIterator for ClauseList {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClauseList {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for ClauseList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self.0.iter().map(|clause| format!("({clause})")).collect::<Vec<_>>();
        write!(f, "{}", parts.join(" . "))
    }
}

impl<'a> BuildTruthTable<'a, Literal> for ClauseList {
    fn build_truth_table(&'a self) -> TruthTable<'a, Literal> {
        let mut tt = TruthTable::from(self.variables());

        for arrangement in 0..(1u128 << tt.num_vars()) {
            let index_map = &tt.var_to_index_map;
            let evaluate_result = self.evaluate(&|literal: &Literal| {
                index_map
                    .get(literal)
                    .is_some_and(|&index| arrangement & (1 << index) != 0)
            });
            tt.add_row(arrangement, evaluate_result);
        }

        tt
    }
}

fn invalid_shape(node: &Node) -> Error {
    Error::InvalidCnfShape { node: node.to_string() }
}

#[derive(Default)]
struct ClauseExtractor {
    clauses: ClauseList,
    current: Vec<Node>,
}

impl ClauseExtractor {
    fn close(&mut self) {
        let clause = Clause(std::mem::take(&mut self.current));
        trace!("close clause ({})", clause);
        self.clauses.push(clause);
    }

    fn visit(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Conjunction(left, right) => {
                for child in [left, right] {
                    self.visit(child)?;
                    if !child.is_conjunction() {
                        self.close();
                    }
                }
                Ok(())
            }
            Node::Disjunction(left, right) => {
                for child in [left, right] {
                    if child.is_conjunction() {
                        return Err(invalid_shape(child));
                    }
                    self.visit(child)?;
                }
                Ok(())
            }
            Node::Literal(_) => {
                self.current.push(node.clone());
                Ok(())
            }
            Node::Negation(operand) => {
                if !operand.is_leaf() {
                    return Err(invalid_shape(node));
                }
                self.current.push(node.clone());
                Ok(())
            }
        }
    }
}

/// Flattens a conjunction-of-clauses tree into a [`ClauseList`].
///
/// Nested conjunctions on either side of a conjunction continue the list;
/// every other child of a conjunction forms exactly one clause. A root that is
/// not a conjunction is taken as the sole clause. Conjunctions below a
/// disjunction and negations of anything but a literal are rejected with
/// [`Error::InvalidCnfShape`].
///
/// Recursion depth follows the nesting depth of `tree`.
pub fn extract(tree: &Node) -> Result<ClauseList> {
    debug!("extract(tree = {})", tree);

    let mut extractor = ClauseExtractor::default();
    extractor.visit(tree)?;
    if !tree.is_conjunction() {
        extractor.close();
    }

    debug!("extract: {} clauses", extractor.clauses.len());
    Ok(extractor.clauses)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{e_and, e_not, e_or};

    fn lit(name: &str) -> Node {
        Node::literal(name).unwrap()
    }

    fn names(clauses: &ClauseList) -> Vec<Vec<(&str, bool)>> {
        clauses.iter().map(|clause| clause.signed_names().collect()).collect()
    }

    #[test]
    fn test_single_literal() {
        let clauses = extract(&lit("a")).unwrap();

        assert_eq!(names(&clauses), [vec![("a", true)]]);
    }

    #[test]
    fn test_single_clause() {
        let clauses = extract(&e_or!(lit("a"), e_or!(e_not!(lit("b")), lit("c")))).unwrap();

        assert_eq!(names(&clauses), [vec![("a", true), ("b", false), ("c", true)]]);
    }

    #[test]
    fn test_conjunction_chain() {
        let tree = e_and!(
            e_or!(lit("a"), lit("b")),
            e_and!(e_not!(lit("c")), e_or!(lit("d"), e_not!(lit("a"))))
        );
        let clauses = extract(&tree).unwrap();

        assert_eq!(
            names(&clauses),
            [
                vec![("a", true), ("b", true)],
                vec![("c", false)],
                vec![("d", true), ("a", false)],
            ]
        );
        assert_eq!(format!("{clauses}"), "(a + b) . (~c) . (d + ~a)");
    }

    #[test]
    fn test_left_nested_conjunction() {
        let tree = e_and!(e_and!(lit("a"), lit("b")), e_or!(lit("c"), lit("d")));
        let clauses = extract(&tree).unwrap();

        assert_eq!(
            names(&clauses),
            [vec![("a", true)], vec![("b", true)], vec![("c", true), ("d", true)]]
        );
    }

    #[test]
    fn test_conjunction_under_disjunction() {
        let tree = e_or!(e_and!(lit("a"), lit("b")), lit("c"));

        assert!(matches!(extract(&tree), Err(Error::InvalidCnfShape { .. })));
    }

    #[test]
    fn test_negated_compound() {
        let tree = e_and!(e_not!(e_or!(lit("a"), lit("b"))), lit("c"));
        assert!(matches!(extract(&tree), Err(Error::InvalidCnfShape { .. })));

        let tree = e_or!(e_not!(e_not!(lit("a"))), lit("b"));
        assert_eq!(
            extract(&tree),
            Err(Error::InvalidCnfShape { node: "~~a".to_owned() })
        );
    }

    #[test]
    fn test_variables() {
        let tree = e_and!(
            e_or!(lit("b"), e_not!(lit("a"))),
            e_or!(lit("a"), lit("c"))
        );
        let clauses = extract(&tree).unwrap();

        let variables = clauses.variables().into_iter().map(Literal::name).collect::<Vec<_>>();
        assert_eq!(variables, ["b", "a", "c"]);
    }

    #[test]
    fn test_assert_unit() {
        let mut clauses = extract(&e_or!(lit("a"), lit("b"))).unwrap();

        clauses.assert_unit(e_not!(lit("a"))).unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(format!("{clauses}"), "(a + b) . (~a)");

        assert!(matches!(
            clauses.assert_unit(e_or!(lit("a"), lit("b"))),
            Err(Error::InvalidCnfShape { .. })
        ));
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn test_clause_new() {
        assert_eq!(Clause::new([lit("a"), e_not!(lit("b"))]).unwrap().len(), 2);
        assert!(Clause::new([]).unwrap().is_empty());
        assert!(matches!(
            Clause::new([lit("a"), e_and!(lit("b"), lit("c"))]),
            Err(Error::InvalidCnfShape { .. })
        ));
    }

    #[test]
    fn test_evaluate() {
        let clauses = extract(&e_and!(e_or!(lit("a"), lit("b")), e_not!(lit("a")))).unwrap();

        assert!(clauses.evaluate(&|literal: &Literal| literal.name() == "b"));
        assert!(!clauses.evaluate(&|literal: &Literal| literal.name() == "a"));
        assert!(!clauses.evaluate(&|_: &Literal| false));
    }

    #[test]
    fn test_truth_table() {
        let clauses = extract(&e_and!(e_or!(lit("a"), lit("b")), e_not!(lit("a")))).unwrap();
        let tt = clauses.build_truth_table();

        assert!(tt.is_satisfiable());
        assert_eq!(
            tt.to_matrix(),
            [
                [false, false, false],
                [false, true, true],
                [true, false, false],
                [true, true, false],
            ]
        );
    }
}
