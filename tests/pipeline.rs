use std::collections::BTreeSet;

use test_log::test;

use satlab_cnf::truth_table::BuildTruthTable;
use satlab_cnf::{extract, to_cnf, Encoding, Error, NamingAuthority, Node, TseitinTransform};

fn lit(name: &str) -> Node {
    Node::literal(name).unwrap()
}

fn count_binary(node: &Node) -> usize {
    match node {
        Node::Literal(_) => 0,
        Node::Negation(operand) => count_binary(operand),
        Node::Conjunction(left, right) | Node::Disjunction(left, right) => {
            1 + count_binary(left) + count_binary(right)
        }
    }
}

#[test]
fn leaf_yields_single_unit_clause() {
    let clauses = extract(&to_cnf(&lit("a"))).unwrap();

    assert_eq!(clauses.len(), 1);
    let clause = clauses.iter().next().unwrap();
    assert_eq!(clause.signed_names().collect::<Vec<_>>(), [("a", true)]);
}

#[test]
fn conjunction_end_to_end() {
    let authority = NamingAuthority::new();
    let formula = lit("a") & lit("b");
    let cnf = TseitinTransform::new(&authority).transform(&formula);

    let mut clauses = extract(&cnf.tree).unwrap();
    assert_eq!(clauses.len(), 3);
    assert!(clauses.iter().all(|clause| clause.len() <= 3));
    assert_eq!(clauses.variables().len(), 3);
    assert_eq!(format!("{clauses}"), "(a + ~_x0) . (b + ~_x0) . (~a + ~b + _x0)");

    // Without the witness asserted, a = false is still consistent (with _x0 = false).
    let tt = clauses.build_truth_table();
    let models = tt.models();
    assert!(models.iter().any(|model| model.iter().all(|(_, &value)| value)));
    assert!(models.iter().any(|model| model.iter().any(|(var, &value)| var.name() == "a" && !value)));

    clauses.assert_unit(cnf.witness.clone()).unwrap();
    let tt = clauses.build_truth_table();
    let models = tt.models();
    assert_eq!(models.len(), 1);
    assert!(models[0].values().all(|&value| value));
    assert!(models
        .iter()
        .all(|model| model.iter().all(|(var, &value)| var.name() != "a" || value)));
}

#[test]
fn shallow_flat_formulas_preserve_meaning() {
    for formula in [lit("a") & lit("b"), lit("a") | lit("b")] {
        let cnf = TseitinTransform::default().transform(&formula);
        let mut clauses = extract(&cnf.tree).unwrap();
        assert_eq!(clauses.len(), 3 * count_binary(&formula));

        clauses.assert_unit(cnf.witness).unwrap();
        assert!(formula.build_truth_table().agrees_with(&clauses.build_truth_table()), "{formula}");
    }
}

#[test]
fn shallow_nesting_is_rejected_by_extractor() {
    let formulas = [
        (lit("a") & lit("b")) | lit("c"),
        lit("a") & (lit("b") | lit("c")),
        !lit("a") & lit("b"),
    ];

    for formula in formulas {
        let tree = to_cnf(&formula);
        assert!(matches!(extract(&tree), Err(Error::InvalidCnfShape { .. })), "{formula}");
    }
}

#[test]
fn hand_built_compound_under_disjunction() {
    let tree = Node::disjunction(Node::conjunction(lit("a"), lit("b")), lit("c"));

    assert!(matches!(extract(&tree), Err(Error::InvalidCnfShape { .. })));
}

#[test]
fn full_encoding_size_and_equisatisfiability() {
    let formulas = [
        lit("a"),
        !lit("a"),
        lit("a") & !lit("a"),
        (lit("a") & lit("b")) | lit("c"),
        !(lit("a") | !(lit("b") & lit("c"))),
        ((lit("a") & lit("b")) | !lit("c")) & (lit("d") | (lit("a") & lit("e"))),
    ];

    for formula in formulas {
        let authority = NamingAuthority::new();
        let cnf = TseitinTransform::new(&authority)
            .with_encoding(Encoding::Full)
            .transform(&formula);

        let k = count_binary(&formula);
        assert_eq!(authority.issued(), k, "{formula}");

        let mut clauses = extract(&cnf.tree).unwrap();
        if k > 0 {
            assert_eq!(clauses.len(), 3 * k, "{formula}");
        }

        clauses.assert_unit(cnf.witness).unwrap();
        let original = formula.build_truth_table();
        let encoded = clauses.build_truth_table();
        assert!(original.agrees_with(&encoded), "{formula} => {clauses}");
        assert_eq!(original.is_satisfiable(), encoded.is_satisfiable(), "{formula}");
    }
}

#[test]
fn witnesses_are_unique_across_calls() {
    let formula = lit("a") | (lit("b") & lit("c"));

    let witnesses = (0..50)
        .map(|_| TseitinTransform::default().transform(&formula).witness.to_string())
        .collect::<BTreeSet<_>>();

    assert_eq!(witnesses.len(), 50);
}

#[test]
fn input_is_unchanged_by_pipeline() {
    let formula = (lit("a") & lit("b")) | !lit("c");
    let before = formula.clone();
    let rendered = format!("{formula}");
    let tree_rendering = formula.render_tree();

    let _ = extract(&to_cnf(&formula));
    let _ = extract(&TseitinTransform::default().with_encoding(Encoding::Full).to_cnf(&formula));

    assert_eq!(formula, before);
    assert_eq!(format!("{formula}"), rendered);
    assert_eq!(formula.render_tree(), tree_rendering);
}
