use dot_writer::{Attributes, DotWriter, NodeId, Scope};

use crate::expression::Node;

/// Graphviz rendering for debugging.
pub trait Render {
    fn render(&self) -> String;
}

fn traverse_node(scope: &mut Scope, root: &Node, counter: &mut usize) -> NodeId {
    let current = *counter;
    *counter += 1;

    let (label, children): (String, Vec<&Node>) = match root {
        Node::Literal(literal) => (literal.to_string(), vec![]),
        Node::Negation(operand) => ("NOT".to_owned(), vec![operand.as_ref()]),
        Node::Conjunction(left, right) => ("AND".to_owned(), vec![left.as_ref(), right.as_ref()]),
        Node::Disjunction(left, right) => ("OR".to_owned(), vec![left.as_ref(), right.as_ref()]),
    };

    let mut node = scope.node_named(current.to_string());
    node.set_label(&label);
    let id = node.id();
    drop(node);

    for child in children {
        let child_id = traverse_node(scope, child, counter);
        scope.edge(id.clone(), child_id);
    }

    id
}

impl Render for Node {
    fn render(&self) -> String {
        let mut output_bytes = Vec::new();
        let mut writer = DotWriter::from(&mut output_bytes);
        writer.set_pretty_print(true);
        let mut scope = writer.digraph();

        traverse_node(&mut scope, self, &mut 0);
        drop(scope);
        drop(writer);

        String::from_utf8_lossy(&output_bytes).into_owned()
    }
}
