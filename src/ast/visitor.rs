//! Read-only depth-first traversal.

use super::node::NodeRef;

/// Visit `node` and every descendant, depth first and left to right.
/// Returning `false` from the callback prunes the subtree below the
/// current node.
pub fn inspect<'a, N, F>(node: N, f: &mut F)
where
    N: Into<NodeRef<'a>>,
    F: FnMut(NodeRef<'a>) -> bool,
{
    fn recurse<'a, F>(node: NodeRef<'a>, f: &mut F)
    where
        F: FnMut(NodeRef<'a>) -> bool,
    {
        if !f(node) {
            return;
        }
        for child in node.children() {
            recurse(child, f);
        }
    }
    recurse(node.into(), f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::dialect::GenericDialect;
    use crate::parser::Parser;

    fn parse(sql: &str) -> Statement {
        Parser::new(sql, &GenericDialect)
            .unwrap()
            .parse_statement()
            .unwrap()
    }

    #[test]
    fn test_inspect_collects_idents() {
        let stmt = parse("SELECT a, t.b FROM t WHERE c = 1");
        let mut idents = Vec::new();
        inspect(&stmt, &mut |node| {
            if let NodeRef::Ident(ident) = node {
                idents.push(ident.value.clone());
            }
            true
        });
        assert_eq!(idents, vec!["a", "t", "b", "t", "c"]);
    }

    #[test]
    fn test_inspect_visits_every_node_once() {
        let stmt = parse("SELECT COUNT(x.id) AS c FROM x LEFT JOIN y ON x.id = y.x_id");
        let mut total = 0;
        let mut expected = 1;
        inspect(&stmt, &mut |node| {
            total += 1;
            expected += node.children().len();
            true
        });
        // Each node is reached exactly once: the visit count equals the sum
        // of child counts plus one for the root.
        assert_eq!(total, expected);
    }

    #[test]
    fn test_inspect_prunes_subtrees() {
        let stmt = parse("SELECT a FROM t WHERE b IN (SELECT c FROM u)");
        let mut with_prune = 0;
        inspect(&stmt, &mut |node| {
            with_prune += 1;
            // Stop at sub-queries.
            !matches!(node, NodeRef::Query(_)) || with_prune == 1
        });
        let mut without_prune = 0;
        inspect(&stmt, &mut |_| {
            without_prune += 1;
            true
        });
        assert!(with_prune < without_prune);
    }
}
