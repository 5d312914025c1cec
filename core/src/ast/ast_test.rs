#[cfg(test)]
mod tests {
    use crate::ast::{Ast, NodeId, NodeKind, Visitor, Walk};

    #[derive(Default)]
    struct Collect {
        names: Vec<&'static str>,
        left: usize,
    }

    impl Visitor for Collect {
        fn visit_id_expression(&mut self, _ast: &Ast, _id: NodeId) -> Walk {
            self.names.push("id");
            Walk::Continue
        }

        fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
            if ast.call_name(id) == Some("skip") {
                return Walk::SkipChildren;
            }
            self.names.push("call");
            Walk::Continue
        }

        fn visit_string_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
            if ast.string_value(id) == Some("stop") {
                return Walk::Stop;
            }
            self.names.push("str");
            Walk::Continue
        }

        fn leave(&mut self, _ast: &Ast, _id: NodeId) {
            self.left += 1;
        }
    }

    #[test]
    fn visitor_dispatches_in_source_order() {
        let ast = Ast::parse("foo(a, 'b')\n");
        let mut v = Collect::default();
        ast.walk(&mut v);
        assert_eq!(v.names, vec!["call", "id", "id", "str"]);
        // root, call, callee, args, a, 'b'
        assert_eq!(v.left, 6);
    }

    #[test]
    fn visitor_skip_children() {
        let ast = Ast::parse("skip(a)\nb\n");
        let mut v = Collect::default();
        ast.walk(&mut v);
        assert_eq!(v.names, vec!["id"]);
    }

    #[test]
    fn visitor_stop_aborts_walk() {
        let ast = Ast::parse("x = 'a'\ny = 'stop'\nz = 'c'\n");
        let mut v = Collect::default();
        ast.walk(&mut v);
        assert_eq!(v.names, vec!["id", "str", "id"]);
    }

    #[test]
    fn parents_are_linked() {
        let ast = Ast::parse("if a\n  x = b.c()\nendif\n");
        for id in ast.ids() {
            let parent = ast.parent(id);
            if id == ast.root() {
                assert!(parent.is_none());
                continue;
            }
            let parent = parent.expect("every non-root node has a parent");
            assert!(ast.children(parent).contains(&id));
        }
    }

    #[test]
    fn ancestors_reach_root() {
        let ast = Ast::parse("x = [1, [2]]");
        let two = ast
            .ids()
            .find(|id| matches!(ast.kind(*id), NodeKind::IntegerLiteral { value: 2, .. }))
            .expect("literal 2");
        let chain: Vec<&str> = ast.ancestors(two).map(|a| ast.kind(a).name()).collect();
        assert_eq!(
            chain,
            vec!["ArrayLiteral", "ArrayLiteral", "AssignmentStatement", "BuildDefinition"]
        );
    }

    #[test]
    fn node_at_finds_innermost() {
        let ast = Ast::parse("x = foo(bar)\n");
        let id = ast.node_at(0, 9).expect("node at bar");
        assert_eq!(ast.identifier(id), Some("bar"));
        let id = ast.node_at(0, 4).expect("node at foo");
        assert_eq!(ast.identifier(id), Some("foo"));
        // end of `bar` is exclusive
        let id = ast.node_at(0, 11).expect("node at ')'");
        assert!(matches!(ast.kind(id), NodeKind::ArgumentList { .. }));
    }

    #[test]
    fn selection_children_interleave_conditions_and_blocks() {
        let ast = Ast::parse("if a\n  b = 1\nelse\n  c = 2\nendif\n");
        let NodeKind::BuildDefinition { statements } = ast.kind(ast.root()) else {
            panic!("root");
        };
        let kinds: Vec<&str> = ast.children(statements[0]).iter().map(|c| ast.kind(*c).name()).collect();
        assert_eq!(kinds, vec!["IdExpression", "AssignmentStatement", "AssignmentStatement"]);
    }
}
