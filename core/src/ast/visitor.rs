use super::{Ast, NodeId, NodeKind};

/// What a visitor wants to happen after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit the children, then call [`Visitor::leave`].
    Continue,
    /// Do not descend into this node, but keep walking its siblings.
    SkipChildren,
    /// Abort the whole traversal.
    Stop,
}

/// Per-kind callbacks for a depth-first walk over an [`Ast`].
///
/// Every method defaults to [`Walk::Continue`], so implementors only override
/// the kinds they care about.
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_argument_list(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_assignment_statement(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_binary_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_boolean_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_break_node(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_build_definition(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_conditional_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_continue_node(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_dictionary_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_error_node(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_id_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_integer_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_iteration_statement(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_key_value_item(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_keyword_item(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_method_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_selection_statement(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_string_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_subscript_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }
    fn visit_unary_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        Walk::Continue
    }

    /// Called after the children of a node that returned [`Walk::Continue`].
    fn leave(&mut self, ast: &Ast, id: NodeId) {}
}

impl Ast {
    /// Dispatch `id` to its kind-specific method, then walk its children.
    pub fn accept<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) -> Walk {
        let walk = match self.kind(id) {
            NodeKind::ArgumentList { .. } => visitor.visit_argument_list(self, id),
            NodeKind::ArrayLiteral { .. } => visitor.visit_array_literal(self, id),
            NodeKind::AssignmentStatement { .. } => visitor.visit_assignment_statement(self, id),
            NodeKind::BinaryExpression { .. } => visitor.visit_binary_expression(self, id),
            NodeKind::BooleanLiteral { .. } => visitor.visit_boolean_literal(self, id),
            NodeKind::BreakNode => visitor.visit_break_node(self, id),
            NodeKind::BuildDefinition { .. } => visitor.visit_build_definition(self, id),
            NodeKind::ConditionalExpression { .. } => visitor.visit_conditional_expression(self, id),
            NodeKind::ContinueNode => visitor.visit_continue_node(self, id),
            NodeKind::DictionaryLiteral { .. } => visitor.visit_dictionary_literal(self, id),
            NodeKind::ErrorNode { .. } => visitor.visit_error_node(self, id),
            NodeKind::FunctionExpression { .. } => visitor.visit_function_expression(self, id),
            NodeKind::IdExpression { .. } => visitor.visit_id_expression(self, id),
            NodeKind::IntegerLiteral { .. } => visitor.visit_integer_literal(self, id),
            NodeKind::IterationStatement { .. } => visitor.visit_iteration_statement(self, id),
            NodeKind::KeyValueItem { .. } => visitor.visit_key_value_item(self, id),
            NodeKind::KeywordItem { .. } => visitor.visit_keyword_item(self, id),
            NodeKind::MethodExpression { .. } => visitor.visit_method_expression(self, id),
            NodeKind::SelectionStatement { .. } => visitor.visit_selection_statement(self, id),
            NodeKind::StringLiteral { .. } => visitor.visit_string_literal(self, id),
            NodeKind::SubscriptExpression { .. } => visitor.visit_subscript_expression(self, id),
            NodeKind::UnaryExpression { .. } => visitor.visit_unary_expression(self, id),
        };
        match walk {
            Walk::Stop => return Walk::Stop,
            Walk::SkipChildren => return Walk::Continue,
            Walk::Continue => {}
        }
        for child in self.children(id) {
            if self.accept(child, visitor) == Walk::Stop {
                return Walk::Stop;
            }
        }
        visitor.leave(self, id);
        Walk::Continue
    }

    /// Walk the whole tree from the root.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.accept(self.root(), visitor);
    }
}
