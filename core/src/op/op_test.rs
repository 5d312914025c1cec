#[cfg(test)]
mod tests {
    use crate::{
        op::{AssignOp, BinOp, UnaryOp},
        token::Token,
    };

    #[test]
    fn display_matches_source_syntax() {
        assert_eq!(BinOp::NotIn.to_string(), "not in");
        assert_eq!(BinOp::And.to_string(), "and");
        assert_eq!(UnaryOp::Not.to_string(), "not");
        assert_eq!(AssignOp::Add.to_string(), "+=");
        assert_eq!(AssignOp::Assign.to_string(), "=");
    }

    #[test]
    fn operator_classes() {
        assert!(BinOp::Mod.is_arith());
        assert!(BinOp::NotIn.is_cmp());
        assert!(BinOp::Or.is_logical());
        assert!(!BinOp::Add.is_cmp());
    }

    #[test]
    fn compound_assignment_maps_to_binary() {
        assert_eq!(AssignOp::from_token(&Token::DivAssign), Some(AssignOp::Div));
        assert_eq!(AssignOp::Div.binary(), Some(BinOp::Div));
        assert_eq!(AssignOp::Assign.binary(), None);
        assert_eq!(AssignOp::from_token(&Token::Eq), None);
    }
}
