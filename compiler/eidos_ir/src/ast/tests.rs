use super::*;
use pretty_assertions::assert_eq;

#[test]
fn alloc_assigns_sequential_ids() {
    let mut ast = Ast::new();
    let a = ast.alloc(NodeKind::Empty, Span::new(0, 1), 1);
    let b = ast.alloc(NodeKind::Next, Span::new(2, 6), 2);
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(ast.len(), 2);
    assert_eq!(ast.node(b).line, 2);
    assert_eq!(ast.node(b).span, Span::new(2, 6));
}

#[test]
fn lists_round_trip_in_order() {
    let mut ast = Ast::new();
    let ids: Vec<NodeId> = (0..3)
        .map(|i| ast.alloc(NodeKind::Empty, Span::new(i, i + 1), 1))
        .collect();
    let first = ast.alloc_list(&ids[..2]);
    let second = ast.alloc_list(&ids[1..]);
    assert_eq!(ast.list(first), &ids[..2]);
    assert_eq!(ast.list(second), &ids[1..]);
    assert!(ast.list(NodeRange::EMPTY).is_empty());
}

#[test]
fn root_is_unset_until_assigned() {
    let mut ast = Ast::new();
    assert_eq!(ast.root(), None);
    let block = ast.alloc(NodeKind::Block(NodeRange::EMPTY), Span::DUMMY, 0);
    ast.set_root(block);
    assert_eq!(ast.root(), Some(block));
    assert!(matches!(ast.kind(block), NodeKind::Block(r) if r.is_empty()));
}

#[test]
fn comparison_operators_are_classified() {
    assert!(BinaryOp::LtEq.is_comparison());
    assert!(!BinaryOp::Pow.is_comparison());
    assert_eq!(BinaryOp::Pow.as_symbol(), "^");
    assert_eq!(UnaryOp::Not.as_symbol(), "!");
}
