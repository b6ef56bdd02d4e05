//! Optional constant-folding pass over the typed AST (spec §4.3).
//!
//! The original pipeline builds an untyped ANTLR parse tree first and then
//! walks it into typed AST nodes in a separate pass (`bos_loader.py`'s
//! `BosAstBuilder`); this implementation's [`crate::parser::grammar::Parser`]
//! builds the typed AST directly (Design Notes §9), so the one piece of that
//! original pass with externally visible behavior — folding constant
//! subexpressions before lowering — is kept here as a standalone AST-to-AST
//! rewrite, run only when [`crate::config::CompileOptions::fold_constants`]
//! is set.

use crate::ast::*;

/// Folds every constant-foldable subexpression in `file` in place.
pub fn fold_constants(file: &mut File) {
    for decl in &mut file.declarations {
        if let Decl::Func(func) = decl {
            fold_block(&mut func.block);
        }
    }
}

fn fold_block(block: &mut [Stmt]) {
    for stmt in block.iter_mut() {
        fold_stmt(stmt);
    }
}

fn fold_stmt(stmt: &mut Stmt) {
    match stmt {
        Stmt::Block(b) => fold_block(b),
        Stmt::If { cond, then_block, else_block } => {
            fold_expr(cond);
            fold_block(then_block);
            if let Some(b) = else_block {
                fold_block(b);
            }
        }
        Stmt::While { cond, block } => {
            fold_expr(cond);
            fold_block(block);
        }
        Stmt::Assign { expr, .. } => fold_expr(expr),
        Stmt::Return { expr: Some(e) } => fold_expr(e),
        Stmt::Keyword { args, .. } | Stmt::Call { args, .. } | Stmt::Start { args, .. } => {
            for arg in args.iter_mut() {
                if let KeywordArg::Expr(e) = arg {
                    fold_expr(e);
                }
            }
        }
        _ => {}
    }
}

fn fold_expr(expr: &mut Expr) {
    match expr {
        Expr::Unary { op, operand } => {
            fold_expr(operand);
            if let Expr::Value(v) = operand.as_ref() {
                if let ValueTerm::Constant(c) = v.as_ref() {
                    if let Some(folded) = fold_unary(*op, c) {
                        *expr = Expr::Value(Box::new(ValueTerm::Constant(folded)));
                    }
                }
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            fold_expr(lhs);
            fold_expr(rhs);
            if let (Expr::Value(l), Expr::Value(r)) = (lhs.as_ref(), rhs.as_ref()) {
                if let (ValueTerm::Constant(lc), ValueTerm::Constant(rc)) = (l.as_ref(), r.as_ref()) {
                    if let Some(folded) = fold_binary(*op, lc, rc) {
                        *expr = Expr::Value(Box::new(ValueTerm::Constant(folded)));
                    }
                }
            }
        }
        Expr::Value(v) => {
            if let ValueTerm::Rand { min, max } = v.as_mut() {
                fold_expr(min);
                fold_expr(max);
            }
            if let ValueTerm::Get(g) = v.as_mut() {
                fold_expr(&mut g.value_idx);
                for a in g.args.iter_mut().flatten() {
                    fold_expr(a);
                }
            }
        }
    }
}

/// A folded constant always carries [`ConstScale::Normal`]: the scale
/// brackets are surface syntax for a literal, not an operator, so any result
/// of arithmetic on already-scaled operands is itself unscaled.
fn make_folded(value: f64) -> Constant {
    let base_value = if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        NumberValue::Int(value as i64)
    } else {
        NumberValue::Float(value)
    };
    Constant { base_value, scale: ConstScale::Normal, parser_node: None }
}

fn fold_unary(op: ExpressionOp, operand: &Constant) -> Option<Constant> {
    let v = operand.number_value();
    let result = match op {
        ExpressionOp::Minus => -v,
        ExpressionOp::LogicalNot => {
            if v == 0.0 {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    Some(make_folded(result))
}

fn fold_binary(op: ExpressionOp, lhs: &Constant, rhs: &Constant) -> Option<Constant> {
    let l = lhs.number_value();
    let r = rhs.number_value();
    let result = match op {
        ExpressionOp::Add => l + r,
        ExpressionOp::Minus => l - r,
        ExpressionOp::Mult => l * r,
        ExpressionOp::Div => {
            if r == 0.0 {
                return None;
            }
            (l as i64).checked_div(r as i64).map(|i| i as f64)?
        }
        ExpressionOp::Mod => {
            if r == 0.0 {
                return None;
            }
            ((l as i64) % (r as i64)) as f64
        }
        ExpressionOp::BitwiseAnd => ((l as i64) & (r as i64)) as f64,
        ExpressionOp::BitwiseOr => ((l as i64) | (r as i64)) as f64,
        ExpressionOp::BitwiseXor => ((l as i64) ^ (r as i64)) as f64,
        ExpressionOp::LogicalAnd => {
            if l != 0.0 && r != 0.0 {
                1.0
            } else {
                0.0
            }
        }
        ExpressionOp::LogicalOr => {
            if l != 0.0 || r != 0.0 {
                1.0
            } else {
                0.0
            }
        }
        ExpressionOp::LogicalXor => {
            if (l != 0.0) != (r != 0.0) {
                1.0
            } else {
                0.0
            }
        }
        ExpressionOp::CompLess => bool_to_f64(l < r),
        ExpressionOp::CompLessEqual => bool_to_f64(l <= r),
        ExpressionOp::CompGreater => bool_to_f64(l > r),
        ExpressionOp::CompGreaterEqual => bool_to_f64(l >= r),
        ExpressionOp::CompEqual => bool_to_f64(l == r),
        ExpressionOp::CompNotEqual => bool_to_f64(l != r),
        ExpressionOp::LogicalNot => return None,
    };
    Some(make_folded(result))
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expr {
        Expr::Value(Box::new(ValueTerm::Constant(Constant::int_normal(n, None))))
    }

    #[test]
    fn folds_simple_addition() {
        let mut expr = Expr::Binary { op: ExpressionOp::Add, lhs: Box::new(int(2)), rhs: Box::new(int(3)) };
        fold_expr(&mut expr);
        match expr {
            Expr::Value(v) => match *v {
                ValueTerm::Constant(c) => assert_eq!(c.number_value(), 5.0),
                _ => panic!(),
            },
            _ => panic!("expected folded constant"),
        }
    }

    #[test]
    fn does_not_fold_variable_reference() {
        let mut expr = Expr::Binary {
            op: ExpressionOp::Add,
            lhs: Box::new(int(2)),
            rhs: Box::new(Expr::Value(Box::new(ValueTerm::VarRef(Name::new("x", None))))),
        };
        fold_expr(&mut expr);
        assert!(matches!(expr, Expr::Binary { .. }));
    }

    #[test]
    fn folds_nested_subtraction_and_negation() {
        let mut expr = Expr::Unary {
            op: ExpressionOp::Minus,
            operand: Box::new(Expr::Binary { op: ExpressionOp::Minus, lhs: Box::new(int(5)), rhs: Box::new(int(2)) }),
        };
        fold_expr(&mut expr);
        match expr {
            Expr::Value(v) => match *v {
                ValueTerm::Constant(c) => assert_eq!(c.number_value(), -3.0),
                _ => panic!(),
            },
            _ => panic!("expected folded constant"),
        }
    }
}
