//! Recursive-descent parser (spec §4.2): turns a token stream into both a
//! [`ParseArena`] (for diagnostics provenance) and the typed [`ast::File`]
//! directly — the original's ANTLR grammar builds a separate untyped parse
//! tree that `bos_loader.py` then walks to build AST nodes, but with no
//! grammar-generator in this pipeline's stack, building both in one pass is
//! the idiomatic hand-rolled-parser shape (Design Notes §9).
//!
//! `for` is deliberately never recognized as a statement keyword: spec.md's
//! Open Questions resolve it as a rejected construct, matching the
//! original's grammar (`original_source/bos/bos_loader.py` has no
//! `for`-statement rule either).

use crate::ast::*;
use crate::errors::{ErrorKind, Result};
use crate::location::CodeLocation;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::tree::{ParseArena, ParseNodeId};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    pub arena: ParseArena,
}

impl<'a> Parser<'a> {
    pub fn new(preprocessed_text: &'a str, file_name: impl Into<String>) -> Result<Self> {
        let mut lexer = Lexer::new(preprocessed_text, file_name);
        let lookahead = lexer.next_token()?;
        Ok(Parser { lexer, lookahead, arena: ParseArena::new() })
    }

    fn node(&mut self, rule_name: &'static str, location: CodeLocation) -> ParseNodeId {
        self.arena.push(rule_name, location)
    }

    fn bump(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn loc(&self) -> CodeLocation {
        self.lookahead.location.clone()
    }

    fn expect_symbol(&mut self, sym: &'static str) -> Result<Token> {
        if self.lookahead.kind == TokenKind::Symbol(sym) {
            self.bump()
        } else {
            Err(ErrorKind::Syntax(
                format!("expected '{}', found {:?}", sym, self.lookahead.kind),
                Some(self.loc()),
            )
            .into())
        }
    }

    fn expect_ident(&mut self) -> Result<(String, CodeLocation)> {
        let loc = self.loc();
        match self.bump()?.kind {
            TokenKind::Ident(s) => Ok((s, loc)),
            other => Err(ErrorKind::Syntax(format!("expected identifier, found {:?}", other), Some(loc)).into()),
        }
    }

    fn ident_is(&self, text: &str) -> bool {
        matches!(&self.lookahead.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(text))
    }

    fn eat_keyword(&mut self, text: &str) -> Result<CodeLocation> {
        if self.ident_is(text) {
            let tok = self.bump()?;
            Ok(tok.location)
        } else {
            Err(ErrorKind::Syntax(
                format!("expected '{}', found {:?}", text, self.lookahead.kind),
                Some(self.loc()),
            )
            .into())
        }
    }

    pub fn parse_file(&mut self) -> Result<File> {
        let mut declarations = Vec::new();
        while self.lookahead.kind != TokenKind::Eof {
            declarations.push(self.parse_decl()?);
        }
        Ok(File { declarations })
    }

    fn parse_decl(&mut self) -> Result<Decl> {
        if self.ident_is("piece") {
            self.bump()?;
            let names = self.parse_name_list()?;
            self.expect_symbol(";")?;
            return Ok(Decl::Piece(names));
        }
        if self.ident_is("static-var") || self.ident_is("static_var") {
            self.bump()?;
            let names = self.parse_name_list()?;
            self.expect_symbol(";")?;
            return Ok(Decl::StaticVar(names));
        }
        self.parse_func_decl().map(Decl::Func)
    }

    fn parse_name_list(&mut self) -> Result<Vec<Name>> {
        let mut names = Vec::new();
        loop {
            let loc = self.loc();
            let (text, _) = self.expect_ident()?;
            let id = self.node("name", loc);
            names.push(Name::new(text, Some(id)));
            if self.lookahead.kind == TokenKind::Symbol(",") {
                self.bump()?;
                continue;
            }
            break;
        }
        Ok(names)
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let (name_text, name_loc) = self.expect_ident()?;
        let name_id = self.node("funcName", name_loc);
        self.expect_symbol("(")?;
        let mut args = Vec::new();
        if self.lookahead.kind != TokenKind::Symbol(")") {
            loop {
                let loc = self.loc();
                let (arg_text, _) = self.expect_ident()?;
                let id = self.node("argName", loc);
                args.push(Name::new(arg_text, Some(id)));
                if self.lookahead.kind == TokenKind::Symbol(",") {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_symbol(")")?;
        let block = self.parse_block()?;
        Ok(FuncDecl { name: Name::new(name_text, Some(name_id)), args, block })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.expect_symbol("{")?;
        let mut stmts = Vec::new();
        while self.lookahead.kind != TokenKind::Symbol("}") {
            stmts.push(self.parse_stmt()?);
        }
        self.expect_symbol("}")?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        if self.ident_is("for") {
            return Err(ErrorKind::Unsupported("'for' loops are not part of this language".to_string(), Some(self.loc())).into());
        }
        if self.ident_is("var") {
            self.bump()?;
            let names = self.parse_name_list()?;
            self.expect_symbol(";")?;
            return Ok(Stmt::VarDecl(names));
        }
        if self.ident_is("if") {
            return self.parse_if();
        }
        if self.ident_is("while") {
            return self.parse_while();
        }
        if self.ident_is("return") {
            self.bump()?;
            let expr = if self.lookahead.kind == TokenKind::Symbol(";") {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect_symbol(";")?;
            return Ok(Stmt::Return { expr });
        }
        if self.lookahead.kind == TokenKind::Symbol(";") {
            self.bump()?;
            return Ok(Stmt::Empty);
        }
        if self.ident_is("call-script") {
            let loc = self.loc();
            self.bump()?;
            let args = self.parse_paren_args()?;
            self.expect_symbol(";")?;
            let id = self.node("callStatement", loc);
            return Ok(Stmt::Call { args, parser_node: Some(id) });
        }
        if self.ident_is("start-script") {
            let loc = self.loc();
            self.bump()?;
            let args = self.parse_paren_args()?;
            self.expect_symbol(";")?;
            let id = self.node("startStatement", loc);
            return Ok(Stmt::Start { args, parser_node: Some(id) });
        }
        if let Some(keyword) = self.peek_statement_keyword() {
            return self.parse_keyword_stmt(keyword);
        }

        self.parse_assign_or_incdec()
    }

    fn peek_statement_keyword(&self) -> Option<Keyword> {
        let name = match &self.lookahead.kind {
            TokenKind::Ident(s) => s.as_str(),
            _ => return None,
        };
        Some(match name.to_ascii_lowercase().as_str() {
            "turn" => Keyword::Turn,
            "move" => Keyword::Move,
            "spin" => Keyword::Spin,
            "stop-spin" => Keyword::StopSpin,
            "wait-for-turn" => Keyword::WaitForTurn,
            "wait-for-move" => Keyword::WaitForMove,
            "set" => Keyword::Set,
            "get" => Keyword::Get,
            "emit-sfx" => Keyword::EmitSfx,
            "sleep" => Keyword::Sleep,
            "hide" => Keyword::Hide,
            "show" => Keyword::Show,
            "explode" => Keyword::Explode,
            "signal" => Keyword::Signal,
            "set-signal-mask" => Keyword::SetSignalMask,
            "attach-unit" => Keyword::AttachUnit,
            "drop-unit" => Keyword::DropUnit,
            "cache" => Keyword::Cache,
            "dont-cache" => Keyword::DontCache,
            "dont-shadow" => Keyword::DontShadow,
            "dont-shade" => Keyword::DontShade,
            "play-sound" => Keyword::PlaySound,
            _ => return None,
        })
    }

    fn parse_keyword_stmt(&mut self, keyword: Keyword) -> Result<Stmt> {
        let loc = self.loc();
        self.bump()?;
        let mut args = Vec::new();

        match keyword {
            Keyword::Move | Keyword::Turn => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
                self.eat_keyword("to")?;
                args.push(KeywordArg::Axis(self.parse_axis()?));
                args.push(KeywordArg::Expr(self.parse_expr()?));
                if self.ident_is("now") {
                    self.bump()?;
                    args.push(KeywordArg::None);
                } else if self.ident_is("speed") {
                    self.bump()?;
                    args.push(KeywordArg::Expr(self.parse_expr()?));
                } else {
                    // Absent trailing "now"/"speed" suffix behaves like an
                    // explicit "now" (spec.md §8.3 scenario 3).
                    args.push(KeywordArg::None);
                }
            }
            Keyword::Spin => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
                self.eat_keyword("around")?;
                args.push(KeywordArg::Axis(self.parse_axis()?));
                self.eat_keyword("accelerate")?;
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::StopSpin => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
                self.eat_keyword("around")?;
                args.push(KeywordArg::Axis(self.parse_axis()?));
                if self.ident_is("decelerate") {
                    self.bump()?;
                    args.push(KeywordArg::Expr(self.parse_expr()?));
                } else {
                    args.push(KeywordArg::None);
                }
            }
            Keyword::WaitForTurn => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
                self.eat_keyword("around")?;
                args.push(KeywordArg::Axis(self.parse_axis()?));
            }
            Keyword::WaitForMove => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
                self.eat_keyword("along")?;
                args.push(KeywordArg::Axis(self.parse_axis()?));
            }
            Keyword::Set => {
                // `set <unit-value-index-expr> to <value-expr>;` — the
                // index is an expression (not a bare name) because unit
                // value names like ACTIVATION are preprocessor macros that
                // have already expanded to integer literals by this point.
                args.push(KeywordArg::Expr(self.parse_expr()?));
                self.eat_keyword("to")?;
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::Get => {
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::EmitSfx => {
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::Sleep => {
                self.eat_keyword("for")?;
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::Hide | Keyword::Show | Keyword::Explode => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
                if matches!(keyword, Keyword::Explode) {
                    self.eat_keyword("type")?;
                    args.push(KeywordArg::Expr(self.parse_expr()?));
                }
            }
            Keyword::Signal | Keyword::SetSignalMask => {
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::AttachUnit => {
                // `attach-unit <piece-expr> to <unit-expr>;`
                args.push(KeywordArg::Expr(self.parse_expr()?));
                self.eat_keyword("to")?;
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::DropUnit => {
                args.push(KeywordArg::Expr(self.parse_expr()?));
            }
            Keyword::Cache | Keyword::DontCache | Keyword::DontShadow | Keyword::DontShade => {
                let (name, name_loc) = self.expect_ident()?;
                let id = self.node("name", name_loc);
                args.push(KeywordArg::Name(Name::new(name, Some(id))));
            }
            Keyword::PlaySound => {
                while self.lookahead.kind != TokenKind::Symbol(";") {
                    self.bump()?;
                }
            }
            _ => {}
        }
        self.expect_symbol(";")?;
        let id = self.node("keywordStatement", loc);
        Ok(Stmt::Keyword { keyword, args, parser_node: Some(id) })
    }

    fn parse_axis(&mut self) -> Result<Axis> {
        let (name, loc) = self.expect_ident()?;
        let axis = AxisEnum::parse_axis_name(&name)
            .ok_or_else(|| ErrorKind::Syntax(format!("expected axis (x-axis/y-axis/z-axis), found '{}'", name), Some(loc)))?;
        Ok(Axis { axis })
    }

    fn parse_paren_args(&mut self) -> Result<Vec<KeywordArg>> {
        let (name, name_loc) = self.expect_ident()?;
        let id = self.node("name", name_loc);
        let mut args = vec![KeywordArg::Name(Name::new(name, Some(id)))];
        self.expect_symbol("(")?;
        if self.lookahead.kind != TokenKind::Symbol(")") {
            loop {
                args.push(KeywordArg::Expr(self.parse_expr()?));
                if self.lookahead.kind == TokenKind::Symbol(",") {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_symbol(")")?;
        Ok(args)
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.bump()?;
        self.expect_symbol("(")?;
        let cond = self.parse_expr()?;
        self.expect_symbol(")")?;
        let then_block = self.parse_block()?;
        let else_block = if self.ident_is("else") {
            self.bump()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If { cond, then_block, else_block })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.bump()?;
        self.expect_symbol("(")?;
        let cond = self.parse_expr()?;
        self.expect_symbol(")")?;
        let block = self.parse_block()?;
        Ok(Stmt::While { cond, block })
    }

    fn parse_assign_or_incdec(&mut self) -> Result<Stmt> {
        let (name, name_loc) = self.expect_ident()?;
        let id = self.node("name", name_loc.clone());
        let var = Name::new(name, Some(id));

        if self.lookahead.kind == TokenKind::Symbol("+=") || self.lookahead.kind == TokenKind::Symbol("-=") {
            let is_plus = self.lookahead.kind == TokenKind::Symbol("+=");
            self.bump()?;
            let amount = self.parse_expr()?;
            self.expect_symbol(";")?;
            let stmt_id = self.node("assignStatement", name_loc);
            let op = if is_plus { ExpressionOp::Add } else { ExpressionOp::Minus };
            let expr = Expr::Binary {
                op,
                lhs: Box::new(Expr::Value(Box::new(ValueTerm::VarRef(var.clone())))),
                rhs: Box::new(amount),
            };
            return Ok(Stmt::Assign { var, expr, parser_node: Some(stmt_id) });
        }

        self.expect_symbol("=")?;
        let expr = self.parse_expr()?;
        self.expect_symbol(";")?;
        let stmt_id = self.node("assignStatement", name_loc);
        Ok(Stmt::Assign { var, expr, parser_node: Some(stmt_id) })
    }

    // --- expressions, precedence-climbing ---

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_logical_and()?;
        while self.lookahead.kind == TokenKind::Symbol("||") {
            self.bump()?;
            let rhs = self.parse_logical_and()?;
            lhs = Expr::Binary { op: ExpressionOp::LogicalOr, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bitwise_or()?;
        while self.lookahead.kind == TokenKind::Symbol("&&") {
            self.bump()?;
            let rhs = self.parse_bitwise_or()?;
            lhs = Expr::Binary { op: ExpressionOp::LogicalAnd, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bitwise_xor()?;
        while self.lookahead.kind == TokenKind::Symbol("|") {
            self.bump()?;
            let rhs = self.parse_bitwise_xor()?;
            lhs = Expr::Binary { op: ExpressionOp::BitwiseOr, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_bitwise_and()?;
        while self.lookahead.kind == TokenKind::Symbol("^") {
            self.bump()?;
            let rhs = self.parse_bitwise_and()?;
            lhs = Expr::Binary { op: ExpressionOp::BitwiseXor, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.lookahead.kind == TokenKind::Symbol("&") {
            self.bump()?;
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary { op: ExpressionOp::BitwiseAnd, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Symbol("==") => ExpressionOp::CompEqual,
                TokenKind::Symbol("!=") => ExpressionOp::CompNotEqual,
                _ => break,
            };
            self.bump()?;
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Symbol("<") => ExpressionOp::CompLess,
                TokenKind::Symbol(">") => ExpressionOp::CompGreater,
                TokenKind::Symbol("<=") => ExpressionOp::CompLessEqual,
                TokenKind::Symbol(">=") => ExpressionOp::CompGreaterEqual,
                _ => break,
            };
            self.bump()?;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Symbol("+") => ExpressionOp::Add,
                TokenKind::Symbol("-") => ExpressionOp::Minus,
                _ => break,
            };
            self.bump()?;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Symbol("*") => ExpressionOp::Mult,
                TokenKind::Symbol("/") => ExpressionOp::Div,
                TokenKind::Symbol("%") => ExpressionOp::Mod,
                _ => break,
            };
            self.bump()?;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.lookahead.kind {
            TokenKind::Symbol("-") => Some(ExpressionOp::Minus),
            TokenKind::Symbol("!") => Some(ExpressionOp::LogicalNot),
            _ => None,
        };
        if let Some(op) = op {
            self.bump()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary { op, operand: Box::new(operand) });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.lookahead.kind == TokenKind::Symbol("(") {
            self.bump()?;
            let inner = self.parse_expr()?;
            self.expect_symbol(")")?;
            return Ok(inner);
        }
        if self.ident_is("rand") {
            self.bump()?;
            self.expect_symbol("(")?;
            let min = self.parse_expr()?;
            self.expect_symbol(",")?;
            let max = self.parse_expr()?;
            self.expect_symbol(")")?;
            return Ok(Expr::Value(Box::new(ValueTerm::Rand { min: Box::new(min), max: Box::new(max) })));
        }
        if self.ident_is("get") {
            self.bump()?;
            self.expect_symbol("(")?;
            let value_idx = self.parse_expr()?;
            let mut args = Vec::new();
            while self.lookahead.kind == TokenKind::Symbol(",") {
                self.bump()?;
                args.push(Some(self.parse_expr()?));
            }
            self.expect_symbol(")")?;
            return Ok(Expr::Value(Box::new(ValueTerm::Get(Box::new(GetCall { value_idx, args })))));
        }

        let loc = self.loc();
        match self.bump()?.kind {
            TokenKind::IntLiteral(v) => {
                let id = self.node("intLiteral", loc);
                Ok(Expr::Value(Box::new(ValueTerm::Constant(Constant {
                    base_value: NumberValue::Int(v),
                    scale: ConstScale::Normal,
                    parser_node: Some(id),
                }))))
            }
            TokenKind::FloatLiteral(v) => {
                let id = self.node("floatLiteral", loc);
                Ok(Expr::Value(Box::new(ValueTerm::Constant(Constant {
                    base_value: NumberValue::Float(v),
                    scale: ConstScale::Normal,
                    parser_node: Some(id),
                }))))
            }
            TokenKind::LinearLiteral(text) => {
                let id = self.node("linearLiteral", loc);
                Ok(Expr::Value(Box::new(ValueTerm::Constant(parse_scaled_literal(&text, ConstScale::Linear, Some(id))?))))
            }
            TokenKind::AngularLiteral(text) => {
                let id = self.node("angularLiteral", loc);
                Ok(Expr::Value(Box::new(ValueTerm::Constant(parse_scaled_literal(&text, ConstScale::Angular, Some(id))?))))
            }
            TokenKind::Ident(name) => {
                let id = self.node("name", loc);
                Ok(Expr::Value(Box::new(ValueTerm::VarRef(Name::new(name, Some(id))))))
            }
            other => Err(ErrorKind::Syntax(format!("unexpected token in expression: {:?}", other), Some(loc)).into()),
        }
    }
}

fn parse_scaled_literal(text: &str, scale: ConstScale, parser_node: Option<ParseNodeId>) -> Result<Constant> {
    let base_value = if let Ok(i) = text.parse::<i64>() {
        NumberValue::Int(i)
    } else if let Ok(f) = text.parse::<f64>() {
        NumberValue::Float(f)
    } else {
        return Err(ErrorKind::Syntax(format!("malformed scaled literal '{}'", text), None).into());
    };
    Ok(Constant { base_value, scale, parser_node })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_piece_function() {
        let src = "piece base;\n\nScript1() {\n}\n";
        let mut parser = Parser::new(src, "t.bos").unwrap();
        let file = parser.parse_file().unwrap();
        assert_eq!(file.declarations.len(), 2);
        matches!(&file.declarations[0], Decl::Piece(names) if names.len() == 1);
    }

    #[test]
    fn parses_if_else() {
        let src = "Script1() {\n  if (1 < 2) {\n    return 1;\n  } else {\n    return 0;\n  }\n}\n";
        let mut parser = Parser::new(src, "t.bos").unwrap();
        let file = parser.parse_file().unwrap();
        let Decl::Func(f) = &file.declarations[0] else { panic!() };
        assert_eq!(f.block.len(), 1);
        matches!(&f.block[0], Stmt::If { else_block: Some(_), .. });
    }

    #[test]
    fn rejects_for_loop() {
        let src = "Script1() {\n  for (x = 0; x < 2; x += 1) {}\n}\n";
        let mut parser = Parser::new(src, "t.bos").unwrap();
        assert!(parser.parse_file().is_err());
    }

    #[test]
    fn parses_linear_constant() {
        let src = "Script1() {\n  x = [1.5];\n}\n";
        let mut parser = Parser::new(src, "t.bos").unwrap();
        let file = parser.parse_file().unwrap();
        let Decl::Func(f) = &file.declarations[0] else { panic!() };
        let Stmt::Assign { expr, .. } = &f.block[0] else { panic!() };
        let Expr::Value(v) = expr else { panic!() };
        matches!(&**v, ValueTerm::Constant(c) if c.scale == ConstScale::Linear);
    }
}
