//! AST-to-bytecode lowering (spec §4.5): walks the typed AST and emits the
//! 32-bit-word code buffer the object file carries, back-patching jump
//! targets once they're known.
//!
//! Grounded on `original_source/cob/compiler/cob_compiler.py`'s
//! `CobCompiler._handle_node` dispatch, reshaped here as an exhaustive
//! `match` over the tagged [`ast`] enums rather than a per-node-class
//! virtual dispatch (Design Notes §9).

use crate::ast::*;
use crate::config::CompileOptions;
use crate::errors::{ErrorKind, Result};
use crate::objfile::{CompiledFunction, ObjectFile};
use crate::opcodes::{op, opcode_for_binary_op, opcode_for_keyword, opcode_for_unary_op, reverses_args, Word};
use crate::parser::tree::ParseArena;
use crate::registry::{NameRegistry, NameType};

pub fn compile_file(file: &File, arena: &ParseArena, options: &CompileOptions) -> Result<ObjectFile> {
    let mut registry = NameRegistry::new();

    // Pass 1: register every global name (pieces, static vars, functions)
    // before lowering any function body, so forward references resolve.
    for decl in &file.declarations {
        match decl {
            Decl::Piece(names) => {
                for name in names {
                    registry.register(name, NameType::Piece, loc_of(arena, name.parser_node))?;
                }
            }
            Decl::StaticVar(names) => {
                for name in names {
                    registry.register(name, NameType::Static, loc_of(arena, name.parser_node))?;
                }
            }
            Decl::Func(f) => {
                registry.register(&f.name, NameType::Function, loc_of(arena, f.name.parser_node))?;
            }
        }
    }

    let static_var_count = registry.count(NameType::Static);

    let mut lowerer = Lowerer { arena, registry: &mut registry, options, code: Vec::new() };
    let mut functions = Vec::new();
    for decl in &file.declarations {
        if let Decl::Func(f) = decl {
            let entry_offset = lowerer.code.len() as u32;
            lowerer.lower_func(f)?;
            functions.push(CompiledFunction { name: f.name.text.clone(), entry_offset });
        }
    }

    debug_assert!(
        !lowerer.code.contains(&op::BAD_OP_PLACEHOLDER),
        "BAD_OP_PLACEHOLDER leaked into final code buffer"
    );

    let piece_names = pieces_in_order(file);

    Ok(ObjectFile { functions, piece_names, static_var_count, code: lowerer.code })
}

fn pieces_in_order(file: &File) -> Vec<String> {
    file.declarations
        .iter()
        .filter_map(|d| match d {
            Decl::Piece(names) => Some(names),
            _ => None,
        })
        .flatten()
        .map(|n| n.text.clone())
        .collect()
}

fn loc_of(arena: &ParseArena, node: Option<crate::parser::tree::ParseNodeId>) -> Option<crate::location::CodeLocation> {
    crate::diagnostics::location_of(arena, node)
}

struct Lowerer<'a> {
    arena: &'a ParseArena,
    registry: &'a mut NameRegistry,
    options: &'a CompileOptions,
    code: Vec<Word>,
}

impl<'a> Lowerer<'a> {
    fn emit(&mut self, word: Word) {
        self.code.push(word);
    }

    fn emit_placeholder(&mut self) -> usize {
        let idx = self.code.len();
        self.code.push(op::BAD_OP_PLACEHOLDER);
        idx
    }

    fn patch_here(&mut self, idx: usize) {
        self.code[idx] = self.code.len() as Word;
    }

    fn lower_func(&mut self, f: &FuncDecl) -> Result<()> {
        self.registry.clear_local_names();
        for arg in &f.args {
            self.registry.register(arg, NameType::Arg, loc_of(self.arena, arg.parser_node))?;
            self.emit(op::CREATE_LOCAL_VAR);
        }
        self.lower_block(&f.block)?;
        // If the body doesn't already end in an explicit return, append the
        // default one so the VM never falls off the end of a function.
        if !matches!(f.block.last(), Some(Stmt::Return { .. })) {
            self.emit(op::PUSH_CONSTANT);
            self.emit(0);
            self.emit(op::RETURN);
        }
        Ok(())
    }

    fn lower_block(&mut self, block: &[Stmt]) -> Result<()> {
        for stmt in block {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Block(b) => self.lower_block(b),
            Stmt::Empty => Ok(()),
            Stmt::VarDecl(names) => {
                for name in names {
                    self.registry.register(name, NameType::Local, loc_of(self.arena, name.parser_node))?;
                    self.emit(op::CREATE_LOCAL_VAR);
                }
                Ok(())
            }
            Stmt::Assign { var, expr, parser_node } => {
                self.lower_expr(expr)?;
                let (kind, index) = self.registry.lookup(var, loc_of(self.arena, var.parser_node))?;
                match kind {
                    NameType::Static => {
                        self.emit(op::POP_STATIC);
                        self.emit(index as Word);
                    }
                    NameType::Local | NameType::Arg => {
                        self.emit(op::POP_LOCAL_VAR);
                        self.emit(index as Word);
                    }
                    other => {
                        return Err(ErrorKind::IllegalAssignment(
                            var.text.clone(),
                            name_type_label(other),
                            loc_of(self.arena, *parser_node),
                        )
                        .into())
                    }
                }
                Ok(())
            }
            Stmt::Return { expr } => {
                match expr {
                    Some(e) => self.lower_expr(e)?,
                    None => {
                        self.emit(op::PUSH_CONSTANT);
                        self.emit(0);
                    }
                }
                self.emit(op::RETURN);
                Ok(())
            }
            Stmt::If { cond, then_block, else_block } => {
                self.lower_expr(cond)?;
                self.emit(op::JUMP_NOT_EQUAL);
                let false_target = self.emit_placeholder();
                self.lower_block(then_block)?;
                match else_block {
                    None => self.patch_here(false_target),
                    Some(else_stmts) => {
                        self.emit(op::JUMP);
                        let end_target = self.emit_placeholder();
                        self.patch_here(false_target);
                        self.lower_block(else_stmts)?;
                        self.patch_here(end_target);
                    }
                }
                Ok(())
            }
            Stmt::While { cond, block } => {
                let loop_start = self.code.len() as Word;
                self.lower_expr(cond)?;
                self.emit(op::JUMP_NOT_EQUAL);
                let exit_target = self.emit_placeholder();
                self.lower_block(block)?;
                self.emit(op::JUMP);
                self.emit(loop_start);
                self.patch_here(exit_target);
                Ok(())
            }
            Stmt::Call { args, parser_node } => self.lower_call_or_start(args, op::CALL_SCRIPT, *parser_node),
            Stmt::Start { args, parser_node } => self.lower_call_or_start(args, op::START_SCRIPT, *parser_node),
            Stmt::Keyword { keyword, args, parser_node } => self.lower_keyword(*keyword, args, *parser_node),
            Stmt::Undef { rule_name } => {
                if self.options.strict {
                    Err(ErrorKind::InternalError(format!("unhandled parse node: {}", rule_name), None).into())
                } else {
                    log::warn!("unhandled parse node '{}', emitting placeholder", rule_name);
                    self.emit(op::BAD_OP_PLACEHOLDER);
                    Ok(())
                }
            }
        }
    }

    fn lower_call_or_start(&mut self, args: &[KeywordArg], opcode: Word, parser_node: Option<crate::parser::tree::ParseNodeId>) -> Result<()> {
        let name = match &args[0] {
            KeywordArg::Name(n) => n,
            _ => unreachable!("call/start statement's first arg is always a name"),
        };
        let (kind, index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
        if kind != NameType::Function {
            return Err(ErrorKind::UndefinedName(name.text.clone(), loc_of(self.arena, parser_node)).into());
        }
        let mut arg_count = 0;
        for arg in &args[1..] {
            if let KeywordArg::Expr(e) = arg {
                self.lower_expr(e)?;
                arg_count += 1;
            }
        }
        self.emit(opcode);
        self.emit(index as Word);
        self.emit(arg_count as Word);
        Ok(())
    }

    fn lower_keyword(&mut self, keyword: Keyword, args: &[KeywordArg], parser_node: Option<crate::parser::tree::ParseNodeId>) -> Result<()> {
        match keyword {
            Keyword::PlaySound => {
                Err(ErrorKind::Unsupported("PLAY_SOUND is not implemented by the target engine".to_string(), loc_of(self.arena, parser_node)).into())
            }
            Keyword::Move | Keyword::Turn => {
                let name = expect_name(&args[0]);
                let (_, piece_index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                let axis = expect_axis(&args[1]);
                self.lower_expr(expect_expr(&args[2]))?;
                let is_now = matches!(args.get(3), Some(KeywordArg::None));
                if let Some(KeywordArg::Expr(speed)) = args.get(3) {
                    self.lower_expr(speed)?;
                }
                let opcode = if is_now {
                    if keyword == Keyword::Move { op::MOVE_NOW } else { op::TURN_NOW }
                } else {
                    opcode_for_keyword(keyword).unwrap()
                };
                self.emit(opcode);
                self.emit(piece_index as Word);
                self.emit(axis as Word);
                Ok(())
            }
            Keyword::Spin => {
                let name = expect_name(&args[0]);
                let (_, piece_index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                let axis = expect_axis(&args[1]);
                self.lower_expr(expect_expr(&args[2]))?;
                self.emit(op::SPIN);
                self.emit(piece_index as Word);
                self.emit(axis as Word);
                Ok(())
            }
            Keyword::StopSpin => {
                let name = expect_name(&args[0]);
                let (_, piece_index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                let axis = expect_axis(&args[1]);
                if let KeywordArg::Expr(e) = &args[2] {
                    self.lower_expr(e)?;
                } else {
                    self.emit(op::PUSH_CONSTANT);
                    self.emit(0);
                }
                self.emit(op::STOP_SPIN);
                self.emit(piece_index as Word);
                self.emit(axis as Word);
                Ok(())
            }
            Keyword::WaitForTurn | Keyword::WaitForMove => {
                let name = expect_name(&args[0]);
                let (_, index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                let axis = expect_axis(&args[1]);
                self.emit(opcode_for_keyword(keyword).unwrap());
                self.emit(index as Word);
                self.emit(axis);
                Ok(())
            }
            Keyword::Set => {
                let value_idx = expect_expr(&args[0]);
                let value = expect_expr(&args[1]);
                if reverses_args(Keyword::Set) {
                    self.lower_expr(value)?;
                    self.lower_expr(value_idx)?;
                } else {
                    self.lower_expr(value_idx)?;
                    self.lower_expr(value)?;
                }
                self.emit(op::SET);
                Ok(())
            }
            Keyword::Get => {
                self.lower_expr(expect_expr(&args[0]))?;
                self.emit(op::POP_STACK);
                Ok(())
            }
            Keyword::EmitSfx | Keyword::Signal | Keyword::SetSignalMask | Keyword::Sleep => {
                self.lower_expr(expect_expr(&args[0]))?;
                self.emit(opcode_for_keyword(keyword).unwrap());
                Ok(())
            }
            Keyword::Hide | Keyword::Show => {
                let name = expect_name(&args[0]);
                let (_, index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                self.emit(opcode_for_keyword(keyword).unwrap());
                self.emit(index as Word);
                Ok(())
            }
            Keyword::Explode => {
                let name = expect_name(&args[0]);
                let (_, index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                self.lower_expr(expect_expr(&args[1]))?;
                self.emit(op::EXPLODE);
                self.emit(index as Word);
                Ok(())
            }
            Keyword::AttachUnit => {
                let piece = expect_expr(&args[0]);
                let unit = expect_expr(&args[1]);
                if reverses_args(Keyword::AttachUnit) {
                    self.lower_expr(unit)?;
                    self.lower_expr(piece)?;
                } else {
                    self.lower_expr(piece)?;
                    self.lower_expr(unit)?;
                }
                // legacy dummy third argument, always present.
                self.emit(op::PUSH_CONSTANT);
                self.emit(0);
                self.emit(op::ATTACH_UNIT);
                Ok(())
            }
            Keyword::DropUnit => {
                self.lower_expr(expect_expr(&args[0]))?;
                self.emit(op::DROP_UNIT);
                Ok(())
            }
            Keyword::Cache | Keyword::DontCache | Keyword::DontShadow | Keyword::DontShade => {
                let name = expect_name(&args[0]);
                let (_, index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                self.emit(opcode_for_keyword(keyword).unwrap());
                self.emit(index as Word);
                Ok(())
            }
            Keyword::CallScript | Keyword::StartScript | Keyword::Return | Keyword::Around | Keyword::Along
            | Keyword::To | Keyword::From | Keyword::Now | Keyword::Speed | Keyword::Accelerate
            | Keyword::Decelerate | Keyword::Type => {
                Err(ErrorKind::InternalError(format!("'{:?}' is not a statement keyword", keyword), loc_of(self.arena, parser_node)).into())
            }
        }
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Value(v) => self.lower_value_term(v),
            Expr::Unary { op: expr_op, operand } => {
                self.lower_expr(operand)?;
                self.emit(opcode_for_unary_op(*expr_op));
                Ok(())
            }
            Expr::Binary { op: expr_op, lhs, rhs } => {
                self.lower_expr(lhs)?;
                self.lower_expr(rhs)?;
                self.emit(opcode_for_binary_op(*expr_op));
                Ok(())
            }
        }
    }

    fn lower_value_term(&mut self, term: &ValueTerm) -> Result<()> {
        match term {
            ValueTerm::Constant(c) => {
                self.emit(op::PUSH_CONSTANT);
                self.emit(c.int32_value(self.arena)?);
                Ok(())
            }
            ValueTerm::VarRef(name) => {
                let (kind, index) = self.registry.lookup(name, loc_of(self.arena, name.parser_node))?;
                match kind {
                    NameType::Static => self.emit(op::PUSH_STATIC),
                    NameType::Local | NameType::Arg => self.emit(op::PUSH_LOCAL_VAR),
                    other => {
                        return Err(ErrorKind::IllegalAssignment(
                            name.text.clone(),
                            name_type_label(other),
                            loc_of(self.arena, name.parser_node),
                        )
                        .into())
                    }
                }
                self.emit(index as Word);
                Ok(())
            }
            ValueTerm::Rand { min, max } => {
                self.lower_expr(min)?;
                self.lower_expr(max)?;
                self.emit(op::RAND);
                Ok(())
            }
            ValueTerm::Get(get) => {
                self.lower_expr(&get.value_idx)?;
                if get.args.iter().any(Option::is_some) {
                    for i in 0..4 {
                        match get.args.get(i).and_then(|a| a.as_ref()) {
                            Some(e) => self.lower_expr(e)?,
                            None => {
                                self.emit(op::PUSH_CONSTANT);
                                self.emit(0);
                            }
                        }
                    }
                    self.emit(op::GET);
                } else {
                    self.emit(op::GET_UNIT_VALUE);
                }
                Ok(())
            }
        }
    }
}

fn expect_expr(arg: &KeywordArg) -> &Expr {
    match arg {
        KeywordArg::Expr(e) => e,
        other => unreachable!("expected Expr keyword arg, found {:?}", other),
    }
}

fn expect_axis(arg: &KeywordArg) -> i32 {
    match arg {
        KeywordArg::Axis(a) => a.axis as i32,
        other => unreachable!("expected Axis keyword arg, found {:?}", other),
    }
}

fn expect_name(arg: &KeywordArg) -> &Name {
    match arg {
        KeywordArg::Name(n) => n,
        other => unreachable!("expected Name keyword arg, found {:?}", other),
    }
}

fn name_type_label(kind: NameType) -> &'static str {
    match kind {
        NameType::Static => "static-var",
        NameType::Local => "local var",
        NameType::Piece => "piece",
        NameType::Function => "function",
        NameType::Arg => "argument",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_two_phase;

    fn compile(src: &str) -> ObjectFile {
        let parsed = parse_two_phase(src, "t.bos").unwrap();
        compile_file(&parsed.file, &parsed.arena, &CompileOptions::default()).unwrap()
    }

    #[test]
    fn empty_function_compiles_to_push_and_return() {
        let obj = compile("Create() {\n}\n");
        assert_eq!(obj.functions.len(), 1);
        assert_eq!(obj.code, vec![op::PUSH_CONSTANT, 0, op::RETURN]);
    }

    #[test]
    fn if_else_patches_placeholders() {
        let obj = compile("Script1() {\n  if (1 < 2) {\n    return 1;\n  } else {\n    return 0;\n  }\n}\n");
        assert!(!obj.code.contains(&op::BAD_OP_PLACEHOLDER));
    }

    #[test]
    fn name_collision_across_kinds_is_error() {
        let src = "piece Foo;\nstatic-var Foo;\nCreate() {\n}\n";
        let parsed = parse_two_phase(src, "t.bos").unwrap();
        let err = compile_file(&parsed.file, &parsed.arena, &CompileOptions::default()).unwrap_err();
        assert!(err.to_string().contains("already being used"));
    }

    #[test]
    fn move_now_uses_move_now_opcode() {
        let obj = compile("piece base;\nScript1() {\n  move base to x-axis 5 now;\n}\n");
        assert!(obj.code.contains(&op::MOVE_NOW));
        assert!(!obj.code.contains(&op::MOVE));
    }

    #[test]
    fn move_with_no_speed_suffix_also_uses_move_now() {
        // spec.md §8.3 scenario 3.
        let obj = compile("piece base;\nScript1() {\n  move base to x-axis [10];\n}\n");
        assert_eq!(
            &obj.code[..5],
            &[op::PUSH_CONSTANT, 655360, op::MOVE_NOW, 0 /* piece index of base */, 0 /* axis X */][..]
        );
    }

    #[test]
    fn move_with_speed_uses_plain_move_opcode() {
        let obj = compile("piece base;\nScript1() {\n  move base to x-axis [10] speed [1];\n}\n");
        assert!(obj.code.contains(&op::MOVE));
        assert!(!obj.code.contains(&op::MOVE_NOW));
    }

    #[test]
    fn linear_constant_scaled_by_65536() {
        let obj = compile("Script1() {\n  var x;\n  x = [1];\n}\n");
        assert!(obj.code.contains(&65536));
    }

    #[test]
    fn function_args_each_emit_create_local_var() {
        let obj = compile("Script1(heading) {\n  return heading;\n}\n");
        assert_eq!(obj.code[0], op::CREATE_LOCAL_VAR);
    }

    #[test]
    fn explicit_trailing_return_is_not_duplicated() {
        let obj = compile("Create() {\n  return 0;\n}\n");
        assert_eq!(obj.code, vec![op::PUSH_CONSTANT, 0, op::RETURN]);
    }

    #[test]
    fn get_with_all_null_args_emits_get_unit_value() {
        let obj = compile("Script1() {\n  var x;\n  x = get(1);\n}\n");
        assert!(obj.code.contains(&op::GET_UNIT_VALUE));
        assert!(!obj.code.contains(&op::GET));
    }

    #[test]
    fn get_with_an_argument_emits_get() {
        let obj = compile("Script1() {\n  var x;\n  x = get(1, 2);\n}\n");
        assert!(obj.code.contains(&op::GET));
        assert!(!obj.code.contains(&op::GET_UNIT_VALUE));
    }
}
