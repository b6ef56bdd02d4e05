//! The typed AST model (spec §3). Nodes are plain tagged enums/structs, not
//! a virtual-dispatch hierarchy, so the lowerer's `match` is exhaustive and
//! unhandled kinds are compile errors (Design Notes §9).

use crate::parser::tree::ParseNodeId;

/// A name compares and hashes case-insensitively, but keeps its original
/// spelling for diagnostics. Grounded on `NameNode.__eq__`/`__hash__` in
/// `original_source/bos/ast_nodes.py`.
#[derive(Debug, Clone)]
pub struct Name {
    pub text: String,
    pub parser_node: Option<ParseNodeId>,
}

impl Name {
    pub fn new(text: impl Into<String>, parser_node: Option<ParseNodeId>) -> Self {
        Name { text: text.into(), parser_node }
    }

    pub fn lowered(&self) -> String {
        self.text.to_lowercase()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.lowered() == other.lowered()
    }
}
impl Eq for Name {}

impl std::hash::Hash for Name {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lowered().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEnum {
    X = 0,
    Y = 1,
    Z = 2,
}

impl AxisEnum {
    pub fn parse_axis_name(s: &str) -> Option<Self> {
        match s.chars().next()?.to_ascii_lowercase() {
            'x' => Some(AxisEnum::X),
            'y' => Some(AxisEnum::Y),
            'z' => Some(AxisEnum::Z),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Turn,
    Around,
    Move,
    Along,
    To,
    From,
    Now,
    Speed,
    Spin,
    Accelerate,
    StopSpin,
    Decelerate,
    WaitForTurn,
    WaitForMove,
    Set,
    Get,
    CallScript,
    StartScript,
    EmitSfx,
    Sleep,
    Hide,
    Show,
    Explode,
    Type,
    Signal,
    SetSignalMask,
    AttachUnit,
    DropUnit,
    Return,
    Cache,
    DontCache,
    DontShadow,
    DontShade,
    PlaySound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionOp {
    Mult,
    Div,
    Mod,
    Add,
    Minus,
    CompLess,
    CompLessEqual,
    CompGreater,
    CompGreaterEqual,
    CompEqual,
    CompNotEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    LogicalNot,
}

/// Distinguished at parse time by literal bracketing (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstScale {
    Normal,
    /// `[...]`, multiplied by 65536 on emission.
    Linear,
    /// `<...>`, multiplied by 182 on emission.
    Angular,
}

#[derive(Debug, Clone, Copy)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct Constant {
    pub base_value: NumberValue,
    pub scale: ConstScale,
    pub parser_node: Option<ParseNodeId>,
}

impl Constant {
    pub const LINEAR_SCALE: i64 = 65536;
    pub const ANGULAR_SCALE: i64 = 182;

    pub fn int_normal(value: i64, parser_node: Option<ParseNodeId>) -> Self {
        Constant { base_value: NumberValue::Int(value), scale: ConstScale::Normal, parser_node }
    }

    /// `scale * base`, as an exact (non-rounded) `f64` product.
    pub fn number_value(&self) -> f64 {
        let base = match self.base_value {
            NumberValue::Int(i) => i as f64,
            NumberValue::Float(f) => f,
        };
        match self.scale {
            ConstScale::Normal => base,
            ConstScale::Linear => base * Self::LINEAR_SCALE as f64,
            ConstScale::Angular => base * Self::ANGULAR_SCALE as f64,
        }
    }

    fn is_float(&self) -> bool {
        matches!(self.base_value, NumberValue::Float(_))
    }

    /// Round to nearest, then fit into a signed 32-bit slot (spec §3):
    /// values in `(2^31-1, 2^32-1]` are rebased into the negative range.
    pub fn int32_value(&self, arena: &crate::parser::tree::ParseArena) -> crate::errors::Result<i32> {
        let number_value = self.number_value();
        let int_value = number_value.round() as i128;

        if !(-0x8000_0000i128..=0xFFFF_FFFFi128).contains(&int_value) {
            return Err(crate::errors::ErrorKind::NumericOverflow(
                format!("{:?}", self.base_value),
                crate::diagnostics::location_of(arena, self.parser_node),
            )
            .into());
        }

        let mut int_value = int_value;
        if int_value > 0x7FFF_FFFFi128 {
            int_value -= 0x1_0000_0000i128;
            if self.is_float() {
                log::warn!(
                    "converted float constant {:?} (computed: {}) to very large negative int {}",
                    self.base_value,
                    number_value,
                    int_value
                );
            }
        }

        Ok(int_value as i32)
    }
}

#[derive(Debug, Clone)]
pub enum ValueTerm {
    Constant(Constant),
    VarRef(Name),
    Rand { min: Box<Expr>, max: Box<Expr> },
    Get(Box<GetCall>),
}

#[derive(Debug, Clone)]
pub struct GetCall {
    pub value_idx: Expr,
    /// Trailing auxiliary arguments; absent ones become `None` rather than
    /// being silently dropped, so the lowerer can push a literal `0` in
    /// their place (spec §4.3).
    pub args: Vec<Option<Expr>>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Unary { op: ExpressionOp, operand: Box<Expr> },
    Binary { op: ExpressionOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Value(Box<ValueTerm>),
}

#[derive(Debug, Clone)]
pub struct Axis {
    pub axis: AxisEnum,
}

/// A statement-level argument: an expression, an axis, a bare name (resolved
/// by the lowerer, not pushed onto the stack), or an absent trailing arg.
#[derive(Debug, Clone)]
pub enum KeywordArg {
    Expr(Expr),
    Axis(Axis),
    Name(Name),
    None,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Keyword { keyword: Keyword, args: Vec<KeywordArg>, parser_node: Option<ParseNodeId> },
    Call { args: Vec<KeywordArg>, parser_node: Option<ParseNodeId> },
    Start { args: Vec<KeywordArg>, parser_node: Option<ParseNodeId> },
    VarDecl(Vec<Name>),
    If { cond: Expr, then_block: Vec<Stmt>, else_block: Option<Vec<Stmt>> },
    While { cond: Expr, block: Vec<Stmt> },
    Assign { var: Name, expr: Expr, parser_node: Option<ParseNodeId> },
    Return { expr: Option<Expr> },
    Empty,
    /// An unrecognized parse node; carries the parser rule name for
    /// diagnostics. Reaching conversion produces this, and a warning is
    /// logged at the point of creation (spec §4.3).
    Undef { rule_name: String },
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Name,
    pub args: Vec<Name>,
    pub block: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Piece(Vec<Name>),
    StaticVar(Vec<Name>),
    Func(FuncDecl),
}

#[derive(Debug, Clone)]
pub struct File {
    pub declarations: Vec<Decl>,
}
