//! Bytecode opcode numbering (spec §6) and the per-opcode metadata the
//! lowerer needs (the `SET`/`ATTACH_UNIT` argument-reversal quirk), grounded
//! on `original_source/cob/opcodes.py`.

use crate::ast::{ExpressionOp, Keyword};

pub type Word = i32;

#[allow(non_snake_case)]
pub mod op {
    use super::Word;

    pub const MOVE: Word = 0x1000_1000u32 as Word;
    pub const TURN: Word = 0x1000_2000u32 as Word;
    pub const SPIN: Word = 0x1000_3000u32 as Word;
    pub const STOP_SPIN: Word = 0x1000_4000u32 as Word;
    pub const SHOW: Word = 0x1000_5000u32 as Word;
    pub const HIDE: Word = 0x1000_6000u32 as Word;
    pub const CACHE: Word = 0x1000_7000u32 as Word;
    pub const DONT_CACHE: Word = 0x1000_8000u32 as Word;
    pub const MOVE_NOW: Word = 0x1000_B000u32 as Word;
    pub const TURN_NOW: Word = 0x1000_C000u32 as Word;
    pub const SHADE: Word = 0x1000_D000u32 as Word;
    pub const DONT_SHADE: Word = 0x1000_E000u32 as Word;
    pub const EMIT_SFX: Word = 0x1000_F000u32 as Word;

    pub const WAIT_FOR_TURN: Word = 0x1001_1000u32 as Word;
    pub const WAIT_FOR_MOVE: Word = 0x1001_2000u32 as Word;
    pub const SLEEP: Word = 0x1001_3000u32 as Word;

    pub const PUSH_CONSTANT: Word = 0x1002_1001u32 as Word;
    pub const PUSH_LOCAL_VAR: Word = 0x1002_1002u32 as Word;
    pub const PUSH_STATIC: Word = 0x1002_1004u32 as Word;
    pub const CREATE_LOCAL_VAR: Word = 0x1002_2000u32 as Word;
    pub const POP_LOCAL_VAR: Word = 0x1002_3002u32 as Word;
    pub const POP_STATIC: Word = 0x1002_3004u32 as Word;
    pub const POP_STACK: Word = 0x1002_4000u32 as Word;

    pub const ADD: Word = 0x1003_1000u32 as Word;
    pub const SUB: Word = 0x1003_2000u32 as Word;
    pub const MUL: Word = 0x1003_3000u32 as Word;
    pub const DIV: Word = 0x1003_4000u32 as Word;
    pub const MOD: Word = 0x1003_4001u32 as Word;
    pub const AND: Word = 0x1003_5000u32 as Word;
    pub const OR: Word = 0x1003_6000u32 as Word;
    pub const XOR: Word = 0x1003_7000u32 as Word;
    pub const NOT: Word = 0x1003_8000u32 as Word;

    pub const RAND: Word = 0x1004_1000u32 as Word;
    pub const GET_UNIT_VALUE: Word = 0x1004_2000u32 as Word;
    pub const GET: Word = 0x1004_3000u32 as Word;

    pub const SET_LESS: Word = 0x1005_1000u32 as Word;
    pub const SET_LESS_OR_EQUAL: Word = 0x1005_2000u32 as Word;
    pub const SET_GREATER: Word = 0x1005_3000u32 as Word;
    pub const SET_GREATER_OR_EQUAL: Word = 0x1005_4000u32 as Word;
    pub const SET_EQUAL: Word = 0x1005_5000u32 as Word;
    pub const SET_NOT_EQUAL: Word = 0x1005_6000u32 as Word;
    pub const LOGICAL_AND: Word = 0x1005_7000u32 as Word;
    pub const LOGICAL_OR: Word = 0x1005_8000u32 as Word;
    pub const LOGICAL_XOR: Word = 0x1005_9000u32 as Word;
    pub const LOGICAL_NOT: Word = 0x1005_A000u32 as Word;

    pub const START_SCRIPT: Word = 0x1006_1000u32 as Word;
    pub const CALL_SCRIPT: Word = 0x1006_2000u32 as Word;
    pub const JUMP: Word = 0x1006_4000u32 as Word;
    pub const RETURN: Word = 0x1006_5000u32 as Word;
    pub const JUMP_NOT_EQUAL: Word = 0x1006_6000u32 as Word;
    pub const SIGNAL: Word = 0x1006_7000u32 as Word;
    pub const SET_SIGNAL_MASK: Word = 0x1006_8000u32 as Word;

    pub const EXPLODE: Word = 0x1007_1000u32 as Word;
    pub const PLAY_SOUND: Word = 0x1007_2000u32 as Word;

    pub const SET: Word = 0x1008_2000u32 as Word;
    pub const ATTACH_UNIT: Word = 0x1008_3000u32 as Word;
    pub const DROP_UNIT: Word = 0x1008_4000u32 as Word;

    /// Only ever appears in transient code buffers (unresolved jump
    /// placeholders, or unhandled-node sentinels in non-strict mode); must
    /// never survive to the final object file.
    pub const BAD_OP_PLACEHOLDER: Word = -0x8000_0000;
}

/// Maps a statement keyword to its opcode, where one exists directly
/// (`GET`, `MOVE`/`TURN` without a trailing speed argument, and
/// `CALL_SCRIPT`/`START_SCRIPT` are handled by the lowerer directly and are
/// not represented here).
pub fn opcode_for_keyword(keyword: Keyword) -> Option<Word> {
    use Keyword::*;
    Some(match keyword {
        Turn => op::TURN,
        Move => op::MOVE,
        Spin => op::SPIN,
        StopSpin => op::STOP_SPIN,
        WaitForTurn => op::WAIT_FOR_TURN,
        WaitForMove => op::WAIT_FOR_MOVE,
        Set => op::SET,
        Get => op::GET,
        CallScript => op::CALL_SCRIPT,
        StartScript => op::START_SCRIPT,
        EmitSfx => op::EMIT_SFX,
        Sleep => op::SLEEP,
        Hide => op::HIDE,
        Show => op::SHOW,
        Explode => op::EXPLODE,
        Signal => op::SIGNAL,
        SetSignalMask => op::SET_SIGNAL_MASK,
        AttachUnit => op::ATTACH_UNIT,
        DropUnit => op::DROP_UNIT,
        Return => op::RETURN,
        Cache => op::CACHE,
        DontCache => op::DONT_CACHE,
        DontShadow | DontShade => op::DONT_SHADE,
        PlaySound => op::PLAY_SOUND,
        _ => return None,
    })
}

pub fn opcode_for_binary_op(expr_op: ExpressionOp) -> Word {
    use ExpressionOp::*;
    match expr_op {
        Mult => op::MUL,
        Div => op::DIV,
        Mod => op::MOD,
        Add => op::ADD,
        Minus => op::SUB,
        CompLess => op::SET_LESS,
        CompLessEqual => op::SET_LESS_OR_EQUAL,
        CompGreater => op::SET_GREATER,
        CompGreaterEqual => op::SET_GREATER_OR_EQUAL,
        CompEqual => op::SET_EQUAL,
        CompNotEqual => op::SET_NOT_EQUAL,
        BitwiseAnd => op::AND,
        BitwiseOr => op::OR,
        BitwiseXor => op::XOR,
        LogicalAnd => op::LOGICAL_AND,
        LogicalOr => op::LOGICAL_OR,
        LogicalXor => op::LOGICAL_XOR,
        LogicalNot => op::LOGICAL_NOT,
    }
}

pub fn opcode_for_unary_op(expr_op: ExpressionOp) -> Word {
    match expr_op {
        ExpressionOp::LogicalNot => op::LOGICAL_NOT,
        other => opcode_for_binary_op(other),
    }
}

/// A documented quirk of the target runtime: the interpreter expects
/// `SET`'s and `ATTACH_UNIT`'s arguments in the reverse of source order.
pub fn reverses_args(keyword: Keyword) -> bool {
    matches!(keyword, Keyword::Set | Keyword::AttachUnit)
}
