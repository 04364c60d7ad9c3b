use crate::var::VarRef;

/// Named functions available to a reaction expression (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Func {
    Exp,
    Log,
    Log10,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Cot,
    Sinh,
    Cosh,
    Tanh,
    Coth,
    Abs,
    Sign,
    Step,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Log10 => "log10",
            Func::Sqrt => "sqrt",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Cot => "cot",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Coth => "coth",
            Func::Abs => "abs",
            Func::Sign => "sign",
            Func::Step => "step",
        }
    }

    /// Reverse of [`Func::name`], case-insensitive. Used by an expression
    /// parser to recognize a function-call token.
    pub fn from_name(name: &str) -> Option<Self> {
        const ALL: [Func; 15] = [
            Func::Exp,
            Func::Log,
            Func::Log10,
            Func::Sqrt,
            Func::Sin,
            Func::Cos,
            Func::Tan,
            Func::Cot,
            Func::Sinh,
            Func::Cosh,
            Func::Tanh,
            Func::Coth,
            Func::Abs,
            Func::Sign,
            Func::Step,
        ];
        ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

/// One entry in a flat postfix opcode stream (spec §9 "MathExpr" design
/// note). Binary operators and unary functions pop their operands off the
/// evaluator's stack in the order they were pushed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    PushConst(f64),
    PushVar(VarRef),
    Add,
    Sub,
    Mul,
    Div,
    /// Unary negation.
    Neg,
    Pow,
    Call(Func),
}

impl Opcode {
    /// Net change in operand-stack depth this opcode causes.
    pub fn stack_delta(self) -> i32 {
        match self {
            Opcode::PushConst(_) | Opcode::PushVar(_) => 1,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Pow => -1,
            Opcode::Neg | Opcode::Call(_) => 0,
        }
    }

    /// Number of operands this opcode pops.
    pub fn arity(self) -> usize {
        match self {
            Opcode::PushConst(_) | Opcode::PushVar(_) => 0,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Pow => 2,
            Opcode::Neg | Opcode::Call(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_case_insensitive_inverse_of_name() {
        assert_eq!(Func::from_name("SQRT"), Some(Func::Sqrt));
        assert_eq!(Func::from_name("Log10"), Some(Func::Log10));
        assert_eq!(Func::from_name("bogus"), None);
    }
}
