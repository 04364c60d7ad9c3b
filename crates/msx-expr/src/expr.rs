use crate::error::ExprError;
use crate::opcode::{Func, Opcode};
use crate::var::VarRef;

/// A tokenized, side-effect-free reaction expression.
///
/// Built once (by `msx-input`'s parser) from a flat postfix opcode stream,
/// then evaluated many times per run. Construction validates that the stream
/// is a well-formed postfix program and records the peak operand-stack depth
/// so evaluation never reallocates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MathExpr {
    ops: Vec<Opcode>,
    depth: usize,
}

impl MathExpr {
    /// Validate `ops` as a postfix program and wrap it.
    ///
    /// A program is well-formed when every opcode finds enough operands
    /// already on the stack and exactly one value remains at the end.
    pub fn from_postfix(ops: Vec<Opcode>) -> Result<Self, ExprError> {
        if ops.is_empty() {
            return Err(ExprError::StackUnderflow);
        }
        let mut depth: i32 = 0;
        let mut peak: i32 = 0;
        for op in &ops {
            if depth < op.arity() as i32 {
                return Err(ExprError::StackUnderflow);
            }
            depth += op.stack_delta();
            peak = peak.max(depth);
        }
        if depth != 1 {
            return Err(ExprError::StackUnderflow);
        }
        Ok(Self {
            ops,
            depth: peak as usize,
        })
    }

    pub fn opcodes(&self) -> &[Opcode] {
        &self.ops
    }

    /// Evaluate against a variable resolver. Reentrant and side-effect-free;
    /// `resolve` may itself call back into the chemistry engine (e.g. to run
    /// a Newton solve for an equilibrium species) without corrupting this
    /// expression's own scratch state, since the stack lives entirely on
    /// this call's frame.
    pub fn eval(
        &self,
        resolve: &mut dyn FnMut(VarRef) -> Result<f64, ExprError>,
    ) -> Result<f64, ExprError> {
        let mut stack: Vec<f64> = Vec::with_capacity(self.depth);
        for op in &self.ops {
            match *op {
                Opcode::PushConst(v) => stack.push(v),
                Opcode::PushVar(v) => stack.push(resolve(v)?),
                Opcode::Add => {
                    let b = pop(&mut stack)?;
                    let a = pop(&mut stack)?;
                    stack.push(finite(a + b)?);
                }
                Opcode::Sub => {
                    let b = pop(&mut stack)?;
                    let a = pop(&mut stack)?;
                    stack.push(finite(a - b)?);
                }
                Opcode::Mul => {
                    let b = pop(&mut stack)?;
                    let a = pop(&mut stack)?;
                    stack.push(finite(a * b)?);
                }
                Opcode::Div => {
                    let b = pop(&mut stack)?;
                    let a = pop(&mut stack)?;
                    if b == 0.0 {
                        return Err(ExprError::DivideByZero);
                    }
                    stack.push(finite(a / b)?);
                }
                Opcode::Neg => {
                    let a = pop(&mut stack)?;
                    stack.push(-a);
                }
                Opcode::Pow => {
                    let b = pop(&mut stack)?;
                    let a = pop(&mut stack)?;
                    if a < 0.0 && b.fract() != 0.0 {
                        return Err(ExprError::NegativeBasePow);
                    }
                    stack.push(finite(a.powf(b))?);
                }
                Opcode::Call(func) => {
                    let a = pop(&mut stack)?;
                    stack.push(apply(func, a)?);
                }
            }
        }
        pop(&mut stack)
    }

    /// Reconstruct a readable (fully parenthesized) form of the expression,
    /// naming variables via the supplied callback. Used for diagnostics and
    /// report headers, not re-parsed.
    pub fn format(&self, name_var: &mut dyn FnMut(VarRef) -> String) -> Result<String, ExprError> {
        let mut stack: Vec<String> = Vec::with_capacity(self.depth);
        for op in &self.ops {
            match *op {
                Opcode::PushConst(v) => stack.push(format!("{v}")),
                Opcode::PushVar(v) => stack.push(name_var(v)),
                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Pow => {
                    let b = pop_str(&mut stack)?;
                    let a = pop_str(&mut stack)?;
                    let sym = match op {
                        Opcode::Add => "+",
                        Opcode::Sub => "-",
                        Opcode::Mul => "*",
                        Opcode::Div => "/",
                        Opcode::Pow => "^",
                        _ => unreachable!(),
                    };
                    stack.push(format!("({a} {sym} {b})"));
                }
                Opcode::Neg => {
                    let a = pop_str(&mut stack)?;
                    stack.push(format!("(-{a})"));
                }
                Opcode::Call(func) => {
                    let a = pop_str(&mut stack)?;
                    stack.push(format!("{}({a})", func.name()));
                }
            }
        }
        pop_str(&mut stack)
    }
}

fn pop(stack: &mut Vec<f64>) -> Result<f64, ExprError> {
    stack.pop().ok_or(ExprError::StackUnderflow)
}

fn pop_str(stack: &mut Vec<String>) -> Result<String, ExprError> {
    stack.pop().ok_or(ExprError::StackUnderflow)
}

fn finite(v: f64) -> Result<f64, ExprError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ExprError::NonFinite)
    }
}

fn apply(func: Func, a: f64) -> Result<f64, ExprError> {
    let v = match func {
        Func::Exp => a.exp(),
        Func::Log => {
            if a <= 0.0 {
                return Err(ExprError::LogOfNonPositive);
            }
            a.ln()
        }
        Func::Log10 => {
            if a <= 0.0 {
                return Err(ExprError::LogOfNonPositive);
            }
            a.log10()
        }
        Func::Sqrt => {
            if a < 0.0 {
                return Err(ExprError::NegativeBasePow);
            }
            a.sqrt()
        }
        Func::Sin => a.sin(),
        Func::Cos => a.cos(),
        Func::Tan => a.tan(),
        Func::Cot => 1.0 / a.tan(),
        Func::Sinh => a.sinh(),
        Func::Cosh => a.cosh(),
        Func::Tanh => a.tanh(),
        Func::Coth => 1.0 / a.tanh(),
        Func::Abs => a.abs(),
        Func::Sign => msx_core::sgn(a),
        Func::Step => {
            if a > 0.0 {
                1.0
            } else {
                0.0
            }
        }
    };
    finite(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use msx_core::ConstId;

    fn id(i: u32) -> ConstId {
        ConstId::from_index(i)
    }

    #[test]
    fn evaluates_simple_arithmetic() {
        // (2 + 3) * 4
        let expr = MathExpr::from_postfix(vec![
            Opcode::PushConst(2.0),
            Opcode::PushConst(3.0),
            Opcode::Add,
            Opcode::PushConst(4.0),
            Opcode::Mul,
        ])
        .unwrap();
        let v = expr.eval(&mut |_| unreachable!()).unwrap();
        assert_eq!(v, 20.0);
    }

    #[test]
    fn resolves_variables() {
        let c = id(0);
        let expr = MathExpr::from_postfix(vec![
            Opcode::PushVar(VarRef::Const(c)),
            Opcode::PushConst(2.0),
            Opcode::Pow,
        ])
        .unwrap();
        let v = expr
            .eval(&mut |var| match var {
                VarRef::Const(got) if got == c => Ok(3.0),
                _ => panic!("unexpected var"),
            })
            .unwrap();
        assert_eq!(v, 9.0);
    }

    #[test]
    fn divide_by_zero_is_illegal_math() {
        let expr = MathExpr::from_postfix(vec![
            Opcode::PushConst(1.0),
            Opcode::PushConst(0.0),
            Opcode::Div,
        ])
        .unwrap();
        let err = expr.eval(&mut |_| unreachable!()).unwrap_err();
        assert_eq!(err, ExprError::DivideByZero);
    }

    #[test]
    fn log_of_non_positive_is_illegal_math() {
        let expr = MathExpr::from_postfix(vec![Opcode::PushConst(-1.0), Opcode::Call(Func::Log)])
            .unwrap();
        let err = expr.eval(&mut |_| unreachable!()).unwrap_err();
        assert_eq!(err, ExprError::LogOfNonPositive);
    }

    #[test]
    fn negative_base_noninteger_power_is_illegal_math() {
        let expr = MathExpr::from_postfix(vec![
            Opcode::PushConst(-2.0),
            Opcode::PushConst(0.5),
            Opcode::Pow,
        ])
        .unwrap();
        let err = expr.eval(&mut |_| unreachable!()).unwrap_err();
        assert_eq!(err, ExprError::NegativeBasePow);
    }

    #[test]
    fn malformed_postfix_is_rejected_at_construction() {
        let err = MathExpr::from_postfix(vec![Opcode::Add]).unwrap_err();
        assert_eq!(err, ExprError::StackUnderflow);

        let err = MathExpr::from_postfix(vec![Opcode::PushConst(1.0), Opcode::PushConst(2.0)])
            .unwrap_err();
        assert_eq!(err, ExprError::StackUnderflow);
    }

    #[test]
    fn formats_readable_string() {
        let expr = MathExpr::from_postfix(vec![
            Opcode::PushConst(1.0),
            Opcode::PushConst(2.0),
            Opcode::Add,
        ])
        .unwrap();
        let s = expr.format(&mut |_| unreachable!()).unwrap();
        assert_eq!(s, "(1 + 2)");
    }
}
