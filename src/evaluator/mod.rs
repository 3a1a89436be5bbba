mod builtins;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::environment::Environment;
use crate::object::{HashPair, Value};

pub use builtins::{lookup_builtin, table};

pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>) -> Value {
    match eval_statements(&program.statements, env) {
        Ok(value) => value,
        Err(error) => error,
    }
}

// A return only halts this statement list; it does not unwind past it on
// its own. Nesting is what propagates it further: a block's own Return
// statement bubbles up through its caller's `?`, and that caller's
// eval_statements sees Statement::Return in its own list and halts too.
fn eval_statements(statements: &[Statement], env: &Rc<RefCell<Environment>>) -> Result<Value, Value> {
    let mut result = Value::Null;
    for statement in statements {
        result = eval_statement(statement, env)?;
        if matches!(statement, Statement::Return(_)) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_statement(statement: &Statement, env: &Rc<RefCell<Environment>>) -> Result<Value, Value> {
    match statement {
        Statement::Let(stmt) => {
            let value = eval_expression(&stmt.value, env).map_err(|cause| {
                Value::wrap_error(
                    format!("error evaluating expression for variable '{}'", stmt.name.name),
                    cause,
                )
            })?;
            env.borrow_mut()
                .create(&stmt.name.name, value)
                .map_err(Value::error)?;
            Ok(Value::Null)
        }
        Statement::Return(stmt) => match &stmt.value {
            Some(expr) => eval_expression(expr, env)
                .map_err(|cause| Value::wrap_error("error evaluating return expression", cause)),
            None => Ok(Value::Null),
        },
        Statement::ExpressionStatement(stmt) => eval_expression(&stmt.expr, env),
        Statement::Block(block) => eval_statements(&block.statements, env)
            .map_err(|cause| Value::wrap_error("error evaluating block statement", cause)),
    }
}

fn eval_expression(expression: &Expression, env: &Rc<RefCell<Environment>>) -> Result<Value, Value> {
    match expression {
        Expression::IntLit(lit) => lit
            .literal
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| Value::error(format!("could not parse {:?} as integer", lit.literal))),
        Expression::BoolLit(lit) => Ok(Value::Boolean(lit.value)),
        Expression::StringLit(lit) => Ok(Value::String(lit.value.clone().into_bytes())),
        Expression::Identifier(ident) => env
            .borrow()
            .get(&ident.name)
            .ok_or_else(|| Value::error(format!("unknown identifier: {}", ident.name))),
        Expression::Prefix(node) => {
            let operand = eval_expression(&node.operand, env)?;
            eval_prefix(node.operator, operand)
        }
        Expression::Infix(node) => {
            let left = eval_expression(&node.left, env)?;
            let right = eval_expression(&node.right, env)
                .map_err(|cause| Value::wrap_error("failed to evaluate infix right expression", cause))?;
            eval_infix(node.operator, left, right)
        }
        Expression::If(node) => {
            let branch_env = Environment::new_enclosed(env.clone());

            for (condition, block) in node.conditions.iter().zip(&node.blocks) {
                if let Value::Boolean(true) = eval_expression(condition, env)? {
                    return eval_statements(&block.statements, &branch_env);
                }
            }

            if node.blocks.len() > node.conditions.len() {
                let else_block = node.blocks.last().expect("trailing else block");
                return eval_statements(&else_block.statements, &branch_env);
            }

            Ok(Value::Null)
        }
        Expression::Function(node) => Ok(Value::Function {
            params: node.params.clone(),
            body: node.body.clone(),
            captured: env.clone(),
        }),
        Expression::Call(node) => eval_call(node, env),
        Expression::Array(node) => {
            let mut elements = Vec::with_capacity(node.elements.len());
            for element in &node.elements {
                elements.push(eval_expression(element, env)?);
            }
            Ok(Value::Array(elements))
        }
        Expression::Index(node) => {
            let container = eval_expression(&node.container, env)?;
            let index = eval_expression(&node.index, env)?;
            eval_index(container, index)
        }
        Expression::Hash(node) => {
            let mut pairs = std::collections::HashMap::new();
            for entry in &node.entries {
                let key = eval_expression(&entry.key, env)?;
                let hash_key = key
                    .hash_key()
                    .ok_or_else(|| Value::error(format!("unusable as hash key: {}", key.type_name())))?;
                let value = eval_expression(&entry.value, env)?;
                pairs.insert(hash_key, HashPair { key, value });
            }
            Ok(Value::Hash(pairs))
        }
    }
}

fn eval_prefix(operator: PrefixOperator, operand: Value) -> Result<Value, Value> {
    match (operator, operand) {
        (PrefixOperator::Minus, Value::Integer(value)) => value
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| Value::error("integer overflow negating i64::MIN")),
        (PrefixOperator::Increment, Value::Integer(value)) => value
            .checked_add(1)
            .map(Value::Integer)
            .ok_or_else(|| Value::error("integer overflow in prefix ++")),
        (PrefixOperator::Decrement, Value::Integer(value)) => value
            .checked_sub(1)
            .map(Value::Integer)
            .ok_or_else(|| Value::error("integer overflow in prefix --")),
        (PrefixOperator::Bang, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
        (operator, operand) => Err(Value::error(format!(
            "unknown operator: {operator}{}",
            operand.type_name()
        ))),
    }
}

fn eval_infix(operator: InfixOperator, left: Value, right: Value) -> Result<Value, Value> {
    use InfixOperator::*;

    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => match operator {
            Plus => Ok(Value::Integer(left.wrapping_add(right))),
            Minus => Ok(Value::Integer(left.wrapping_sub(right))),
            Asterisk => Ok(Value::Integer(left.wrapping_mul(right))),
            Slash => {
                if right == 0 {
                    Err(Value::error("division by zero"))
                } else {
                    Ok(Value::Integer(left / right))
                }
            }
            Percent => {
                if right == 0 {
                    Err(Value::error("modulo by zero"))
                } else {
                    Ok(Value::Integer(left % right))
                }
            }
            LessThan => Ok(Value::Boolean(left < right)),
            LessOrEqual => Ok(Value::Boolean(left <= right)),
            GreaterThan => Ok(Value::Boolean(left > right)),
            GreaterOrEqual => Ok(Value::Boolean(left >= right)),
            Equal => Ok(Value::Boolean(left == right)),
            NotEqual => Ok(Value::Boolean(left != right)),
            Ampersand => Ok(Value::Integer(left & right)),
            Pipe => Ok(Value::Integer(left | right)),
            And | Or => Err(Value::error(format!("unknown operator: Integer {operator} Integer"))),
        },
        (Value::Boolean(left), Value::Boolean(right)) => match operator {
            Equal => Ok(Value::Boolean(left == right)),
            NotEqual => Ok(Value::Boolean(left != right)),
            And => Ok(Value::Boolean(left && right)),
            Or => Ok(Value::Boolean(left || right)),
            _ => Err(Value::error(format!("unknown operator: Boolean {operator} Boolean"))),
        },
        (Value::String(left), Value::String(right)) => match operator {
            Equal => Ok(Value::Boolean(left == right)),
            NotEqual => Ok(Value::Boolean(left != right)),
            Plus => Ok(Value::String([left, right].concat())),
            _ => Err(Value::error(format!("unknown operator: String {operator} String"))),
        },
        (left, right) => Err(Value::error(format!(
            "type mismatch: {} {operator} {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn eval_call(node: &crate::ast::Call, env: &Rc<RefCell<Environment>>) -> Result<Value, Value> {
    let callee = env
        .borrow()
        .get(&node.callee.name)
        .ok_or_else(|| Value::error(format!("unknown function: {}", node.callee.name)))?;

    match callee {
        Value::Function { params, body, captured } => {
            if node.args.len() != params.len() {
                return Err(Value::error(format!(
                    "incorrect number of arguments: expected {}, got {}",
                    params.len(),
                    node.args.len()
                )));
            }

            let call_env = Environment::new_enclosed(captured);
            for (param, arg) in params.iter().zip(&node.args) {
                let value = eval_expression(arg, env)?;
                call_env
                    .borrow_mut()
                    .create(&param.name, value)
                    .map_err(Value::error)?;
            }

            eval_statements(&body.statements, &call_env)
        }
        Value::Builtin(builtin) => {
            let mut args = Vec::with_capacity(node.args.len());
            for arg in &node.args {
                args.push(eval_expression(arg, env)?);
            }
            (builtin.func)(env, &args)
        }
        other => Err(Value::error(format!("not callable: {}", other.type_name()))),
    }
}

fn eval_index(container: Value, index: Value) -> Result<Value, Value> {
    match index {
        Value::Integer(i) => match container {
            Value::Array(elements) => {
                if i < 0 || i as usize >= elements.len() {
                    return Err(Value::error(format!("index out of range: {i}")));
                }
                Ok(elements[i as usize].clone())
            }
            Value::String(bytes) => {
                if i < 0 || i as usize >= bytes.len() {
                    return Err(Value::error(format!("index out of range: {i}")));
                }
                Ok(Value::String(vec![bytes[i as usize]]))
            }
            Value::Hash(pairs) => lookup_hash(&pairs, &Value::Integer(i)),
            other => Err(Value::error(format!("unindexable data type: {}", other.type_name()))),
        },
        Value::Boolean(b) => match container {
            Value::Hash(pairs) => lookup_hash(&pairs, &Value::Boolean(b)),
            other => Err(Value::error(format!("unindexable data type: {}", other.type_name()))),
        },
        Value::String(_) => match container {
            Value::Hash(pairs) => lookup_hash(&pairs, &index),
            other => Err(Value::error(format!("unindexable data type: {}", other.type_name()))),
        },
        other => Err(Value::error(format!(
            "unsupported index data type: {}",
            other.type_name()
        ))),
    }
}

fn lookup_hash(pairs: &std::collections::HashMap<crate::object::HashKey, HashPair>, key: &Value) -> Result<Value, Value> {
    let hash_key = key
        .hash_key()
        .expect("caller only passes Integer, Boolean, or String keys");
    match pairs.get(&hash_key) {
        Some(pair) => Ok(pair.value.clone()),
        None => Ok(Value::Null),
    }
}

// Shared by the filter/map/reduce built-ins, which invoke a Value::Function
// with already-evaluated arguments rather than a Call expression's args.
pub(crate) fn call_function(
    params: &[crate::ast::Identifier],
    body: &crate::ast::Block,
    enclosing: &Rc<RefCell<Environment>>,
    args: &[Value],
) -> Result<Value, Value> {
    if args.len() != params.len() {
        return Err(Value::error(format!(
            "incorrect number of arguments: expected {}, got {}",
            params.len(),
            args.len()
        )));
    }

    let call_env = Environment::new_enclosed(enclosing.clone());
    for (param, arg) in params.iter().zip(args) {
        call_env
            .borrow_mut()
            .create(&param.name, arg.clone())
            .map_err(Value::error)?;
    }

    eval_statements(&body.statements, &call_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval_source(source: &str) -> Value {
        let (program, errors) = Parser::new(Lexer::new(source)).parse_program();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let env = Environment::new();
        for (name, builtin) in builtins::table() {
            env.borrow_mut().create(name, Value::Builtin(builtin)).unwrap();
        }
        eval_program(&program, &env)
    }

    #[test]
    fn let_bindings_and_arithmetic() {
        let value = eval_source("let a = 5; let b = a; let c = a + b + 5; c;");
        assert_eq!(value, Value::Integer(15));
    }

    #[test]
    fn else_if_chain_selects_the_matching_branch() {
        let value = eval_source("if (1 > 2) { 10 } else if (true) { 20 } else { 30 }");
        assert_eq!(value, Value::Integer(20));
    }

    #[test]
    fn closures_and_recursion_via_nested_calls() {
        let value = eval_source("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));");
        assert_eq!(value, Value::Integer(20));
    }

    #[test]
    fn array_indexing() {
        let value = eval_source("let arr = [1, 2, 3]; arr[0] + arr[1] + arr[2]");
        assert_eq!(value, Value::Integer(6));
    }

    #[test]
    fn hash_indexing() {
        let value = eval_source(r#"let h = {"foo": 1, "bar": 2}; h["bar"]"#);
        assert_eq!(value, Value::Integer(2));
    }

    #[test]
    fn out_of_range_array_index_is_an_error() {
        let value = eval_source("let arr = [1]; arr[5]");
        assert!(value.is_error());
    }

    #[test]
    fn let_redeclaration_in_the_same_scope_is_an_error() {
        let value = eval_source("let a = 1; let a = 2; a");
        assert!(value.is_error());
    }

    #[test]
    fn prefix_increment_on_boolean_is_an_error() {
        let value = eval_source("++true");
        assert!(value.is_error());
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let value = eval_source("5 / 0");
        assert!(value.is_error());
    }

    #[test]
    fn hash_key_must_be_hashable() {
        let value = eval_source(r#"let h = {}; h[fn(x){x}]"#);
        assert!(value.is_error());
    }

    #[test]
    fn return_halts_the_enclosing_block_only() {
        let value = eval_source("let f = fn(x) { if (x > 0) { return 1; } return 2; }; f(5);");
        assert_eq!(value, Value::Integer(1));
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let value = eval_source(
            "let make_adder = fn(x) { fn(y) { x + y; } }; let add_five = make_adder(5); add_five(10);",
        );
        assert_eq!(value, Value::Integer(15));
    }
}
