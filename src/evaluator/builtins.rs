use std::cell::RefCell;
use std::rc::Rc;

use crate::environment::Environment;
use crate::object::{Builtin, BuiltinFn, Value};

use super::call_function;

const TABLE: &[(&str, BuiltinFn)] = &[
    ("len", builtin_len),
    ("push", builtin_push),
    ("print", builtin_print),
    ("exit", builtin_exit),
    ("rest", builtin_rest),
    ("filter", builtin_filter),
    ("map", builtin_map),
    ("reduce", builtin_reduce),
];

pub fn lookup_builtin(name: &str) -> Option<Builtin> {
    TABLE
        .iter()
        .find(|(entry_name, _)| *entry_name == name)
        .map(|(name, func)| Builtin { name, func: *func })
}

pub fn table() -> impl Iterator<Item = (&'static str, Builtin)> {
    TABLE.iter().map(|(name, func)| (*name, Builtin { name, func: *func }))
}

fn arity_error(name: &str, expected: &str, got: usize) -> Value {
    Value::error(format!("wrong number of arguments to `{name}`: expected {expected}, got {got}"))
}

fn builtin_len(_env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    if args.len() != 1 {
        return Err(arity_error("len", "1", args.len()));
    }
    match &args[0] {
        Value::String(bytes) => Ok(Value::Integer(bytes.len() as i64)),
        Value::Array(elements) => Ok(Value::Integer(elements.len() as i64)),
        Value::Hash(pairs) => Ok(Value::Integer(pairs.len() as i64)),
        other => Err(Value::error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_push(_env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    match args.first() {
        Some(Value::Array(elements)) => {
            if args.len() != 2 {
                return Err(arity_error("push", "2 (array, value)", args.len()));
            }
            let mut elements = elements.clone();
            elements.push(args[1].clone());
            Ok(Value::Array(elements))
        }
        Some(Value::Hash(pairs)) => {
            if args.len() != 3 {
                return Err(arity_error("push", "3 (hash, key, value)", args.len()));
            }
            let key = &args[1];
            let hash_key = key
                .hash_key()
                .ok_or_else(|| Value::error(format!("key to `push` must be hashable, got {}", key.type_name())))?;
            let mut pairs = pairs.clone();
            pairs.insert(
                hash_key,
                crate::object::HashPair {
                    key: key.clone(),
                    value: args[2].clone(),
                },
            );
            Ok(Value::Hash(pairs))
        }
        Some(other) => Err(Value::error(format!(
            "argument to `push` not supported, got {}",
            other.type_name()
        ))),
        None => Err(arity_error("push", "2 or 3", 0)),
    }
}

fn builtin_print(_env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    let rendered: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Null)
}

fn builtin_exit(_env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    let code = match args {
        [] => 0,
        [Value::Integer(code)] => *code,
        [other] => {
            return Err(Value::error(format!(
                "argument to `exit` must be an Integer, got {}",
                other.type_name()
            )))
        }
        _ => return Err(arity_error("exit", "0 or 1", args.len())),
    };
    std::process::exit(code as i32);
}

fn builtin_rest(_env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    let (array, start) = match args {
        [Value::Array(elements)] => (elements, 1usize),
        [Value::Array(elements), Value::Integer(start)] => {
            if *start < 0 {
                return Err(Value::error("start index to `rest` must not be negative"));
            }
            (elements, *start as usize)
        }
        [other, ..] => {
            return Err(Value::error(format!(
                "argument to `rest` not supported, got {}",
                other.type_name()
            )))
        }
        [] => return Err(arity_error("rest", "1 or 2", 0)),
    };

    if start >= array.len() {
        return Ok(Value::Array(vec![]));
    }
    Ok(Value::Array(array[start..].to_vec()))
}

fn callback_parts(value: &Value) -> Result<(&[crate::ast::Identifier], &crate::ast::Block, &Rc<RefCell<Environment>>), Value> {
    match value {
        Value::Function { params, body, captured } => Ok((params, body, captured)),
        other => Err(Value::error(format!(
            "expected a Function callback, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_filter(env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    let [Value::Array(elements), callback] = args else {
        return Err(arity_error("filter", "2 (array, function)", args.len()));
    };
    let (params, body, _) = callback_parts(callback)?;
    if params.len() != 1 {
        return Err(Value::error("filter callback must take exactly 1 parameter"));
    }

    let mut kept = Vec::new();
    for element in elements {
        match call_function(params, body, env, std::slice::from_ref(element))? {
            Value::Boolean(true) => kept.push(element.clone()),
            Value::Boolean(false) => {}
            other => {
                return Err(Value::error(format!(
                    "filter callback must return a Boolean, got {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(Value::Array(kept))
}

fn builtin_map(env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    let [Value::Array(elements), callback] = args else {
        return Err(arity_error("map", "2 (array, function)", args.len()));
    };
    let (params, body, _) = callback_parts(callback)?;
    if params.len() != 1 {
        return Err(Value::error("map callback must take exactly 1 parameter"));
    }

    let mut mapped = Vec::with_capacity(elements.len());
    for element in elements {
        mapped.push(call_function(params, body, env, std::slice::from_ref(element))?);
    }
    Ok(Value::Array(mapped))
}

fn builtin_reduce(env: &Rc<RefCell<Environment>>, args: &[Value]) -> Result<Value, Value> {
    let [Value::Array(elements), initial, callback] = args else {
        return Err(arity_error("reduce", "3 (array, initial, function)", args.len()));
    };
    let (params, body, _) = callback_parts(callback)?;
    if params.len() != 2 {
        return Err(Value::error("reduce callback must take exactly 2 parameters (acc, elem)"));
    }

    let mut acc = initial.clone();
    for element in elements {
        acc = call_function(params, body, env, &[acc, element.clone()])?;
    }
    Ok(acc)
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
        for (name, builtin) in table() {
            env.borrow_mut().create(name, Value::Builtin(builtin)).unwrap();
        }
        super::super::eval_program(&program, &env)
    }

    #[test]
    fn reduce_sums_an_array() {
        let value = eval_source("reduce([1,2,3,4], 0, fn(acc, x){ acc + x; })");
        assert_eq!(value, Value::Integer(10));
    }

    #[test]
    fn map_doubles_each_element() {
        let value = eval_source("map([1,2,3], fn(x) { x * 2 })");
        assert_eq!(
            value,
            Value::Array(vec![Value::Integer(2), Value::Integer(4), Value::Integer(6)])
        );
    }

    #[test]
    fn filter_keeps_elements_matching_the_predicate() {
        let value = eval_source("filter([1,2,3,4], fn(x) { x > 2 })");
        assert_eq!(value, Value::Array(vec![Value::Integer(3), Value::Integer(4)]));
    }

    #[test]
    fn rest_defaults_to_dropping_the_first_element() {
        let value = eval_source("rest([1,2,3])");
        assert_eq!(value, Value::Array(vec![Value::Integer(2), Value::Integer(3)]));
    }

    #[test]
    fn rest_on_empty_array_is_empty() {
        let value = eval_source("rest([])");
        assert_eq!(value, Value::Array(vec![]));
    }

    #[test]
    fn len_reports_string_byte_length() {
        let value = eval_source(r#"len("hello")"#);
        assert_eq!(value, Value::Integer(5));
    }

    #[test]
    fn push_onto_array_returns_a_new_array() {
        let value = eval_source("let a = [1]; push(a, 2);");
        assert_eq!(value, Value::Array(vec![Value::Integer(1), Value::Integer(2)]));
    }

    #[test]
    fn callback_referencing_an_undeclared_name_errors() {
        let value = eval_source("map([1], fn(x) { x + outer })");
        assert!(value.is_error());
    }
}
