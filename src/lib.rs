//! Rill: a tree-walking interpreter for a small dynamically-typed language.

pub mod ast;
pub mod comments;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod token;

use std::cell::RefCell;
use std::rc::Rc;

use environment::Environment;
use lexer::Lexer;
use object::Value;
use parser::{ParseError, Parser};

pub fn root_environment() -> Rc<RefCell<Environment>> {
    let env = Environment::new();
    for (name, builtin) in evaluator::table() {
        env.borrow_mut()
            .create(name, Value::Builtin(builtin))
            .expect("builtin names never collide with each other");
    }
    env
}

// Parse errors short-circuit before the evaluator ever runs.
pub fn run_source(source: &str, env: &Rc<RefCell<Environment>>) -> Result<Value, Vec<ParseError>> {
    let stripped = comments::strip_comments(source);
    let (program, errors) = Parser::new(Lexer::new(&stripped)).parse_program();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(evaluator::eval_program(&program, env))
}
