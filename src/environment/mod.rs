use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            bindings: HashMap::new(),
            outer: Some(outer),
        }))
    }

    // Only checks the current frame; shadowing an outer binding is fine,
    // redeclaring one in the same frame is not.
    pub fn create(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.bindings.contains_key(name) {
            return Err(format!("identifier already declared: {name}"));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    // Nothing in the current grammar reaches this path yet; kept for a
    // future assignment syntax.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.bindings.contains_key(name) {
            self.bindings.insert(name.to_string(), value);
            return Ok(());
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().set(name, value),
            None => Err(format!("identifier not found: {name}")),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }
}
