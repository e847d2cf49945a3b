use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A lexically nested name-to-value mapping.
///
/// `Environment` is a cheap-clone handle to a shared frame; cloning it does
/// not copy bindings. Closures hold such a handle, which is how a binding
/// added to a scope after a function literal was evaluated is still visible
/// from inside the function body. A closure stored in the very environment
/// it captures forms an `Rc` cycle; Monkey source cannot rebind names, so
/// the cycle lives exactly as long as the session and is accepted.
#[derive(Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

#[derive(Default)]
struct Frame {
    bindings: HashMap<String, Value>,
    outer: Option<Environment>,
}

// Shallow on purpose: a closure bound in the environment it captures makes
// the chain cyclic, so printing values or the outer chain would not
// terminate.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame.try_borrow() {
            Ok(frame) => {
                let mut names: Vec<&String> = frame.bindings.keys().collect();
                names.sort();
                f.debug_struct("Environment")
                    .field("names", &names)
                    .field("has_outer", &frame.outer.is_some())
                    .finish()
            }
            Err(_) => f.write_str("Environment { <borrowed> }"),
        }
    }
}

impl Environment {
    /// An empty top-level environment with no enclosing frame.
    pub fn new() -> Self {
        Self {
            frame: Rc::new(RefCell::new(Frame::default())),
        }
    }

    /// A fresh innermost frame whose lookups fall through to `outer`.
    pub fn new_enclosed(outer: &Environment) -> Self {
        Self {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                outer: Some(outer.clone()),
            })),
        }
    }

    /// Looks a name up, walking outward through enclosing frames.
    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.frame.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Some(value.clone());
        }
        frame.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Binds a name in the innermost frame, overwriting any previous binding
    /// of the same name in this frame. Outer frames are never written.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.frame.borrow_mut().bindings.insert(name.into(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
