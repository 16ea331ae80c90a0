//! Methods bound to an element instance.

use std::rc::{Rc, Weak};

use crate::{definition::Definition, error::Error};

/// A method whose receiver is fixed to an element instance.
///
/// It can be cloned and moved into callbacks freely;
/// calling it always targets the instance it was bound to.
/// The instance is referenced weakly, so the call yields `None` after the instance is dropped.
pub struct BoundMethod<A = (), R = ()> {
    name: &'static str,
    f: Rc<dyn Fn(A) -> Option<R>>,
}

impl<A, R> Clone for BoundMethod<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            f: self.f.clone(),
        }
    }
}

impl<A, R> std::fmt::Debug for BoundMethod<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[BoundMethod {}]", self.name)
    }
}

impl<A, R> BoundMethod<A, R> {
    /// The declared method name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Call the method on the bound instance.
    #[inline]
    pub fn call(&self, arg: A) -> Option<R> {
        (self.f)(arg)
    }
}

/// The binder handed to `CustomElement::new` .
///
/// Every method declared in `bound_methods` must be bound through it,
/// otherwise the construction fails.
pub struct Binder<T> {
    pub(crate) this: Weak<T>,
    definition: &'static Definition,
    bound: Vec<&'static str>,
    undeclared: Option<String>,
}

impl<T: 'static> Binder<T> {
    pub(crate) fn new(definition: &'static Definition) -> Self {
        Self {
            this: Weak::new(),
            definition,
            bound: Vec::with_capacity(definition.bound_methods.len()),
            undeclared: None,
        }
    }

    /// Bind a method to the instance under construction.
    ///
    /// The returned method is not callable until the construction is done.
    pub fn bind<A: 'static, R: 'static>(
        &mut self,
        name: &str,
        f: impl 'static + Fn(&T, A) -> R,
    ) -> BoundMethod<A, R> {
        let name = match self.definition.declared_method(name) {
            Some(declared) => {
                if !self.bound.contains(&declared) {
                    self.bound.push(declared);
                }
                declared
            }
            None => {
                if self.undeclared.is_none() {
                    self.undeclared = Some(name.to_string());
                }
                ""
            }
        };
        let this = self.this.clone();
        BoundMethod {
            name,
            f: Rc::new(move |arg| this.upgrade().map(|this| f(&this, arg))),
        }
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        if let Some(name) = self.undeclared {
            return Err(Error::UndeclaredMethod(name));
        }
        for name in self.definition.bound_methods {
            if !self.bound.contains(name) {
                return Err(Error::MethodNotBound(name.to_string()));
            }
        }
        Ok(())
    }
}
