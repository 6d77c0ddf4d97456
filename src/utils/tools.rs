use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// alias for a ``Rc<RefCell>``
pub type SharedPtr<T> = Rc<RefCell<T>>;

/// creates a new ``SharedPtr<T>``
pub fn shared_ptr<T>(value: T) -> SharedPtr<T> {
    Rc::new(RefCell::new(value))
}

/// alias for a ``Weak<RefCell>``
pub type WeakPtr<T> = Weak<RefCell<T>>;

/// creates a new ``WeakPtr<T>`` from a ``SharedPtr<T>``
pub fn weak_ptr<T>(shared_ptr: &SharedPtr<T>) -> WeakPtr<T> {
    Rc::downgrade(shared_ptr)
}
