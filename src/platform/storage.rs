//! Key/value storage
//!
//! LocalStorage in the browser, a shared in-memory map everywhere else.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::GameResult;

/// String key/value store with LocalStorage semantics
pub trait Storage {
    fn get_item(&self, key: &str) -> GameResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> GameResult<()>;
    fn remove_item(&self, key: &str) -> GameResult<()>;
}

/// In-memory store. Clones share the same map, so a test can reopen it.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> GameResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> GameResult<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> GameResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> GameResult<Self> {
        use crate::error::GameError;

        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| GameError::Storage("localStorage unavailable".into()))?;
        Ok(Self { inner })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> crate::error::GameError {
    crate::error::GameError::Storage(format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> GameResult<Option<String>> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> GameResult<()> {
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> GameResult<()> {
        self.inner.remove_item(key).map_err(js_error)
    }
}
