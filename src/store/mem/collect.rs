use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::{
    CanvasError, Result, ShareLock,
    store::{Record, StoreIden},
};

/// In-memory collection of records kept in insertion order.
#[derive(Debug, Clone)]
pub struct Collect<T> {
    iden: StoreIden,
    items: ShareLock<Vec<T>>,
}

impl<T> Collect<T>
where
    T: Record,
{
    pub fn new(iden: StoreIden) -> Self {
        Self {
            iden,
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn exists(
        &self,
        id: &str,
    ) -> bool {
        self.items.read().unwrap().iter().any(|item| item.id() == id)
    }

    pub fn find(
        &self,
        id: &str,
    ) -> Result<T> {
        trace!("{}::find({})", self.iden.as_ref(), id);
        self.find_by(|item| item.id() == id).ok_or_else(|| CanvasError::NotFound(format!("{} not found: {}", self.iden.as_ref(), id)))
    }

    pub fn find_by(
        &self,
        f: impl Fn(&T) -> bool,
    ) -> Option<T> {
        self.items.read().unwrap().iter().find(|item| f(item)).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.items.read().unwrap().clone()
    }

    /// Insert a new record. Returns false when the id is already taken.
    pub fn create(
        &self,
        data: &T,
    ) -> bool {
        trace!("{}::create({})", self.iden.as_ref(), data.id());
        let mut items = self.items.write().unwrap();
        if items.iter().any(|item| item.id() == data.id()) {
            return false;
        }
        items.push(data.clone());
        true
    }

    /// Mutate a record in place and return the updated copy.
    pub fn update(
        &self,
        id: &str,
        f: impl FnOnce(&mut T),
    ) -> Result<T> {
        trace!("{}::update({})", self.iden.as_ref(), id);
        let mut items = self.items.write().unwrap();
        match items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                Ok(item.clone())
            }
            None => Err(CanvasError::NotFound(format!("{} not found: {}", self.iden.as_ref(), id))),
        }
    }

    pub fn delete(
        &self,
        id: &str,
    ) -> bool {
        trace!("{}::delete({})", self.iden.as_ref(), id);
        let mut items = self.items.write().unwrap();
        let len = items.len();
        items.retain(|item| item.id() != id);
        items.len() != len
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
