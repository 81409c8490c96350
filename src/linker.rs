//! Linker / Resolver (C5): deferred cross-reference resolution, run once
//! after every pool is populated (spec.md §4.5).
//!
//! Resolvers are boxed closures keyed by a lexicographically-ordered
//! string, stored in a `BTreeMap` so execution order is the key order — a
//! load-time determinism contract (spec.md §4.5, §9 "Deferred linker").
//! Closures only borrow the document's pools, never mutate them (spec.md
//! §9: "so that concurrent resolver execution would be safe if ever
//! desired").

use std::collections::BTreeMap;

use crate::document::Document;
use crate::error::MusxError;

type Resolver = Box<dyn FnOnce(&Document) -> Result<(), MusxError>>;

#[derive(Default)]
pub struct Linker {
    resolvers: BTreeMap<String, Resolver>,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolver under `key`. A duplicate key replaces the
    /// earlier registration, coalescing to one call (spec.md §4.5
    /// "Duplicate keys are coalesced").
    pub fn register(&mut self, key: impl Into<String>, resolver: impl FnOnce(&Document) -> Result<(), MusxError> + 'static) {
        self.resolvers.insert(key.into(), Box::new(resolver));
    }

    /// Runs every resolver exactly once, in lexicographic key order
    /// (spec.md §4.5, §5 "Ordering guarantees").
    pub fn run(self, document: &Document) -> Result<(), MusxError> {
        for (_, resolver) in self.resolvers {
            resolver(document)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn resolvers_run_in_lexicographic_key_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut linker = Linker::new();

        for key in ["others/staffGroup/3", "details/gframehold/1", "details/gframehold/0"] {
            let log = log.clone();
            let key_owned = key.to_string();
            linker.register(key, move |_doc| {
                log.borrow_mut().push(key_owned.clone());
                Ok(())
            });
        }

        let document = Document::empty();
        linker.run(&document).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["details/gframehold/0".to_string(), "details/gframehold/1".to_string(), "others/staffGroup/3".to_string()]
        );
    }

    #[test]
    fn duplicate_keys_coalesce_to_last_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut linker = Linker::new();
        for value in [1, 2] {
            let log = log.clone();
            linker.register("same-key", move |_doc| {
                log.borrow_mut().push(value);
                Ok(())
            });
        }
        let document = Document::empty();
        linker.run(&document).unwrap();
        assert_eq!(*log.borrow(), vec![2]);
    }
}
