use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::vertex::SetNode;

/// Key of the unique table: `(index, high id, low id)`.
pub type UniqueKey = (i32, u64, u64);

/// Hash consing table for set nodes.
///
/// The table holds weak references: node lifetime is driven entirely by the
/// strong edges of the ZBDD graph. A dead entry is replaced in place on the
/// next fetch of its key; `collect` sweeps the remaining corpses. Either way
/// at most one live node exists per key.
pub struct UniqueTable {
    table: HashMap<UniqueKey, Weak<SetNode>>,
}

impl UniqueTable {
    pub fn new() -> Self {
        Self { table: HashMap::new() }
    }

    /// Looks up a live node for the key. A dead entry is erased on the way.
    pub fn lookup(&mut self, key: &UniqueKey) -> Option<Rc<SetNode>> {
        match self.table.get(key) {
            Some(weak) => match weak.upgrade() {
                Some(node) => Some(node),
                None => {
                    self.table.remove(key);
                    None
                }
            },
            None => None,
        }
    }

    /// Installs a weak entry for a freshly created node.
    ///
    /// # Panics
    ///
    /// Panics if a live node already occupies the key.
    pub fn insert(&mut self, key: UniqueKey, node: &Rc<SetNode>) {
        let previous = self.table.insert(key, Rc::downgrade(node));
        assert!(
            previous.map_or(true, |weak| weak.upgrade().is_none()),
            "Duplicate live node for the unique table key {:?}",
            key
        );
    }

    /// Drops entries whose nodes have died.
    pub fn collect(&mut self) {
        self.table.retain(|_, weak| weak.upgrade().is_some());
    }

    /// The number of entries, dead ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Releases the whole table. Live nodes are unaffected.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl Default for UniqueTable {
    fn default() -> Self {
        Self::new()
    }
}
