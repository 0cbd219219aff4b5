//! The property table and its hash index.

use propkit_core::name_hash;

use crate::entry::{ActionEntry, UserEntry};
use crate::error::TableError;

/// Index capacity per entry. A quarter-full table keeps linear probe chains
/// short without a tombstone scheme - the index is write-once.
pub const INDEX_FACTOR: usize = 4;

type IndexSlot = Option<(u32, u32)>; // (name hash, entry position)

/// Per-type immutable property metadata.
///
/// Built once through `TableBuilder`, then only read. All lookups are by
/// name hash through an open-addressed index of capacity
/// `INDEX_FACTOR * len()`; entry order is declaration order and is the
/// traversal order of every walk.
pub struct Table {
    name: Option<String>,
    name_hash: u32,
    actions: Vec<ActionEntry>,
    users: Vec<UserEntry>,
    index: Vec<IndexSlot>,
}

impl Table {
    /// Assemble a table from paired entries. Fails on a duplicate name hash;
    /// callers are expected to treat that as fatal at registration.
    pub(crate) fn assemble(
        name: Option<String>,
        entries: Vec<(ActionEntry, UserEntry)>,
    ) -> Result<Table, TableError> {
        let count = entries.len();
        let mut actions = Vec::with_capacity(count);
        let mut users = Vec::with_capacity(count);
        for (action, user) in entries {
            actions.push(action);
            users.push(user);
        }

        let capacity = count * INDEX_FACTOR;
        let mut index: Vec<IndexSlot> = vec![None; capacity];
        for (position, user) in users.iter().enumerate() {
            let hash = user.name_hash();
            let mut slot = hash as usize % capacity;
            loop {
                match index[slot] {
                    None => {
                        index[slot] = Some((hash, position as u32));
                        break;
                    }
                    Some((occupied, _)) if occupied == hash => {
                        return Err(TableError::DuplicateName {
                            table: name.as_deref().unwrap_or("<anonymous>").to_string(),
                            name: user.name().to_string(),
                            hash,
                        });
                    }
                    Some(_) => slot = (slot + 1) % capacity,
                }
            }
        }

        let name_hash = name.as_deref().map_or(0, name_hash);
        tracing::debug!(
            table = name.as_deref().unwrap_or("<anonymous>"),
            entries = count,
            "property table built"
        );

        Ok(Table {
            name,
            name_hash,
            actions,
            users,
            index,
        })
    }

    /// Table name, if the table was registered with one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Hash of the table name; `0` for anonymous tables. Doubles as the
    /// root consistency key of the pack codec.
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Find an entry position by name hash. Probes until an exact match or
    /// the first empty slot.
    pub fn find_index(&self, hash: u32) -> Option<usize> {
        if self.index.is_empty() {
            return None;
        }
        let capacity = self.index.len();
        let mut slot = hash as usize % capacity;
        loop {
            match self.index[slot] {
                None => return None,
                Some((occupied, position)) if occupied == hash => return Some(position as usize),
                Some(_) => slot = (slot + 1) % capacity,
            }
        }
    }

    /// Find an action entry by name hash.
    pub fn find(&self, hash: u32) -> Option<&ActionEntry> {
        self.find_index(hash).map(|i| &self.actions[i])
    }

    /// Action entry at a declaration position.
    pub fn action(&self, position: usize) -> &ActionEntry {
        &self.actions[position]
    }

    /// User entry at a declaration position.
    pub fn user(&self, position: usize) -> &UserEntry {
        &self.users[position]
    }

    /// Paired entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ActionEntry, &UserEntry)> {
        self.actions.iter().zip(self.users.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Field, TableBuilder};

    struct Pair {
        a: i32,
        b: i32,
    }

    fn pair_table() -> Table {
        TableBuilder::<Pair>::named("Pair")
            .field(Field::value("A", |p: &Pair| &p.a, |p: &mut Pair| &mut p.a))
            .field(Field::value("B", |p: &Pair| &p.b, |p: &mut Pair| &mut p.b))
            .build()
            .unwrap()
    }

    #[test]
    fn find_by_hash() {
        let table = pair_table();
        assert_eq!(table.find_index(name_hash("A")), Some(0));
        assert_eq!(table.find_index(name_hash("B")), Some(1));
        assert!(table.find(name_hash("A")).is_some());
    }

    #[test]
    fn miss_stops_at_empty_slot() {
        let table = pair_table();
        assert_eq!(table.find_index(name_hash("C")), None);
        assert!(table.find(name_hash("Nope")).is_none());
    }

    #[test]
    fn name_hash_matches_name() {
        let table = pair_table();
        assert_eq!(table.name(), Some("Pair"));
        assert_eq!(table.name_hash(), name_hash("Pair"));
    }

    #[test]
    fn anonymous_table_hashes_to_zero() {
        let table = TableBuilder::<Pair>::anonymous()
            .field(Field::value("A", |p: &Pair| &p.a, |p: &mut Pair| &mut p.a))
            .build()
            .unwrap();
        assert_eq!(table.name(), None);
        assert_eq!(table.name_hash(), 0);
    }

    #[test]
    fn probe_survives_wraparound() {
        // Many entries force probe chains that wrap the index end. All of
        // them must stay reachable.
        struct Wide {
            v: i32,
        }
        let names: Vec<String> = (0..24).map(|i| format!("Field{}", i)).collect();
        let mut builder = TableBuilder::<Wide>::named("Wide");
        for name in &names {
            builder = builder.field(Field::computed(
                name.clone(),
                |w: &Wide| w.v,
                |w: &mut Wide, v| {
                    w.v = v;
                    true
                },
            ));
        }
        let table = builder.build().unwrap();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(table.find_index(name_hash(name)), Some(i), "{}", name);
        }
    }

    #[test]
    fn iter_preserves_declaration_order() {
        let table = pair_table();
        let names: Vec<&str> = table.iter().map(|(_, u)| u.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
