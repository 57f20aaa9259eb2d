//! The reference dictionary: an ordered list of `(id -> name)` pairs loaded
//! from a BAM header, indexed contiguously from 0.

use std::collections::HashMap;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReferenceTable {
    names: Vec<String>,
    lengths: Vec<u32>,
    name_to_id: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn from_entries(entries: Vec<(String, u32)>) -> Self {
        let mut names = Vec::with_capacity(entries.len());
        let mut lengths = Vec::with_capacity(entries.len());
        let mut name_to_id = HashMap::with_capacity(entries.len());

        for (id, (name, length)) in entries.into_iter().enumerate() {
            name_to_id.insert(name.clone(), id);
            names.push(name);
            lengths.push(length);
        }

        Self {
            names,
            lengths,
            name_to_id,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn length(&self, id: usize) -> Option<u32> {
        self.lengths.get(id).copied()
    }

    pub fn id_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.lengths.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trip() {
        let table = ReferenceTable::from_entries(vec![
            ("chr1".to_string(), 1000),
            ("chr2".to_string(), 2000),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.name(0), Some("chr1"));
        assert_eq!(table.length(1), Some(2000));
        assert_eq!(table.id_by_name("chr2"), Some(1));
        assert_eq!(table.id_by_name("chr3"), None);
    }
}
