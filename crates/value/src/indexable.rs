use std::borrow::Cow;

use crate::{MetaData, Value};

/// Keyed access shared by every shape the resolver walks: the root
/// container, plain sequences, decoded CSA containers and protocol trees.
///
/// Implementations that store their entries as [`Value`]s lend them out;
/// ones that decode on demand return owned values.
pub trait Indexable {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl Indexable for MetaData {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        MetaData::get(self, key).map(Cow::Borrowed)
    }

    fn contains(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl Indexable for Value {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.entry(key).map(Cow::Borrowed)
    }
}
