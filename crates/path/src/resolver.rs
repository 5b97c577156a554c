use mrmeta_csa::CsaOptions;
use mrmeta_value::{Indexable, MetaData, Value};
use tracing::{debug, trace};

use crate::accessor::{AccessContext, Accessor, DEFAULT_ACCESSORS};
use crate::error::{AccessFailure, ResolveError};

/// Position of the walk: the root container, a value borrowed from it, or
/// a value an accessor produced.
enum Cursor<'a> {
    Root(&'a MetaData),
    Borrowed(&'a Value),
    Owned(Value),
}

impl<'a> Cursor<'a> {
    fn value(&self) -> Option<&Value> {
        match self {
            Cursor::Root(_) => None,
            Cursor::Borrowed(value) => Some(value),
            Cursor::Owned(value) => Some(value),
        }
    }

    fn has_key(&self, key: &str) -> bool {
        match self {
            Cursor::Root(meta) => Indexable::contains(*meta, key),
            _ => matches!(self.value(), Some(v @ Value::Struct(_)) if v.contains(key)),
        }
    }

    fn sequence_len(&self) -> Option<usize> {
        self.value().and_then(Value::as_array).map(<[Value]>::len)
    }

    fn descend(self, key: &str) -> Option<Cursor<'a>> {
        match self {
            Cursor::Root(meta) => meta.get(key).map(Cursor::Borrowed),
            Cursor::Borrowed(value) => value.entry(key).map(Cursor::Borrowed),
            Cursor::Owned(value) => value.into_entry(key).map(Cursor::Owned),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Cursor::Root(meta) => meta.clone().into_value(),
            Cursor::Borrowed(value) => value.clone(),
            Cursor::Owned(value) => value,
        }
    }
}

/// Walks dot-separated queries over a [`MetaData`] root.
///
/// Each segment is tried, in order, as a key of the current mapping, as an
/// index of the current sequence, and finally against the accessor chain.
/// The first accessor that succeeds supplies the next value.
#[derive(Debug, Clone)]
pub struct Resolver {
    options: CsaOptions,
    accessors: Vec<Accessor>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(CsaOptions::default())
    }
}

impl Resolver {
    pub fn new(options: CsaOptions) -> Self {
        Self {
            options,
            accessors: DEFAULT_ACCESSORS.to_vec(),
        }
    }

    /// Replaces the accessor chain. Order is priority order.
    pub fn with_accessors(mut self, accessors: impl IntoIterator<Item = Accessor>) -> Self {
        self.accessors = accessors.into_iter().collect();
        self
    }

    pub fn options(&self) -> &CsaOptions {
        &self.options
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    pub fn resolve(&self, root: &MetaData, query: &str) -> Result<Value, ResolveError> {
        let mut cursor = Cursor::Root(root);
        let mut parent = "";
        let mut end = 0;

        for (position, segment) in query.split('.').enumerate() {
            end += segment.len() + usize::from(position > 0);
            let prefix = &query[..end];

            if cursor.has_key(segment) {
                trace!(segment, "key step");
                cursor = cursor.descend(segment).ok_or_else(|| no_such_item(prefix))?;
                parent = segment;
                continue;
            }

            if let Some(len) = cursor.sequence_len() {
                let index = segment
                    .parse::<usize>()
                    .ok()
                    .filter(|&index| index < len)
                    .ok_or_else(|| no_such_item(prefix))?;
                trace!(index, "index step");
                cursor = cursor.descend(segment).ok_or_else(|| no_such_item(prefix))?;
                continue;
            }

            let next = self.access(root, parent, segment, &cursor, prefix)?;
            cursor = Cursor::Owned(next);
            parent = segment;
        }

        Ok(cursor.into_value())
    }

    fn access(
        &self,
        root: &MetaData,
        parent: &str,
        segment: &str,
        cursor: &Cursor<'_>,
        prefix: &str,
    ) -> Result<Value, ResolveError> {
        let Some(value) = cursor.value() else {
            return Err(no_such_item(prefix));
        };
        let cx = AccessContext {
            root,
            parent,
            segment,
            value,
            options: &self.options,
        };
        let mut attempts = Vec::new();
        for accessor in &self.accessors {
            match (accessor.access)(&cx) {
                Ok(next) => {
                    debug!(accessor = accessor.name, segment, "accessor applied");
                    return Ok(next);
                }
                Err(error) => {
                    debug!(accessor = accessor.name, segment, %error, "accessor rejected");
                    attempts.push(AccessFailure {
                        accessor: accessor.name,
                        error,
                    });
                }
            }
        }
        debug!(path = prefix, "no accessor applied");
        Err(ResolveError::NoSuchItem {
            path: prefix.to_string(),
            attempts,
        })
    }
}

fn no_such_item(prefix: &str) -> ResolveError {
    ResolveError::NoSuchItem {
        path: prefix.to_string(),
        attempts: Vec::new(),
    }
}

/// Resolves `query` with the default CSA policy and accessor chain.
pub fn resolve(root: &MetaData, query: &str) -> Result<Value, ResolveError> {
    Resolver::default().resolve(root, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;

    fn echo_times() -> MetaData {
        let mut meta = MetaData::new();
        meta.insert(
            "EchoTime",
            Value::Array(vec![
                Value::Array(vec![Value::Float(2.3)]),
                Value::Array(vec![Value::Float(6.9)]),
            ]),
        );
        meta
    }

    #[test]
    fn key_and_index_steps() {
        let meta = echo_times();
        assert_eq!(resolve(&meta, "EchoTime.1.0"), Ok(Value::Float(6.9)));
        assert_eq!(
            resolve(&meta, "EchoTime.0"),
            Ok(Value::Array(vec![Value::Float(2.3)]))
        );
    }

    #[test]
    fn failing_segment_is_reported_with_its_prefix() {
        let meta = echo_times();
        let cases = [
            ("Missing", "Missing"),
            ("EchoTime.2", "EchoTime.2"),
            ("EchoTime.x.0", "EchoTime.x"),
            ("EchoTime.-1", "EchoTime.-1"),
            ("EchoTime.1.0.0", "EchoTime.1.0.0"),
        ];
        for (query, prefix) in cases {
            let error = resolve(&meta, query).unwrap_err();
            assert_eq!(error.path(), prefix, "{query}");
        }
    }

    #[test]
    fn scalars_collect_every_accessor_attempt() {
        let meta = echo_times();
        let error = resolve(&meta, "EchoTime.1.0.unit").unwrap_err();
        let names: Vec<_> = error.attempts().iter().map(|a| a.accessor).collect();
        assert_eq!(names, vec!["csa", "protocol"]);
        assert!(error
            .attempts()
            .iter()
            .all(|a| matches!(a.error, AccessError::NotApplicable(_))));
        assert_eq!(error.to_string(), "no such item: EchoTime.1.0.unit");
    }

    #[test]
    fn empty_accessor_chain_still_walks_keys() {
        let resolver = Resolver::default().with_accessors(Vec::<Accessor>::new());
        let meta = echo_times();
        assert_eq!(resolver.resolve(&meta, "EchoTime.0.0"), Ok(Value::Float(2.3)));
        assert!(resolver.accessors().is_empty());
    }
}
