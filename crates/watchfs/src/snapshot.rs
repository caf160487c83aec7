use std::collections::BTreeMap;

/// A simple description of a file tree, used to build up the state of an
/// [`InMemoryFs`][crate::InMemoryFs] in tests.
#[derive(Debug, Clone)]
pub enum FsSnapshot {
    File {
        contents: Vec<u8>,
    },
    Dir {
        children: BTreeMap<String, FsSnapshot>,
    },
}

impl FsSnapshot {
    pub fn file<C: Into<Vec<u8>>>(contents: C) -> Self {
        Self::File {
            contents: contents.into(),
        }
    }

    pub fn empty_file() -> Self {
        Self::File {
            contents: Vec::new(),
        }
    }

    pub fn dir<K: Into<String>, I: IntoIterator<Item = (K, FsSnapshot)>>(children: I) -> Self {
        Self::Dir {
            children: children
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    pub fn empty_dir() -> Self {
        Self::Dir {
            children: BTreeMap::new(),
        }
    }
}
