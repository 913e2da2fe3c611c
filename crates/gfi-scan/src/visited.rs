//! Directory identities for symlink cycle detection.

use std::sync::Arc;

/// Identity of a directory on disk: `(device, inode)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirIdentity {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl DirIdentity {
    /// Create a new identity.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }

    /// Identity of a directory from its metadata, if the platform exposes one.
    #[cfg(unix)]
    pub fn of(metadata: &std::fs::Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self::new(metadata.dev(), metadata.ino()))
    }

    #[cfg(not(unix))]
    pub fn of(_metadata: &std::fs::Metadata) -> Option<Self> {
        None
    }
}

#[derive(Debug)]
struct Link {
    id: DirIdentity,
    parent: Option<Arc<Link>>,
}

/// The directories between a root and the one being listed.
///
/// Each walker task holds its own chain, sharing the common prefix with its
/// parent. Descending into a directory already on the chain would loop;
/// reaching the same directory through an unrelated link would not, so that
/// case is walked normally.
#[derive(Debug, Clone, Default)]
pub struct Ancestors {
    head: Option<Arc<Link>>,
}

impl Ancestors {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain extended by one directory.
    pub fn child(&self, id: DirIdentity) -> Self {
        Self {
            head: Some(Arc::new(Link {
                id,
                parent: self.head.clone(),
            })),
        }
    }

    /// Check if `id` is on the chain.
    pub fn contains(&self, id: DirIdentity) -> bool {
        self.iter().any(|link| link == id)
    }

    /// Number of directories on the chain.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    fn iter(&self) -> impl Iterator<Item = DirIdentity> + '_ {
        std::iter::successors(self.head.as_deref(), |link| link.parent.as_deref())
            .map(|link| link.id)
    }
}
