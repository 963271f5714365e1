//! Typed entity identifiers.
//!
//! Every collection in the scene is keyed by its own id type, so a chapter
//! id can never be handed to a timeline lookup and the hit-testing targets
//! say which kind of entity they name. All id strings share one interning
//! pool: the external owner supplies arbitrary strings, and hit-testing
//! compares ids on every pointer move, so comparison must stay O(1).

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static POOL: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

macro_rules! entity_ids {
    ($($(#[$attr:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            pub fn new(s: &str) -> Self {
                Self(POOL.get_or_intern(s))
            }

            pub fn as_str(&self) -> &str {
                POOL.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(|s| Self::new(&s))
            }
        }
    )+};
}

entity_ids! {
    /// A timeline, the anchor entity everything else hangs off.
    TimelineId,
    /// A chapter on a timeline; synthetic boundary chapters mint their own.
    ChapterId,
    /// An arc: a named, colored grouping of contiguous chapters.
    ArcId,
    /// A curved connector between two different timelines.
    BranchId,
    /// A free-floating straight line between grid points.
    LineId,
    /// A positioned rich-text annotation.
    TextboxId,
}

impl ChapterId {
    /// Mint a fresh id for a synthetic boundary chapter. Head and Tail have
    /// no external record, and they are recreated on every chapter resync,
    /// so each gets a never-before-seen id.
    fn boundary(kind: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::new(&format!("{kind}_{n}"))
    }

    pub fn head() -> Self {
        Self::boundary("head")
    }

    pub fn tail() -> Self {
        Self::boundary("tail")
    }
}
