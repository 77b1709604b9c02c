//! The global string table backing [`Symbol`](super::Symbol).
//!
//! Lookups go through a sharded concurrent map; the reverse direction is
//! a second map keyed by index. New strings are leaked to obtain the
//! `'static` lifetime, which keeps handles valid without reference
//! counting.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

struct Interner {
    /// string -> index
    forward: DashMap<&'static str, u32>,
    /// index -> string
    reverse: DashMap<u32, &'static str>,
    /// Next free index.
    next: AtomicU32,
}

static INTERNER: OnceLock<Interner> = OnceLock::new();

fn interner() -> &'static Interner {
    INTERNER.get_or_init(|| Interner {
        forward: DashMap::new(),
        reverse: DashMap::new(),
        next: AtomicU32::new(0),
    })
}

/// Interns `string`, returning its table index.
pub(super) fn intern(string: &str) -> u32 {
    let table = interner();

    if let Some(index) = table.forward.get(string) {
        return *index;
    }

    let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
    match table.forward.entry(leaked) {
        // Another thread interned the same string first; our copy stays
        // leaked, the index wins.
        Entry::Occupied(entry) => *entry.get(),
        Entry::Vacant(entry) => {
            let index = table.next.fetch_add(1, Ordering::Relaxed);
            table.reverse.insert(index, leaked);
            entry.insert(index);
            index
        }
    }
}

/// Returns the string for a table index.
///
/// Indices only come from [`intern`], so a miss means a corrupted handle;
/// the empty string is returned rather than poisoning the caller.
pub(super) fn resolve(index: u32) -> &'static str {
    interner()
        .reverse
        .get(&index)
        .map(|entry| *entry.value())
        .unwrap_or("")
}
