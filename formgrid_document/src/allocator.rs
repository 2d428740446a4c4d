use std::collections::HashMap;

use formgrid_schema::Document;

/// Hands out sequential `{slug}-{n}` ids, one counter per slug.
///
/// Counters are part of the document's state, not ambient globals: a
/// controller rebuilds them from the ids already present when it adopts a
/// loaded document, so generated ids never collide with loaded ones.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    counters: HashMap<String, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator::default()
    }

    /// Next id for a slug. Counters only ever move forward.
    pub fn next_id(&mut self, slug: &str) -> String {
        let counter = self.counters.entry(slug.to_string()).or_insert(0);
        *counter += 1;
        format!("{slug}-{counter}")
    }

    /// Raise a slug's counter so `next_id` never reissues `n`.
    pub fn observe(&mut self, slug: &str, n: u64) {
        let counter = self.counters.entry(slug.to_string()).or_insert(0);
        if n > *counter {
            *counter = n;
        }
    }

    /// Rebuild counters from every id in a loaded document. Ids that do not
    /// end in `-{number}` are skipped; they can never collide with generated
    /// ones.
    pub fn rebuild_from(document: &Document) -> Self {
        let mut allocator = IdAllocator::new();
        for id in document.all_ids() {
            if let Some((slug, n)) = split_numbered_id(id) {
                allocator.observe(slug, n);
            }
        }
        allocator
    }
}

/// Split `text-input-7` into `("text-input", 7)`.
fn split_numbered_id(id: &str) -> Option<(&str, u64)> {
    let (slug, digits) = id.rsplit_once('-')?;
    if slug.is_empty() {
        return None;
    }
    let n = digits.parse().ok()?;
    Some((slug, n))
}
