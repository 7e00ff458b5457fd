use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;

use log::{debug, trace};

use crate::{MemoryError, Pid, TranslationError};

/// Result of a successful address translation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: usize,
    pub physical_address: usize,
    /// Index inside the process page table
    pub page_index: usize,
    /// Physical page the index maps to
    pub page: usize,
    pub offset: usize,
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Virtual address {} -> Physical address {} (Page {}, Offset {})",
            self.virtual_address, self.physical_address, self.page, self.offset
        )
    }
}

/// Snapshot of the pool occupancy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total_pages: usize,
    pub used_pages: usize,
    pub free_pages: Vec<usize>,
}

/// Fixed pool of pages handed out to processes by count
///
/// Pages are not required to be contiguous: a request for `n` pages is served
/// with the `n` lowest free page ids.
pub struct MemoryManager {
    total_pages: usize,
    page_size: NonZeroUsize,
    /// Unallocated pages, always sorted ascending
    free_pages: Vec<usize>,
    page_tables: HashMap<Pid, Vec<usize>>,
}

impl MemoryManager {
    /// Creates a manager with every page free
    ///
    /// * `total_pages` - capacity of the pool
    /// * `page_size` - number of address units in one page
    pub fn new(total_pages: usize, page_size: NonZeroUsize) -> MemoryManager {
        MemoryManager {
            total_pages,
            page_size,
            free_pages: (0..total_pages).collect(),
            page_tables: HashMap::new(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn free_pages(&self) -> &[usize] {
        &self.free_pages
    }

    pub fn used_pages(&self) -> usize {
        self.total_pages - self.free_pages.len()
    }

    pub fn page_table(&self, pid: Pid) -> Option<&[usize]> {
        self.page_tables.get(&pid).map(|pages| pages.as_slice())
    }

    pub fn usage(&self) -> MemoryUsage {
        MemoryUsage {
            total_pages: self.total_pages,
            used_pages: self.used_pages(),
            free_pages: self.free_pages.clone(),
        }
    }

    /// Reserves `pages_needed` pages for `pid`
    ///
    /// The allocation is all or nothing: on failure the pool is left untouched.
    ///
    /// * `pid` - the process that will own the pages
    /// * `pages_needed` - number of pages requested
    pub fn allocate(&mut self, pid: Pid, pages_needed: usize) -> Result<Vec<usize>, MemoryError> {
        if self.free_pages.len() < pages_needed {
            debug!(
                "Cannot allocate {} pages for PID {}: only {} free",
                pages_needed,
                pid,
                self.free_pages.len()
            );

            return Err(MemoryError::InsufficientMemory {
                requested: pages_needed,
                available: self.free_pages.len(),
            });
        }

        debug_assert!(!self.page_tables.contains_key(&pid), "PID {} already resident", pid);

        let pages: Vec<usize> = self.free_pages.drain(..pages_needed).collect();
        self.page_tables.insert(pid, pages.clone());

        debug!("Allocated {} pages to PID {}: {:?}", pages_needed, pid, pages);
        Ok(pages)
    }

    /// Returns the pages of `pid` to the pool and drops its page table
    ///
    /// Panics if `pid` has no page table: releasing a process that was never
    /// admitted is a bug in the caller.
    ///
    /// * `pid` - the process to release
    /// * `pages` - the pages the caller believes the process owns
    pub fn deallocate(&mut self, pid: Pid, pages: &[usize]) {
        let owned = match self.page_tables.remove(&pid) {
            Some(owned) => owned,
            None => panic!("Fatal error: PID {} has no page table", pid),
        };

        debug_assert_eq!(owned.as_slice(), pages, "page set mismatch for PID {}", pid);

        self.free_pages.extend_from_slice(&owned);
        self.free_pages.sort_unstable();

        debug!("Deallocated pages {:?} from PID {}", owned, pid);
    }

    /// Translates `virtual_address` inside the address space of `pid`
    ///
    /// * `pid` - the process whose page table is used
    /// * `virtual_address` - address relative to the start of the process memory
    pub fn translate(&self, pid: Pid, virtual_address: usize) -> Result<Translation, TranslationError> {
        let pages = self.page_tables.get(&pid).ok_or(TranslationError::NoPageTable(pid))?;

        let page_size = self.page_size.get();
        let page_index = virtual_address / page_size;
        let offset = virtual_address % page_size;

        let page = *pages.get(page_index).ok_or(TranslationError::InvalidPage {
            page_index,
            page_count: pages.len(),
        })?;

        let translation = Translation {
            virtual_address,
            physical_address: page * page_size + offset,
            page_index,
            page,
            offset,
        };

        trace!("PID {}: {}", pid, translation);
        Ok(translation)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::num::NonZeroUsize;

    use super::MemoryManager;
    use crate::{MemoryError, Pid, TranslationError};

    fn manager() -> MemoryManager {
        MemoryManager::new(16, NonZeroUsize::new(1024).unwrap())
    }

    /// Every page id must be either free or owned by exactly one process
    fn assert_conserved(memory: &MemoryManager) {
        let mut seen = BTreeSet::new();

        for page in memory.free_pages.iter().chain(memory.page_tables.values().flatten()) {
            assert!(seen.insert(*page), "page {} accounted twice", page);
        }

        assert_eq!(seen, (0..memory.total_pages).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_allocate_takes_lowest_free_pages() {
        let mut memory = manager();

        assert_eq!(memory.allocate(Pid::new(1), 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(memory.allocate(Pid::new(2), 3).unwrap(), vec![4, 5, 6]);
        assert_eq!(memory.used_pages(), 7);
        assert_conserved(&memory);
    }

    #[test]
    fn test_allocate_is_all_or_nothing() {
        let mut memory = manager();
        memory.allocate(Pid::new(1), 12).unwrap();

        let err = memory.allocate(Pid::new(2), 8).unwrap_err();
        assert_eq!(err, MemoryError::InsufficientMemory { requested: 8, available: 4 });
        assert_eq!(memory.free_pages(), &[12, 13, 14, 15]);
        assert!(memory.page_table(Pid::new(2)).is_none());
        assert_conserved(&memory);
    }

    #[test]
    fn test_deallocate_restores_free_set() {
        let mut memory = manager();
        let first = memory.allocate(Pid::new(1), 4).unwrap();
        let before = memory.free_pages().to_vec();

        let pages = memory.allocate(Pid::new(2), 5).unwrap();
        memory.deallocate(Pid::new(2), &pages);
        assert_eq!(memory.free_pages(), before.as_slice());

        /* The free list stays sorted after out of order releases */
        memory.deallocate(Pid::new(1), &first);
        assert_eq!(memory.free_pages(), (0..16).collect::<Vec<_>>().as_slice());
        assert_conserved(&memory);
    }

    #[test]
    fn test_freed_hole_is_reused() {
        let mut memory = manager();
        memory.allocate(Pid::new(1), 2).unwrap();
        let middle = memory.allocate(Pid::new(2), 2).unwrap();
        memory.allocate(Pid::new(3), 2).unwrap();

        memory.deallocate(Pid::new(2), &middle);
        assert_eq!(memory.allocate(Pid::new(4), 3).unwrap(), vec![2, 3, 6]);
        assert_conserved(&memory);
    }

    #[test]
    #[should_panic(expected = "has no page table")]
    fn test_deallocate_unknown_pid_panics() {
        let mut memory = manager();
        memory.deallocate(Pid::new(9), &[]);
    }

    #[test]
    fn test_translate() {
        let mut memory = manager();
        memory.allocate(Pid::new(1), 2).unwrap();
        memory.allocate(Pid::new(2), 4).unwrap();

        let translation = memory.translate(Pid::new(2), 1500).unwrap();
        assert_eq!(translation.page_index, 1);
        assert_eq!(translation.offset, 476);
        assert_eq!(translation.page, 3);
        assert_eq!(translation.physical_address, 3 * 1024 + 476);
        assert_eq!(
            translation.to_string(),
            "Virtual address 1500 -> Physical address 3548 (Page 3, Offset 476)"
        );
    }

    #[test]
    fn test_translate_failures() {
        let mut memory = manager();
        memory.allocate(Pid::new(1), 1).unwrap();

        assert_eq!(memory.translate(Pid::new(7), 0), Err(TranslationError::NoPageTable(Pid::new(7))));
        assert_eq!(
            memory.translate(Pid::new(1), 1500),
            Err(TranslationError::InvalidPage { page_index: 1, page_count: 1 })
        );
    }
}
