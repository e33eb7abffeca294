/*!
 * Page Table
 * Fixed-size frame table backing every process's memory demand
 *
 * ## Allocation
 *
 * - A request of `m` MB needs `ceil(m / page_size)` frames
 * - Frames are claimed lowest-index first, so allocation is deterministic
 * - Allocation is all-or-nothing: a failed request leaves the table and the
 *   process untouched
 *
 * ## Accounting
 *
 * Used memory is derived from the number of owned frames, so it can never
 * drift from the table contents.
 */

use super::types::{MemoryStats, PageSlot, PageSlotView};
use crate::core::types::{Megabytes, PageIndex};
use crate::process::Process;
use tracing::{debug, info};

/// Page table with `total / page_size` frames
#[derive(Debug, Clone)]
pub struct PageTable {
    slots: Vec<PageSlot>,
    page_size_mb: Megabytes,
    used_pages: usize,
}

impl PageTable {
    pub fn new(total_memory_mb: Megabytes, page_size_mb: Megabytes) -> Self {
        let page_count = (total_memory_mb / page_size_mb.max(1)) as usize;
        info!(
            page_count,
            page_size_mb, "Page table initialized with lowest-index-first allocation"
        );
        Self {
            slots: vec![PageSlot::Free; page_count],
            page_size_mb: page_size_mb.max(1),
            used_pages: 0,
        }
    }

    /// Frames required for a request, rounding up
    #[inline]
    #[must_use]
    pub fn pages_needed(&self, memory_mb: Megabytes) -> usize {
        memory_mb.div_ceil(self.page_size_mb) as usize
    }

    /// Back a process's memory demand with frames
    ///
    /// Returns false, changing nothing, when fewer than the needed frames are
    /// free. A process already holding frames is considered satisfied.
    pub fn allocate(&mut self, process: &mut Process) -> bool {
        if !process.pages.is_empty() {
            return true;
        }

        let needed = self.pages_needed(process.memory_mb);
        if self.free_slots() < needed {
            debug!(
                pid = process.pid,
                needed,
                free = self.free_slots(),
                "Page allocation refused"
            );
            return false;
        }

        let mut claimed = Vec::with_capacity(needed);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if claimed.len() == needed {
                break;
            }
            if slot.is_free() {
                *slot = PageSlot::Owned(process.pid);
                claimed.push(index);
            }
        }

        self.used_pages += claimed.len();
        debug!(pid = process.pid, pages = ?claimed, "Pages allocated");
        process.pages = claimed;
        true
    }

    /// Release every frame the process owns; returns the number freed
    pub fn free(&mut self, process: &mut Process) -> usize {
        let mut freed = 0;
        for &index in &process.pages {
            if let Some(slot) = self.slots.get_mut(index) {
                if slot.owner() == Some(process.pid) {
                    *slot = PageSlot::Free;
                    freed += 1;
                }
            }
        }
        self.used_pages -= freed;
        process.pages.clear();

        if freed > 0 {
            debug!(pid = process.pid, freed, "Pages released");
        }
        freed
    }

    /// Repack owned frames toward index 0 in the given process order
    ///
    /// Every process holding frames must be passed; each ends up with a
    /// contiguous run. Returns how many frames changed position.
    pub fn compact<'a, I>(&mut self, processes: I) -> usize
    where
        I: IntoIterator<Item = &'a mut Process>,
    {
        let mut packed = vec![PageSlot::Free; self.slots.len()];
        let mut cursor = 0;
        let mut moved = 0;

        for process in processes {
            if process.pages.is_empty() {
                continue;
            }
            let run: Vec<PageIndex> = (cursor..cursor + process.pages.len()).collect();
            for (&old, &new) in process.pages.iter().zip(&run) {
                if old != new {
                    moved += 1;
                }
                packed[new] = PageSlot::Owned(process.pid);
            }
            cursor += run.len();
            process.pages = run;
        }

        debug_assert_eq!(cursor, self.used_pages, "compaction skipped a page holder");
        self.slots = packed;
        self.used_pages = cursor;
        info!(moved, used_pages = cursor, "Page table compacted");
        moved
    }

    /// Mark every frame free
    pub fn clear(&mut self) {
        self.slots.fill(PageSlot::Free);
        self.used_pages = 0;
    }

    #[inline]
    pub fn page_size(&self) -> Megabytes {
        self.page_size_mb
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn used_pages(&self) -> usize {
        self.used_pages
    }

    #[inline]
    pub fn free_slots(&self) -> usize {
        self.slots.len() - self.used_pages
    }

    /// Pages in use times page size
    #[inline]
    pub fn used_memory(&self) -> Megabytes {
        self.used_pages as Megabytes * self.page_size_mb
    }

    #[inline]
    pub fn total_memory(&self) -> Megabytes {
        self.slots.len() as Megabytes * self.page_size_mb
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    pub fn views(&self) -> Vec<PageSlotView> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| PageSlotView {
                index,
                owner: slot.owner(),
            })
            .collect()
    }

    pub fn stats(&self) -> MemoryStats {
        let total = self.total_memory();
        let used = self.used_memory();
        MemoryStats {
            total_memory: total,
            used_memory: used,
            available_memory: total - used,
            usage_percentage: if total == 0 {
                0.0
            } else {
                (used as f64 / total as f64) * 100.0
            },
            total_pages: self.slots.len(),
            used_pages: self.used_pages,
        }
    }
}
