/*!
 * Memory Types
 * Common types for paged memory management
 */

use crate::core::limits::{
    PRESSURE_CRITICAL_PERCENT, PRESSURE_HIGH_PERCENT, PRESSURE_MEDIUM_PERCENT,
};
use crate::core::types::{Megabytes, PageIndex, Pid};
use serde::{Deserialize, Serialize};

/// Contents of one page frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "owner", rename_all = "snake_case")]
pub enum PageSlot {
    #[default]
    Free,
    Owned(Pid),
}

impl PageSlot {
    #[inline]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self, PageSlot::Free)
    }

    #[inline]
    #[must_use]
    pub const fn owner(&self) -> Option<Pid> {
        match self {
            PageSlot::Free => None,
            PageSlot::Owned(pid) => Some(*pid),
        }
    }
}

/// One row of the page table as shown to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSlotView {
    pub index: PageIndex,
    pub owner: Option<Pid>,
}

/// Memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: Megabytes,
    pub used_memory: Megabytes,
    pub available_memory: Megabytes,
    pub usage_percentage: f64,
    pub total_pages: usize,
    pub used_pages: usize,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        if self.usage_percentage >= PRESSURE_CRITICAL_PERCENT {
            MemoryPressure::Critical
        } else if self.usage_percentage >= PRESSURE_HIGH_PERCENT {
            MemoryPressure::High
        } else if self.usage_percentage >= PRESSURE_MEDIUM_PERCENT {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
