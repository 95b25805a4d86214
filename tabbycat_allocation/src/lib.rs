pub mod allocator;
pub mod datastructures;
pub mod hungarian;

pub use allocator::{allocate_adjudicators, AllocationError, Allocator};
pub use datastructures::{AllocationInput, PanelAssignment};
pub use hungarian::{HungarianAllocator, HungarianOptions};
