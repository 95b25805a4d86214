pub mod allocation_draw;
pub mod public_draw;

pub use self::allocation_draw::*;
pub use self::public_draw::*;
