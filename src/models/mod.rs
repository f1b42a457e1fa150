pub mod media_item;
pub mod natural_size;
pub mod placement;

pub use media_item::*;
pub use natural_size::*;
pub use placement::*;
