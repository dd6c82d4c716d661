//! Zones and the zone manager, the sole owner of card placement.

pub mod manager;
pub mod zone;

pub use manager::ZoneManager;
pub use zone::{Placement, Zone};
