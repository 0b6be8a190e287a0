// Application-stage pipeline: pure logic shared by every tracked-job route.
// Nothing in here touches the database, the cache or the network.

pub mod board;
pub mod hired_slot;
pub mod stage;
pub mod stage_map;

pub use stage::StageKind;
pub use stage_map::{last_completed_stage, StageError, StageMap};
