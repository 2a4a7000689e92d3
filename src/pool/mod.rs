// Pool-side state: the immutable snapshot, the tick index and the swap state machine.

pub mod slot0;
pub mod swap;
pub mod tick_storage;
