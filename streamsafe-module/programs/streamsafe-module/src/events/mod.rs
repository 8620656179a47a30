pub mod safe_events;
pub mod stream_events;

pub use safe_events::*;
pub use stream_events::*;
