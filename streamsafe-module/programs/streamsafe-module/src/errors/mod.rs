pub mod safe_errors;
pub mod stream_errors;

pub use safe_errors::*;
pub use stream_errors::*;
