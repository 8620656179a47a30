pub mod safe;
pub mod stream;
pub mod vault;

pub use safe::*;
pub use stream::*;
pub use vault::*;
