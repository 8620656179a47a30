pub mod safe;
pub mod stream;
pub mod vault;
