pub mod donor;
pub mod page;

pub use donor::*;
pub use page::*;
