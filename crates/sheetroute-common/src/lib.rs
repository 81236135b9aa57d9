pub mod book;
pub mod table;
pub mod value;

pub use book::*;
pub use table::*;
pub use value::*;
