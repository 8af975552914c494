pub mod generate;
pub mod scan;

pub use generate::*;
pub use scan::*;
