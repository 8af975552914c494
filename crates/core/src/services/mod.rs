pub mod generate;
pub mod toolchain;

pub use generate::{generate_from_library, generate_from_listings, GenerateError, GenerationReport};
pub use toolchain::{LibraryToolchain, ToolError, WatcomToolchain};
