pub mod conversion;
pub mod definition;
pub mod document;
pub mod template;

pub use conversion::*;
pub use definition::*;
pub use document::*;
pub use template::*;
