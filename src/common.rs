pub mod names;
pub mod xml;

pub use names::{is_reserved, sanitize, UniqueNames};
pub use xml::XSD_NAMESPACE;
