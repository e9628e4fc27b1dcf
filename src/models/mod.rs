pub mod document;
pub mod frequency;
pub mod record;
pub mod request;

pub use document::*;
pub use frequency::*;
pub use record::*;
pub use request::*;
