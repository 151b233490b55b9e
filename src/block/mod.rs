pub mod definition;
pub mod kind;
pub mod value;

pub use definition::*;
pub use kind::*;
pub use value::*;
