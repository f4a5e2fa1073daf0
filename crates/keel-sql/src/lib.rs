pub mod serializer;
pub use serializer::{Serializer, Slot};

pub mod ty;
pub use ty::Type;

pub use keel_core::driver::Flavor;
