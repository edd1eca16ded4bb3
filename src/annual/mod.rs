//! Assembling month caches into the persisted annual series.

pub mod assemble;
pub mod export;
pub mod splice;
pub mod stamp;

pub use assemble::assemble;
pub use export::export;
pub use splice::{load_store, splice, Store, StoreOrigin};
pub use stamp::{stamp, Product};
