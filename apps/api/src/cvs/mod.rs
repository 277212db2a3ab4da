pub mod analysis;
pub mod handlers;
pub mod replicate;
pub mod scope;
