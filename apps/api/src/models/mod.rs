pub mod cv;
pub mod sections;
pub mod user;
