pub mod context;
pub mod registry;
