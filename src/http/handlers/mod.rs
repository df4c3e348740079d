pub mod accounts;
pub mod classes;
pub mod core;
pub mod essays;
pub mod topics;
