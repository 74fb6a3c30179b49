pub mod business;
pub mod profile;
pub mod role;
