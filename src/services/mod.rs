pub mod repository;
pub mod store;
pub mod time_slots;
