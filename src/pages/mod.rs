pub mod connect;
pub mod lineage;
pub mod not_found;
