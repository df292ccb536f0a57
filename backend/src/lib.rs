pub mod classifier;
pub mod location;
pub mod notify;
pub mod routes;
