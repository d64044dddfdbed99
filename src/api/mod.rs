pub mod health;
pub mod latency;
pub mod render;
pub mod routes;
