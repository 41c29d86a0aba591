pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod portal_key;
