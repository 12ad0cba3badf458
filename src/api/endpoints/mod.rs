pub mod chat;
pub mod health;
pub mod results;
pub mod treatment;
pub mod upload;
