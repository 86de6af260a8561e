pub mod blockchain;
pub mod chat;
pub mod education;
pub mod health;
pub mod market;
pub mod news;
pub mod portfolio;
pub mod tools;
