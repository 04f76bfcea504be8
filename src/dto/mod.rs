pub mod auth;
pub mod cart;
pub mod items;
pub mod operator;
pub mod orders;
pub mod reviews;
