pub mod auth;
pub mod categories;
pub mod files;
pub mod menu;
pub mod orders;
pub mod products;
pub mod restaurants;
