pub mod auth;
pub mod cart;
pub mod domains;
pub mod invoices;
pub mod nif;
pub mod orders;
pub mod payments;
pub mod products;
