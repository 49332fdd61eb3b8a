// Core checkout services
pub mod checkout_status;
pub mod checkouts;

// Invoice shaping and pagination
pub mod invoicing;

// Catalog management
pub mod deliveries;
pub mod products;

// Admin panel support
pub mod dashboard;
pub mod notifications;
