pub mod checkout;
pub mod checkout_item;
pub mod delivery;
pub mod notification;
pub mod product;
