//! Services that bundle the store and the sync engine for clients

mod shopping;

pub use shopping::ShoppingService;
