pub mod add;
pub mod common;
pub mod delete;
pub mod edit;
pub mod list;
pub mod status;
pub mod sync;
pub mod toggle;
