pub mod activity;
pub mod store;
pub mod view;
