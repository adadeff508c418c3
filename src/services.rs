pub mod activities;
pub mod ids;
pub mod session;
pub mod stats;
pub mod theme;
pub mod view;
