pub mod activity;
pub mod coordinate;
pub mod route;
