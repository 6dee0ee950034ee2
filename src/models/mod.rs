pub mod driver;
pub mod event;
pub mod order;
pub mod ride_request;
pub mod route;
