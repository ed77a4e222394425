pub mod clock;
pub mod command;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
