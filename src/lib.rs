pub mod attendance;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod payroll;

pub use config::Config;
pub use db::init_db;
pub use error::{Error, Result};
