//! Background Tasks Module
//!
//! Contains background tasks that run periodically next to the caches.
//!
//! # Tasks
//! - Maintenance: runs every registered cache's clean-up hook at a fixed
//!   interval

mod maintenance;

pub use maintenance::spawn_maintenance_task;
