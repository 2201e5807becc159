//! Screen modules for the form builder TUI

pub mod builder;
pub mod dashboard;
pub mod viewer;

pub use builder::BuilderScreen;
pub use dashboard::DashboardScreen;
pub use viewer::ViewerScreen;
