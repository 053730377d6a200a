pub mod deployment;
pub mod project;
pub mod service;
pub mod variable;

pub use deployment::*;
pub use project::*;
pub use service::*;
pub use variable::*;
