pub mod container;
pub mod logging;

pub use container::{Container, ContainerConfig};
pub use logging::init_tracing;
