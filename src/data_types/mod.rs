pub mod axis;
pub mod data;
pub mod options;
pub mod plot_configs;
pub mod resolution;

pub use axis::*;
pub use data::*;
pub use options::*;
pub use plot_configs::*;
pub use resolution::*;
