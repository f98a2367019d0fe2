mod json_lines_sink;
mod memory_sink;
mod snapshot_frontend;

pub use json_lines_sink::*;
pub use memory_sink::*;
pub use snapshot_frontend::*;
