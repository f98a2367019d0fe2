mod fact_sink;
mod java_frontend;
mod resolution_oracle;

pub use fact_sink::*;
pub use java_frontend::*;
pub use resolution_oracle::*;
