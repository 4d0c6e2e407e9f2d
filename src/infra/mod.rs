pub mod json_input_adapter;
pub mod json_output_adapter;

pub use json_input_adapter::JsonFileInputAdapter;
pub use json_output_adapter::{JsonLinesOutputAdapter, MemoryOutputAdapter};
