pub mod pipeline;
pub mod schema;
pub mod writer;

pub use pipeline::KgPipeline;
pub use schema::{apply_schema, ensure_vector_index, SCHEMA_STATEMENTS, VECTOR_INDEX_NAME};
pub use writer::GraphWriter;
