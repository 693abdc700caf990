pub mod graphrag;
pub mod retriever;
pub mod template;
pub mod text2cypher;
pub mod vector;
pub mod vector_graph;

pub use graphrag::{GraphRag, RagResult};
pub use retriever::Retriever;
pub use template::{RagTemplate, DEFAULT_RAG_TEMPLATE};
pub use text2cypher::{CypherResult, Text2Cypher};
pub use vector::{ChunkHit, VectorRetriever};
pub use vector_graph::{GraphContext, RelTriple, VectorGraphRetriever};
