use crate::schema::{NODE_LABELS, RELATIONSHIP_TYPES};

pub fn build_extraction_prompt(chunk_text: &str) -> String {
    format!(
        r#"Extract entities and relationships from the following text to build a knowledge graph.

INSTRUCTIONS:
1. Identify the entities mentioned in the text and give each one a label
2. Extract the relationships between those entities
3. Output ONLY valid JSON, nothing else
4. Use the exact schema below

SCHEMA:
{{
  "nodes": [
    {{"id": "0", "label": "Supplier", "properties": {{"name": "entity name"}}}}
  ],
  "relationships": [
    {{"type": "SUPPLIES", "start_node_id": "0", "end_node_id": "1", "properties": {{"details": "short description of the relationship"}}}}
  ]
}}

RULES:
- Assign a unique string id to each node and reuse it to define relationships
- Node labels must be one of: {labels}
- Relationship types must be one of: {rel_types}
- Respect the relationship direction from start_node_id to end_node_id
- Output ONLY the JSON object, no markdown, no code blocks, no explanations

TEXT:
{text}

JSON OUTPUT:"#,
        labels = NODE_LABELS.join(", "),
        rel_types = RELATIONSHIP_TYPES.join(", "),
        text = chunk_text,
    )
}
