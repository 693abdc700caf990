use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// Node labels the extraction prompt offers and the graph accepts.
pub const NODE_LABELS: &[&str] = &[
    "Document",
    "Chunk",
    "Entity",
    "Supplier",
    "Component",
    "Product",
];

/// Relationship types the extraction prompt offers and the graph accepts.
pub const RELATIONSHIP_TYPES: &[&str] = &[
    "HAS_CHUNK",
    "HAS_ENTITY",
    "CAN_SUPPLY",
    "USED_IN",
    "SUPPLIES",
    "MENTIONS",
    "REFERS_TO",
    "LINKS_TO",
];

// Wire format: what the model is instructed to emit.

#[derive(Debug, Deserialize)]
pub struct ExtractedGraph {
    #[serde(default)]
    pub nodes: Vec<ExtractionNode>,
    #[serde(default)]
    pub relationships: Vec<ExtractionRelationship>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractionNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub properties: NodeProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeProperties {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractionRelationship {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start_node_id: String,
    pub end_node_id: String,
    #[serde(default)]
    pub properties: RelationshipProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelationshipProperties {
    #[serde(default)]
    pub details: Option<String>,
}

// Domain format: node-id references resolved to entity names.

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRelation {
    pub source: String,
    pub target: String,
    pub rel_type: String,
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChunkGraph {
    pub entities: Vec<ExtractedEntity>,
    pub relations: Vec<ExtractedRelation>,
}

impl ExtractedGraph {
    /// Resolve node-id references into named entities and relations.
    ///
    /// Model output is untrusted: labels outside the allowed set fall
    /// back to `Entity`, relationship types outside the allowed set are
    /// skipped, and relationships naming unknown node ids are skipped.
    pub fn resolve(self) -> ChunkGraph {
        let mut names: HashMap<String, String> = HashMap::new();
        let mut entities = Vec::new();

        for node in self.nodes {
            let name = node
                .properties
                .name
                .unwrap_or_else(|| node.id.clone())
                .trim()
                .to_string();
            if name.is_empty() {
                warn!(node_id = %node.id, "skipping extracted node without a name");
                continue;
            }

            let label = if NODE_LABELS.contains(&node.label.as_str()) {
                node.label
            } else {
                warn!(label = %node.label, "unknown node label, storing as Entity");
                "Entity".to_string()
            };

            names.entry(node.id).or_insert_with(|| name.clone());
            entities.push(ExtractedEntity { name, label });
        }

        let mut relations = Vec::new();
        for rel in self.relationships {
            let (Some(source), Some(target)) =
                (names.get(&rel.start_node_id), names.get(&rel.end_node_id))
            else {
                warn!(
                    start = %rel.start_node_id,
                    end = %rel.end_node_id,
                    "skipping relationship with unknown node id"
                );
                continue;
            };

            if !RELATIONSHIP_TYPES.contains(&rel.rel_type.as_str()) {
                warn!(rel_type = %rel.rel_type, "skipping relationship with unknown type");
                continue;
            }

            relations.push(ExtractedRelation {
                source: source.clone(),
                target: target.clone(),
                rel_type: rel.rel_type,
                details: rel.properties.details.unwrap_or_default(),
            });
        }

        ChunkGraph {
            entities,
            relations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ExtractedGraph {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn resolves_ids_to_names() {
        let graph = parse(
            r#"{
                "nodes": [
                    {"id": "0", "label": "Supplier", "properties": {"name": "Acme Corp"}},
                    {"id": "1", "label": "Component", "properties": {"name": "Widget"}}
                ],
                "relationships": [
                    {"type": "SUPPLIES", "start_node_id": "0", "end_node_id": "1",
                     "properties": {"details": "since 2019"}}
                ]
            }"#,
        );

        let resolved = graph.resolve();
        assert_eq!(resolved.entities.len(), 2);
        assert_eq!(
            resolved.relations,
            vec![ExtractedRelation {
                source: "Acme Corp".to_string(),
                target: "Widget".to_string(),
                rel_type: "SUPPLIES".to_string(),
                details: "since 2019".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_label_falls_back_to_entity() {
        let graph = parse(
            r#"{"nodes": [{"id": "0", "label": "Planet", "properties": {"name": "Mars"}}],
                "relationships": []}"#,
        );

        let resolved = graph.resolve();
        assert_eq!(resolved.entities[0].label, "Entity");
        assert_eq!(resolved.entities[0].name, "Mars");
    }

    #[test]
    fn unknown_rel_type_is_skipped() {
        let graph = parse(
            r#"{
                "nodes": [
                    {"id": "0", "label": "Entity", "properties": {"name": "A"}},
                    {"id": "1", "label": "Entity", "properties": {"name": "B"}}
                ],
                "relationships": [
                    {"type": "DESTROYS", "start_node_id": "0", "end_node_id": "1"}
                ]
            }"#,
        );

        assert!(graph.resolve().relations.is_empty());
    }

    #[test]
    fn dangling_node_reference_is_skipped() {
        let graph = parse(
            r#"{
                "nodes": [{"id": "0", "label": "Entity", "properties": {"name": "A"}}],
                "relationships": [
                    {"type": "MENTIONS", "start_node_id": "0", "end_node_id": "99"}
                ]
            }"#,
        );

        assert!(graph.resolve().relations.is_empty());
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let graph = parse(
            r#"{"nodes": [{"id": "carbon-fiber", "label": "Component"}],
                "relationships": []}"#,
        );

        let resolved = graph.resolve();
        assert_eq!(resolved.entities[0].name, "carbon-fiber");
    }

    #[test]
    fn missing_details_defaults_to_empty() {
        let graph = parse(
            r#"{
                "nodes": [
                    {"id": "0", "label": "Entity", "properties": {"name": "A"}},
                    {"id": "1", "label": "Entity", "properties": {"name": "B"}}
                ],
                "relationships": [
                    {"type": "LINKS_TO", "start_node_id": "0", "end_node_id": "1"}
                ]
            }"#,
        );

        assert_eq!(graph.resolve().relations[0].details, "");
    }
}
