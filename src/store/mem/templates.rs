use async_trait::async_trait;
use tracing::trace;

use super::catalog::authenticate;
use crate::{
    CanvasError, Result,
    model::{Edge, GraphSnapshot, Node, NodeData, NodePayload, NodeType, NotePayload, XYPosition},
    store::{Collect, NewTemplate, StoreIden, Template, TemplateCatalog},
    utils,
};

/// Template catalog kept in memory, seeded with the builtin templates.
#[derive(Debug, Clone)]
pub struct MemTemplates {
    templates: Collect<Template>,
}

impl Default for MemTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl MemTemplates {
    pub fn new() -> Self {
        let templates = Collect::new(StoreIden::Templates);
        for template in builtin_templates() {
            templates.create(&template);
        }
        Self {
            templates,
        }
    }

    /// Catalog with no templates at all.
    pub fn empty() -> Self {
        Self {
            templates: Collect::new(StoreIden::Templates),
        }
    }
}

#[async_trait]
impl TemplateCatalog for MemTemplates {
    async fn list_templates(
        &self,
        token: &str,
    ) -> Result<Vec<Template>> {
        trace!("templates::list_templates()");
        authenticate(token)?;
        Ok(self.templates.list())
    }

    async fn get_template(
        &self,
        token: &str,
        template_id: &str,
    ) -> Result<Template> {
        trace!("templates::get_template({})", template_id);
        authenticate(token)?;
        self.templates.update(template_id, |t| t.downloads += 1).map_err(|_| CanvasError::NotFound("Template not found.".to_string()))
    }

    async fn create_template(
        &self,
        token: &str,
        template: NewTemplate,
    ) -> Result<Template> {
        trace!("templates::create_template({})", template.name);
        authenticate(token)?;
        let record = Template {
            id: format!("tpl-{}", utils::shortid()),
            name: template.name,
            description: template.description,
            category: template.category,
            downloads: 0,
            rating: 0.0,
            is_featured: false,
            node_count: template.structure.nodes.len(),
            edge_count: template.structure.edges.len(),
            structure: template.structure,
            created_at: utils::time::time_rfc3339(),
        };
        if !self.templates.create(&record) {
            return Err(CanvasError::Catalog(format!("template already exists: {}", record.id)));
        }
        Ok(record)
    }
}

fn node(
    id: &str,
    node_type: NodeType,
    x: f64,
    y: f64,
    title: &str,
) -> Node {
    Node::new(id, XYPosition::new(x, y), NodeData::new(title, NodePayload::empty(node_type)))
}

fn builtin_templates() -> Vec<Template> {
    let mut suspects = node("3", NodeType::Note, 350.0, 50.0, "Initial Suspects");
    suspects.data.payload = NodePayload::Note(NotePayload {
        text: Some("- Wallet A\n- Exchange B".to_string()),
    });
    let investigation = GraphSnapshot::new(
        vec![
            node("1", NodeType::Database, 50.0, 50.0, "Case Evidence DB"),
            node("2", NodeType::LiveFeed, 50.0, 250.0, "BTC Transaction Feed"),
            suspects,
            node("4", NodeType::Api, 350.0, 250.0, "Wallet Analysis API"),
            node("5", NodeType::AiAnalysis, 650.0, 150.0, "Pattern Detection"),
        ],
        vec![Edge::new("e1-3", "1", "3"), Edge::new("e2-4", "2", "4"), Edge::new("e3-5", "3", "5"), Edge::new("e4-5", "4", "5")],
    );

    let created_at = utils::time::time_rfc3339();
    vec![
        Template {
            id: "tpl-1".to_string(),
            name: "Crypto Fraud Investigation".to_string(),
            description: "A starter template for tracking illicit cryptocurrency flows between wallets and exchanges.".to_string(),
            category: "Legal & Investigation".to_string(),
            downloads: 1254,
            rating: 4.8,
            is_featured: true,
            node_count: investigation.nodes.len(),
            edge_count: investigation.edges.len(),
            structure: investigation,
            created_at: created_at.clone(),
        },
        Template {
            id: "tpl-2".to_string(),
            name: "Market Arbitrage Monitor".to_string(),
            description: "Compare live prices from multiple exchanges to spot arbitrage opportunities.".to_string(),
            category: "Trading & Finance".to_string(),
            downloads: 3280,
            rating: 4.9,
            is_featured: true,
            node_count: 0,
            edge_count: 0,
            structure: GraphSnapshot::default(),
            created_at,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_templates_builtin() {
        let templates = MemTemplates::new();
        let list = templates.list_templates("token").await.unwrap();
        assert_eq!(list.len(), 2);

        let tpl = templates.get_template("token", "tpl-1").await.unwrap();
        assert_eq!(tpl.downloads, 1255);
        assert_eq!(tpl.structure.nodes.len(), 5);
        assert_eq!(tpl.structure.edges.len(), 4);
        assert!(tpl.structure.dangling_edges().is_empty());
        assert_eq!(tpl.structure.node("3").unwrap().node_type(), NodeType::Note);
    }

    #[tokio::test]
    async fn test_templates_create_and_errors() {
        let templates = MemTemplates::empty();
        assert!(matches!(templates.list_templates("").await, Err(CanvasError::Auth(_))));
        assert_eq!(templates.get_template("token", "tpl-1").await, Err(CanvasError::NotFound("Template not found.".to_string())));

        let created = templates
            .create_template("token", NewTemplate {
                name: "Mine".to_string(),
                description: String::new(),
                category: "Custom".to_string(),
                structure: GraphSnapshot::new(vec![node("a", NodeType::Chart, 0.0, 0.0, "c")], vec![]),
            })
            .await
            .unwrap();
        assert!(created.id.starts_with("tpl-"));
        assert_eq!(created.node_count, 1);
        assert_eq!(created.edge_count, 0);
        assert_eq!(templates.get_template("token", &created.id).await.unwrap().downloads, 1);
    }
}
