use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Primary,
    Secondary,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub magnitude: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    #[serde(alias = "source")]
    pub source_id: String,
    #[serde(alias = "target")]
    pub target_id: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl GraphPayload {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

/// Category assigned to secondary nodes converted from investment documents.
pub const INVESTOR_CATEGORY: &str = "VC";

#[derive(Clone, Debug, Deserialize)]
pub(super) struct CompanyRecord {
    pub(super) name: String,
    #[serde(default)]
    pub(super) valuation: f64,
    pub(super) sector: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct InvestorRecord {
    pub(super) name: String,
    #[serde(default, rename = "totalInvestment")]
    pub(super) total_investment: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct InvestmentRecord {
    pub(super) vc: String,
    pub(super) company: String,
    #[serde(default)]
    pub(super) amount: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct InvestmentDocument {
    pub(super) companies: Vec<CompanyRecord>,
    #[serde(default)]
    pub(super) vcs: Vec<InvestorRecord>,
    #[serde(default)]
    pub(super) investments: Vec<InvestmentRecord>,
}

impl From<InvestmentDocument> for GraphPayload {
    fn from(document: InvestmentDocument) -> Self {
        let mut nodes = Vec::with_capacity(document.companies.len() + document.vcs.len());

        for company in document.companies {
            nodes.push(NodeRecord {
                id: company.name.clone(),
                name: company.name,
                category: company.sector,
                kind: NodeKind::Primary,
                magnitude: company.valuation,
            });
        }

        for investor in document.vcs {
            nodes.push(NodeRecord {
                id: investor.name.clone(),
                name: investor.name,
                category: INVESTOR_CATEGORY.to_owned(),
                kind: NodeKind::Secondary,
                magnitude: investor.total_investment,
            });
        }

        let links = document
            .investments
            .into_iter()
            .map(|investment| LinkRecord {
                source_id: investment.vc,
                target_id: investment.company,
                weight: investment.amount,
                label: None,
            })
            .collect();

        Self { nodes, links }
    }
}
