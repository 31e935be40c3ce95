use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost category a line item or realized cost entry belongs to.
///
/// Every category carries its own markup percentage. Unrecognized category
/// strings are routed to [`CostCategory::Other`] rather than rejected, so
/// aggregation never drops a cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum CostCategory {
    Elements,
    Trusses,
    /// Windows, doors and worksite deliveries
    Products,
    Installation,
    Transportation,
    Design,
    Other,
}

impl CostCategory {
    /// All categories in display order.
    pub const ALL: [CostCategory; 7] = [
        CostCategory::Elements,
        CostCategory::Trusses,
        CostCategory::Products,
        CostCategory::Installation,
        CostCategory::Transportation,
        CostCategory::Design,
        CostCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::Elements => "elements",
            CostCategory::Trusses => "trusses",
            CostCategory::Products => "products",
            CostCategory::Installation => "installation",
            CostCategory::Transportation => "transportation",
            CostCategory::Design => "design",
            CostCategory::Other => "other",
        }
    }

    /// Strict parse. Returns `None` for anything outside the known set.
    pub fn parse(raw: &str) -> Option<CostCategory> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        let category = match normalized.as_str() {
            "elements" | "element" => CostCategory::Elements,
            "trusses" | "truss" => CostCategory::Trusses,
            "products" | "product" | "windowsdoors" | "worksitedeliveries"
            | "worksitedelivery" => CostCategory::Products,
            "installation" => CostCategory::Installation,
            "transportation" | "transport" => CostCategory::Transportation,
            "design" => CostCategory::Design,
            "other" => CostCategory::Other,
            _ => return None,
        };
        Some(category)
    }

    /// Lenient parse: unknown categories fall into [`CostCategory::Other`].
    pub fn parse_or_other(raw: &str) -> CostCategory {
        CostCategory::parse(raw).unwrap_or_else(|| {
            tracing::warn!(category = raw, "unknown cost category, routing to 'other'");
            CostCategory::Other
        })
    }
}

impl From<String> for CostCategory {
    fn from(raw: String) -> Self {
        CostCategory::parse_or_other(&raw)
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
