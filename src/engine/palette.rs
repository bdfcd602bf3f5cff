use std::collections::HashMap;

pub const NODE_COLORS: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub const EDGE_COLORS: [&str; 10] = [
    "#5a9bd5", "#e07b39", "#d94452", "#6cc4a4", "#8cc63f", "#f0c040", "#c47ab6", "#ff7f7f",
    "#b8860b", "#7b9ea8",
];

pub const SECONDARY_NODE_COLOR: &str = "#ea4335";
pub const UNLABELED_EDGE_COLOR: &str = "#999999";
const FALLBACK_COLOR: &str = "#cccccc";

/// Assigns colors to labels in first-seen order.
///
/// The color a label receives depends on the order labels arrive in, so two
/// payloads with the same categories in a different row order color
/// differently. Callers wanting reproducible colors must feed labels in a
/// stable order.
#[derive(Clone, Debug)]
pub struct CategoryPalette {
    colors: &'static [&'static str],
    slots: HashMap<String, usize>,
}

impl CategoryPalette {
    pub fn new(colors: &'static [&'static str]) -> Self {
        Self {
            colors,
            slots: HashMap::new(),
        }
    }

    pub fn color(&mut self, label: &str) -> &'static str {
        let next = self.slots.len();
        let slot = *self.slots.entry(label.to_owned()).or_insert(next);

        if self.colors.is_empty() {
            return FALLBACK_COLOR;
        }
        self.colors[slot % self.colors.len()]
    }
}

/// Session-scoped palette state. Node and edge categories never share slots.
#[derive(Clone, Debug)]
pub struct Palettes {
    pub nodes: CategoryPalette,
    pub edges: CategoryPalette,
}

impl Default for Palettes {
    fn default() -> Self {
        Self {
            nodes: CategoryPalette::new(&NODE_COLORS),
            edges: CategoryPalette::new(&EDGE_COLORS),
        }
    }
}
