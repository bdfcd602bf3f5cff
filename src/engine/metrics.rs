use std::collections::HashMap;

/// Which attribute drives node radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SizeMetric {
    /// Valuation for primary nodes, total investment for secondary nodes.
    Magnitude,
    /// Number of link endpoints touching the node.
    Degree,
}

impl SizeMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Magnitude => "magnitude",
            Self::Degree => "degree",
        }
    }

    pub fn auto(effective_magnitudes: &[f64]) -> Self {
        if effective_magnitudes.iter().any(|value| *value > 0.0) {
            Self::Magnitude
        } else {
            Self::Degree
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DegreeIndex {
    degrees: HashMap<String, usize>,
}

impl DegreeIndex {
    pub fn from_links<'a>(links: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut degrees = HashMap::new();
        for (source, target) in links {
            *degrees.entry(source.to_owned()).or_insert(0) += 1;
            *degrees.entry(target.to_owned()).or_insert(0) += 1;
        }
        Self { degrees }
    }

    pub fn degree(&self, id: &str) -> usize {
        self.degrees.get(id).copied().unwrap_or(0)
    }

    pub fn max_degree(&self) -> usize {
        self.degrees.values().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.degrees.values().sum()
    }
}

/// Sum of link weights touching each node id.
pub fn aggregate_weights<'a>(
    links: impl IntoIterator<Item = (&'a str, &'a str, f64)>,
) -> HashMap<String, f64> {
    let mut totals = HashMap::new();
    for (source, target, weight) in links {
        *totals.entry(source.to_owned()).or_insert(0.0) += weight;
        if source != target {
            *totals.entry(target.to_owned()).or_insert(0.0) += weight;
        }
    }
    totals
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleKind {
    Linear,
    /// Area, not radius, grows linearly with the input.
    Sqrt,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricScale {
    kind: ScaleKind,
    domain: Option<(f64, f64)>,
    range: (f32, f32),
}

impl MetricScale {
    pub fn linear(values: impl IntoIterator<Item = f64>, range: [f32; 2]) -> Self {
        Self::fit(ScaleKind::Linear, values, range)
    }

    pub fn sqrt(values: impl IntoIterator<Item = f64>, range: [f32; 2]) -> Self {
        Self::fit(ScaleKind::Sqrt, values, range)
    }

    pub fn with_domain(kind: ScaleKind, min: f64, max: f64, range: [f32; 2]) -> Self {
        Self {
            kind,
            domain: Some((min, max)),
            range: (range[0], range[1]),
        }
    }

    fn fit(kind: ScaleKind, values: impl IntoIterator<Item = f64>, range: [f32; 2]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            if !value.is_finite() {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
        }

        let domain = (min <= max).then_some((min, max));
        Self {
            kind,
            domain,
            range: (range[0], range[1]),
        }
    }

    pub fn midpoint(&self) -> f32 {
        (self.range.0 + self.range.1) * 0.5
    }

    pub fn apply(&self, value: f64) -> f32 {
        let Some((min, max)) = self.domain else {
            return self.midpoint();
        };

        let (lower, upper, input) = match self.kind {
            ScaleKind::Linear => (min, max, value),
            ScaleKind::Sqrt => (
                min.max(0.0).sqrt(),
                max.max(0.0).sqrt(),
                value.max(0.0).sqrt(),
            ),
        };

        let span = upper - lower;
        if span.abs() < f64::EPSILON || !input.is_finite() {
            return self.midpoint();
        }

        let t = ((input - lower) / span).clamp(0.0, 1.0) as f32;
        self.range.0 + (self.range.1 - self.range.0) * t
    }
}
