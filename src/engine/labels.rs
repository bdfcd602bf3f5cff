pub const ELLIPSIS: char = '\u{2026}';
const LABEL_WIDTH_FACTOR: f32 = 1.6;

/// Rendered text width, supplied by whatever draws the text.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Fixed advance per character, for hosts without a font system.
#[derive(Clone, Copy, Debug)]
pub struct EstimatedMeasure {
    pub advance_ratio: f32,
}

impl Default for EstimatedMeasure {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasure for EstimatedMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.advance_ratio
    }
}

pub fn label_font_size(radius: f32) -> f32 {
    (radius / 2.5).clamp(8.0, 14.0)
}

/// Smallest radius that still earns a label: the top `quantile` of nodes,
/// never fewer than `min_count` (or every node when there are fewer).
pub fn label_threshold(radii: &[f32], quantile: f32, min_count: usize) -> Option<f32> {
    if radii.is_empty() {
        return None;
    }

    let mut sorted = radii.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let quantile_count = (sorted.len() as f32 * quantile.clamp(0.0, 1.0)).floor() as usize;
    let cutoff = min_count
        .saturating_sub(1)
        .max(quantile_count.saturating_sub(1));
    Some(sorted[cutoff.min(sorted.len() - 1)])
}

pub fn truncate_label(
    text: &str,
    max_width: f32,
    font_size: f32,
    measure: &impl TextMeasure,
) -> String {
    if text.chars().count() <= 1 || measure.text_width(text, font_size) <= max_width {
        return text.to_owned();
    }

    let mut label = text.to_owned();
    let mut candidate = String::with_capacity(label.len() + ELLIPSIS.len_utf8());
    loop {
        candidate.clear();
        candidate.push_str(&label);
        candidate.push(ELLIPSIS);
        if label.chars().count() <= 1 || measure.text_width(&candidate, font_size) <= max_width {
            break;
        }
        label.pop();
    }

    label.push(ELLIPSIS);
    label
}

/// Label text per node, in input order. `None` means the node stays unlabeled.
pub fn declutter(
    nodes: &[(&str, f32)],
    quantile: f32,
    min_count: usize,
    measure: &impl TextMeasure,
) -> Vec<Option<String>> {
    let radii = nodes.iter().map(|(_, radius)| *radius).collect::<Vec<_>>();
    let Some(threshold) = label_threshold(&radii, quantile, min_count) else {
        return Vec::new();
    };

    nodes
        .iter()
        .map(|&(name, radius)| {
            if name.is_empty() || radius < threshold {
                return None;
            }
            let font_size = label_font_size(radius);
            Some(truncate_label(
                name,
                radius * LABEL_WIDTH_FACTOR,
                font_size,
                measure,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CharWidth(f32);

    impl TextMeasure for CharWidth {
        fn text_width(&self, text: &str, _font_size: f32) -> f32 {
            text.chars().count() as f32 * self.0
        }
    }

    #[test]
    fn top_fifth_of_a_hundred_nodes_is_labeled() {
        let names = (0..100).map(|index| format!("n{index}")).collect::<Vec<_>>();
        let nodes = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.as_str(), index as f32 + 1.0))
            .collect::<Vec<_>>();

        let labels = declutter(&nodes, 0.2, 5, &CharWidth(0.1));
        let labeled = labels.iter().filter(|label| label.is_some()).count();
        assert_eq!(labeled, 20);
        assert!(labels[99].is_some());
        assert!(labels[80].is_some());
        assert!(labels[79].is_none());
    }

    #[test]
    fn ties_at_the_threshold_are_all_labeled() {
        let mut radii = vec![10.0_f32; 30];
        radii.extend(std::iter::repeat_n(1.0, 70));
        assert_eq!(label_threshold(&radii, 0.2, 5), Some(10.0));
    }

    #[test]
    fn small_graphs_label_every_node() {
        let nodes = [("a", 4.0), ("b", 9.0), ("c", 16.0)];
        let labels = declutter(&nodes, 0.2, 5, &CharWidth(0.1));
        assert!(labels.iter().all(Option::is_some));
    }

    #[test]
    fn minimum_count_applies_to_mid_sized_graphs() {
        let radii = (0..10).map(|index| index as f32).collect::<Vec<_>>();
        assert_eq!(label_threshold(&radii, 0.2, 5), Some(5.0));
        assert_eq!(label_threshold(&[], 0.2, 5), None);
    }

    #[test]
    fn empty_names_are_skipped() {
        let nodes = [("", 20.0), ("b", 20.0)];
        let labels = declutter(&nodes, 0.2, 5, &CharWidth(1.0));
        assert_eq!(labels, vec![None, Some("b".to_owned())]);
    }

    #[test]
    fn long_labels_are_truncated_with_ellipsis() {
        let measure = CharWidth(10.0);
        let label = truncate_label("Andreessen Horowitz", 60.0, 12.0, &measure);
        assert_eq!(label, "Andre\u{2026}");
        assert!(measure.text_width(&label, 12.0) <= 60.0);
    }

    #[test]
    fn fitting_labels_are_untouched() {
        assert_eq!(truncate_label("Lyft", 100.0, 12.0, &CharWidth(10.0)), "Lyft");
    }

    #[test]
    fn single_characters_are_never_truncated() {
        assert_eq!(truncate_label("X", 1.0, 12.0, &CharWidth(10.0)), "X");
        assert_eq!(truncate_label("Uber", 1.0, 12.0, &CharWidth(10.0)), "U\u{2026}");
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let label = truncate_label("Société Générale", 50.0, 12.0, &CharWidth(10.0));
        assert_eq!(label, "Soci\u{2026}");
    }

    #[test]
    fn font_size_is_bounded() {
        assert_eq!(label_font_size(5.0), 8.0);
        assert_eq!(label_font_size(25.0), 10.0);
        assert_eq!(label_font_size(80.0), 14.0);
    }
}
