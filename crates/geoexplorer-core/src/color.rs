//! Color scales derived from property summaries

pub mod palettes;

use serde_json::Value;

use crate::summary::PropertySummary;

pub use palettes::{from_palettable, scheme, schemes, Category, Scheme};

/// Returned for every value when the scheme is unknown
pub const FALLBACK_COLOR: &str = "#ffffff";

/// How a continuous property maps onto colors
#[derive(Debug, Clone, Default)]
pub struct ScaleOptions {
    /// Quantize in log space (only honored when the minimum is positive)
    pub log: bool,

    /// Quantile scale over `data` instead of a linear domain
    pub quantile: bool,

    /// Replace `[min, max]` of a linear scale with these bounds
    pub clamp: Option<(f64, f64)>,

    /// Raw values for quantile scaling
    pub data: Vec<f64>,
}

/// A value to color function
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    Constant(&'static str),

    /// Distinct values in domain order, colors cycled over the range
    Ordinal {
        domain: Vec<String>,
        range: &'static [&'static str],
    },

    /// Uniform buckets over `[lo, hi]`; with `log` the bounds are logarithms
    Quantize {
        lo: f64,
        hi: f64,
        log: bool,
        range: &'static [&'static str],
    },

    /// Buckets split at the quantiles of the sample
    Quantile {
        thresholds: Vec<f64>,
        range: &'static [&'static str],
    },
}

/// Build a color scale for a property from a ColorBrewer scheme name (or a
/// palettable name such as `colorbrewer.sequential.Blues_9`).
pub fn color_scale(scheme_name: &str, summary: &PropertySummary, options: &ScaleOptions) -> ColorScale {
    let Some((scheme, _)) = from_palettable(scheme_name) else {
        tracing::debug!(scheme = scheme_name, "Unknown color scheme, using constant scale");
        return ColorScale::Constant(FALLBACK_COLOR);
    };
    let sizes = scheme.sizes();
    let largest = scheme.max_size();

    if let Some(values) = &summary.values {
        // Smallest bucket that fits every distinct value, capped at the largest
        let n = sizes.partition_point(|size| *size < values.len()).min(sizes.len() - 1);
        let range = scheme.colors(sizes[n]).unwrap_or_default();
        return ColorScale::Ordinal { domain: values.keys().cloned().collect(), range };
    }

    let range = scheme.colors(largest).unwrap_or_default();
    let min = summary.min.unwrap_or(0.0);
    let max = summary.max.unwrap_or(min);

    if options.log && min > 0.0 {
        let (lo, hi) = widen(min, max);
        return ColorScale::Quantize { lo: lo.ln(), hi: hi.ln(), log: true, range };
    }

    if options.quantile {
        let mut sample: Vec<f64> = options.data.iter().copied().filter(|x| !x.is_nan()).collect();
        if !sample.is_empty() {
            sample.sort_by(f64::total_cmp);
            let thresholds = (1..range.len())
                .map(|k| quantile_sorted(&sample, k as f64 / range.len() as f64))
                .collect();
            return ColorScale::Quantile { thresholds, range };
        }
        tracing::debug!("Quantile scale requested without data, using linear scale");
    }

    let (lo, hi) = match options.clamp {
        Some((lo, hi)) => widen(lo, hi),
        None => widen(min, max),
    };
    ColorScale::Quantize { lo, hi, log: false, range }
}

/// Repair a zero or negative width domain to `[lo, lo + 1]`
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if lo >= hi {
        (lo, lo + 1.0)
    } else {
        (lo, hi)
    }
}

/// R-7 quantile of a sorted, non-empty sample
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let i = h.floor() as usize;
    match sorted.get(i + 1) {
        Some(next) => sorted[i] + (next - sorted[i]) * (h - i as f64),
        None => sorted[i],
    }
}

impl ColorScale {
    /// Color for a JSON property value
    pub fn color(&self, value: &Value) -> Option<&'static str> {
        match value {
            Value::String(text) => self.color_for_text(text),
            Value::Number(number) => number.as_f64().and_then(|x| self.color_for_number(x)),
            _ => match self {
                ColorScale::Constant(color) => Some(*color),
                _ => None,
            },
        }
    }

    pub fn color_for_number(&self, x: f64) -> Option<&'static str> {
        match self {
            ColorScale::Constant(color) => Some(*color),
            ColorScale::Ordinal { .. } => self.color_for_text(&x.to_string()),
            ColorScale::Quantize { lo, hi, log, range } => {
                let t = if *log { x.ln() } else { x };
                if !t.is_finite() || range.is_empty() {
                    return None;
                }
                let n = range.len();
                let i = ((t - lo) / (hi - lo) * n as f64).floor();
                Some(range[i.clamp(0.0, (n - 1) as f64) as usize])
            }
            ColorScale::Quantile { thresholds, range } => {
                if x.is_nan() {
                    return None;
                }
                range.get(thresholds.partition_point(|t| *t <= x)).copied()
            }
        }
    }

    pub fn color_for_text(&self, text: &str) -> Option<&'static str> {
        match self {
            ColorScale::Constant(color) => Some(*color),
            ColorScale::Ordinal { domain, range } => {
                if range.is_empty() {
                    return None;
                }
                domain.iter().position(|v| v == text).map(|i| range[i % range.len()])
            }
            _ => text.trim().parse::<f64>().ok().and_then(|x| self.color_for_number(x)),
        }
    }

    /// Numeric domain of a quantize scale
    pub fn domain(&self) -> Option<(f64, f64)> {
        match self {
            ColorScale::Quantize { lo, hi, .. } => Some((*lo, *hi)),
            _ => None,
        }
    }

    /// Colors this scale maps onto
    pub fn range(&self) -> &[&'static str] {
        match self {
            ColorScale::Constant(color) => std::slice::from_ref(color),
            ColorScale::Ordinal { range, .. }
            | ColorScale::Quantize { range, .. }
            | ColorScale::Quantile { range, .. } => range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(values: &[f64]) -> PropertySummary {
        let mut summary = PropertySummary::default();
        for x in values {
            summary.merge_number(*x);
        }
        summary
    }

    fn categorical(values: &[&str]) -> PropertySummary {
        let mut summary = PropertySummary::default();
        for v in values {
            summary.merge_text(v);
        }
        summary
    }

    #[test]
    fn test_unknown_scheme_is_constant_white() {
        let scale = color_scale("NotAScheme", &numeric(&[1.0]), &ScaleOptions::default());
        assert_eq!(scale, ColorScale::Constant(FALLBACK_COLOR));
        assert_eq!(scale.color_for_number(42.0), Some("#ffffff"));
        assert_eq!(scale.color(&Value::Null), Some("#ffffff"));
    }

    const PALETTABLE_NAMES: &[&str] = &[
        "colorbrewer.sequential.Blues_9",
        "colorbrewer.sequential.BuGn_9",
        "colorbrewer.sequential.BuPu_9",
        "colorbrewer.sequential.GnBu_9",
        "colorbrewer.sequential.Greens_9",
        "colorbrewer.sequential.Greys_9",
        "colorbrewer.sequential.OrRd_9",
        "colorbrewer.sequential.Oranges_9",
        "colorbrewer.sequential.PuBu_9",
        "colorbrewer.sequential.PuBuGn_9",
        "colorbrewer.sequential.PuRd_9",
        "colorbrewer.sequential.Purples_9",
        "colorbrewer.sequential.RdPu_9",
        "colorbrewer.sequential.Reds_9",
        "colorbrewer.sequential.YlGn_9",
        "colorbrewer.sequential.YlGnBu_9",
        "colorbrewer.sequential.YlOrBr_9",
        "colorbrewer.sequential.YlOrRd_9",
        "colorbrewer.diverging.BrBG_11",
        "colorbrewer.diverging.PRGn_11",
        "colorbrewer.diverging.PiYG_11",
        "colorbrewer.diverging.PuOr_11",
        "colorbrewer.diverging.RdBu_11",
        "colorbrewer.diverging.RdGy_11",
        "colorbrewer.diverging.RdYlBu_11",
        "colorbrewer.diverging.RdYlGn_11",
        "colorbrewer.diverging.Spectral_11",
        "colorbrewer.qualitative.Accent_8",
        "colorbrewer.qualitative.Dark2_8",
        "colorbrewer.qualitative.Paired_12",
        "colorbrewer.qualitative.Pastel1_9",
        "colorbrewer.qualitative.Pastel2_8",
        "colorbrewer.qualitative.Set1_9",
        "colorbrewer.qualitative.Set2_8",
        "colorbrewer.qualitative.Set3_12",
    ];

    #[test]
    fn test_every_palettable_name_resolves_to_a_scale() {
        let summary = numeric(&[0.0, 10.0]);
        for name in PALETTABLE_NAMES {
            let (scheme, size) = from_palettable(name).unwrap_or_else(|| panic!("{name} not embedded"));
            let size = size.unwrap();
            assert_eq!(scheme.max_size(), size, "{name}");
            assert_eq!(scheme.palettable(size), *name);

            let scale = color_scale(name, &summary, &ScaleOptions::default());
            assert_ne!(scale, ColorScale::Constant(FALLBACK_COLOR), "{name} fell back");
            assert_eq!(scale.range().len(), size, "{name}");
        }
    }

    #[test]
    fn test_categorical_picks_smallest_fitting_bucket() {
        let scale = color_scale("Set1", &categorical(&["a", "b", "c", "d"]), &ScaleOptions::default());
        assert_eq!(scale.range().len(), 4);
        assert_eq!(scale.color_for_text("a"), Some("#e41a1c"));
        assert_eq!(scale.color_for_text("d"), Some("#984ea3"));
        assert_eq!(scale.color_for_text("zzz"), None);
    }

    #[test]
    fn test_categorical_caps_at_largest_bucket() {
        let values: Vec<String> = (0..20).map(|i| format!("v{i:02}")).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let scale = color_scale("Set1", &categorical(&refs), &ScaleOptions::default());

        assert_eq!(scale.range().len(), 9);
        // Colors cycle past the end of the range
        assert_eq!(scale.color_for_text("v00"), scale.color_for_text("v09"));
    }

    #[test]
    fn test_categorical_few_values_uses_minimum_bucket() {
        let scale = color_scale("Blues", &categorical(&["only"]), &ScaleOptions::default());
        assert_eq!(scale.range().len(), 3);
    }

    #[test]
    fn test_linear_quantize() {
        let scale = color_scale("Blues", &numeric(&[0.0, 9.0]), &ScaleOptions::default());
        let range = scale.range().to_vec();
        assert_eq!(range.len(), 9);

        assert_eq!(scale.color_for_number(0.0), Some(range[0]));
        assert_eq!(scale.color_for_number(9.0), Some(range[8]));
        assert_eq!(scale.color_for_number(4.5), Some(range[4]));
        // Out of domain values clamp to the ends
        assert_eq!(scale.color_for_number(-100.0), Some(range[0]));
        assert_eq!(scale.color_for_number(100.0), Some(range[8]));
    }

    #[test]
    fn test_degenerate_domain_widened() {
        let scale = color_scale("Reds", &numeric(&[7.0, 7.0]), &ScaleOptions::default());
        let (lo, hi) = scale.domain().unwrap();
        assert_eq!((lo, hi), (7.0, 8.0));
        assert!(hi - lo >= 1.0);
        assert!(scale.color_for_number(7.0).is_some());
    }

    #[test]
    fn test_clamped_domain() {
        let options = ScaleOptions { clamp: Some((10.0, 20.0)), ..Default::default() };
        let scale = color_scale("Greens", &numeric(&[0.0, 100.0]), &options);
        assert_eq!(scale.domain(), Some((10.0, 20.0)));

        let range = scale.range().to_vec();
        assert_eq!(scale.color_for_number(5.0), Some(range[0]));
        assert_eq!(scale.color_for_number(25.0), Some(range[range.len() - 1]));
    }

    #[test]
    fn test_log_scale_requires_positive_min() {
        let options = ScaleOptions { log: true, ..Default::default() };

        let scale = color_scale("YlOrRd", &numeric(&[1.0, 1000.0]), &options);
        let (lo, hi) = scale.domain().unwrap();
        assert!((lo - 0.0).abs() < 1e-12);
        assert!((hi - 1000f64.ln()).abs() < 1e-12);
        let range = scale.range().to_vec();
        // ln(20) / ln(1000) * 9 is about 3.9
        assert_eq!(scale.color_for_number(20.0), Some(range[3]));
        assert_eq!(scale.color_for_number(0.0), None);

        let linear = color_scale("YlOrRd", &numeric(&[0.0, 1000.0]), &options);
        assert_eq!(linear.domain(), Some((0.0, 1000.0)));
    }

    #[test]
    fn test_quantile_scale() {
        let data: Vec<f64> = (1..=100).map(f64::from).collect();
        let options = ScaleOptions { quantile: true, data: data.clone(), ..Default::default() };
        let scale = color_scale("Blues", &numeric(&data), &options);

        let range = scale.range().to_vec();
        match &scale {
            ColorScale::Quantile { thresholds, .. } => assert_eq!(thresholds.len(), range.len() - 1),
            other => panic!("expected quantile scale, got {:?}", other),
        }
        assert_eq!(scale.color_for_number(-5.0), Some(range[0]));
        assert_eq!(scale.color_for_number(1000.0), Some(range[range.len() - 1]));
        assert_eq!(scale.color_for_number(f64::NAN), None);
    }

    #[test]
    fn test_quantile_without_data_falls_back_to_linear() {
        let options = ScaleOptions { quantile: true, ..Default::default() };
        let scale = color_scale("Blues", &numeric(&[0.0, 1.0]), &options);
        assert_eq!(scale.domain(), Some((0.0, 1.0)));
    }

    #[test]
    fn test_quantile_sorted_interpolates() {
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
        assert_eq!(quantile_sorted(&[5.0], 0.9), 5.0);
    }

    #[test]
    fn test_palettable_scheme_name_accepted() {
        let scale = color_scale("colorbrewer.sequential.Blues_9", &numeric(&[0.0, 1.0]), &ScaleOptions::default());
        assert_eq!(scale.range().len(), 9);
    }

    #[test]
    fn test_text_values_on_numeric_scale() {
        let scale = color_scale("Blues", &numeric(&[0.0, 9.0]), &ScaleOptions::default());
        assert_eq!(scale.color(&Value::String("9".into())), scale.color_for_number(9.0));
        assert_eq!(scale.color(&Value::Bool(true)), None);
    }
}
