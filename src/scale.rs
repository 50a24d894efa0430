use crate::data::days_to_date;

/// Axis transformation. Log axes are drawn in log10 space with tick labels mapped back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    /// Map a data value into drawing space. Non-positive values have no place on a log axis.
    pub fn transform(&self, value: f64) -> Option<f64> {
        match self {
            AxisScale::Linear => Some(value),
            AxisScale::Log if value > 0.0 => Some(value.log10()),
            AxisScale::Log => None,
        }
    }

    pub fn invert(&self, value: f64) -> f64 {
        match self {
            AxisScale::Linear => value,
            AxisScale::Log => 10f64.powf(value),
        }
    }

    pub fn is_log(&self) -> bool {
        matches!(self, AxisScale::Log)
    }
}

/// How tick values are turned into labels
#[derive(Debug, Clone, PartialEq)]
pub enum TickFormat {
    Number,
    /// values are elapsed days since the Unix epoch
    Date,
    /// values are category indices
    Category(Vec<String>),
}

/// A resolved axis: its transformation plus the visible domain in drawing space
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub scale: AxisScale,
    pub domain: (f64, f64),
    pub format: TickFormat,
}

impl Axis {
    /// Continuous axis covering `values`, padded by 5%
    pub fn continuous(scale: AxisScale, values: &[f64], include_zero: bool, format: TickFormat) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for t in values.iter().filter_map(|&v| scale.transform(v)) {
            min = min.min(t);
            max = max.max(t);
        }

        if min == f64::INFINITY {
            // nothing drawable
            min = 0.0;
            max = 1.0;
        }

        if include_zero && !scale.is_log() {
            if min > 0.0 {
                min = 0.0;
            }
            if max < 0.0 {
                max = 0.0;
            }
        }

        Axis {
            scale,
            domain: pad_range(min, max),
            format,
        }
    }

    /// Category axis with one slot per label, centred on integer positions
    pub fn categorical(labels: Vec<String>) -> Self {
        let n = labels.len().max(1) as f64;
        Axis {
            scale: AxisScale::Linear,
            domain: (-0.5, n - 0.5),
            format: TickFormat::Category(labels),
        }
    }

    /// Where bars start in drawing space
    pub fn baseline(&self) -> f64 {
        match self.scale {
            AxisScale::Linear => 0.0_f64.clamp(self.domain.0, self.domain.1),
            AxisScale::Log => self.domain.0,
        }
    }

    /// Tick label for a position in drawing space
    pub fn label(&self, position: f64) -> String {
        match &self.format {
            TickFormat::Category(labels) => {
                let idx = position.round();
                if (position - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            }
            TickFormat::Date => days_to_date(self.scale.invert(position))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            TickFormat::Number => format_number(self.scale.invert(position)),
        }
    }
}

/// Compact number formatting for tick labels
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-3..1e5).contains(&abs) {
        return format!("{:.1e}", value);
    }
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}
