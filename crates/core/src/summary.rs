//! Bullet-point summaries parsed from generator replies.

use serde::{Serialize, Serializer};

/// Maximum number of points kept from a reply.
pub const SUMMARY_POINTS: usize = 5;

const PLACEHOLDER_POINTS: [&str; SUMMARY_POINTS] = [
    "Key concept 1: Main topic overview and importance",
    "Key concept 2: Supporting details and examples",
    "Key concept 3: Practical applications and use cases",
    "Key concept 4: Benefits and advantages",
    "Key concept 5: Summary and conclusions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    points: Vec<String>,
    synthetic: bool,
}

impl Summary {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            points: PLACEHOLDER_POINTS.iter().map(|p| (*p).to_string()).collect(),
            synthetic: true,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[String] {
        &self.points
    }

    /// True when the points are the fixed stand-in rather than model output.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.points)
    }
}

fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| matches!(c, '•' | '-' | '*' | ' '))
        .trim_end()
}

/// Parse up to `SUMMARY_POINTS` bullet lines.
///
/// Falls back to the placeholder summary when `raw` is `None` or contains no
/// usable line.
#[must_use]
pub fn parse_summary(raw: Option<&str>) -> Summary {
    let Some(raw) = raw else {
        return Summary::placeholder();
    };

    let points: Vec<String> = raw
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .take(SUMMARY_POINTS)
        .map(str::to_owned)
        .collect();

    if points.is_empty() {
        return Summary::placeholder();
    }
    Summary {
        points,
        synthetic: false,
    }
}
