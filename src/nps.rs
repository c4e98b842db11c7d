//! NPS bucketing and scoring.
//!
//! Buckets use inclusive boundaries on the 0-10 survey scale: up to 6 is a
//! detractor, 7 and 8 are neutral, 9 and above is a promoter. Values that
//! fall strictly between the buckets (6 < s < 7, 8 < s < 9) land in none of
//! them and are excluded from the totals.

use serde::Serialize;

/// Favourable responses at which the reclassified volume term reaches 100%.
pub const RECLASSIFIED_VOLUME_DIVISOR: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Detractor,
    Neutral,
    Promoter,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Detractor, Segment::Neutral, Segment::Promoter];

    /// Bucket a score. Returns `None` for NaN and for values between buckets.
    pub fn classify(score: f64) -> Option<Segment> {
        if score <= 6.0 {
            Some(Segment::Detractor)
        } else if (7.0..=8.0).contains(&score) {
            Some(Segment::Neutral)
        } else if score >= 9.0 {
            Some(Segment::Promoter)
        } else {
            None
        }
    }

    /// Chart/report label with the score range.
    pub fn label(self) -> &'static str {
        match self {
            Segment::Detractor => "Detrattori (0-6)",
            Segment::Neutral => "Neutri (7-8)",
            Segment::Promoter => "Promotori (9-10)",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Segment::Detractor => "Detrattori",
            Segment::Neutral => "Neutri",
            Segment::Promoter => "Promotori",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Segment::Detractor => "#FF4B4B",
            Segment::Neutral => "#FFA500",
            Segment::Promoter => "#00D4AA",
        }
    }
}

/// Per-segment response counts.
///
/// `total_responses` is always the sum of the three buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentCounts {
    pub detractors: u64,
    pub neutrals: u64,
    pub promoters: u64,
    pub total_responses: u64,
}

impl SegmentCounts {
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts = SegmentCounts::default();
        for score in scores {
            counts.add(score);
        }
        counts
    }

    pub fn add(&mut self, score: f64) {
        match Segment::classify(score) {
            Some(Segment::Detractor) => self.detractors += 1,
            Some(Segment::Neutral) => self.neutrals += 1,
            Some(Segment::Promoter) => self.promoters += 1,
            None => {
                log::debug!("Score {} falls outside every NPS bucket, skipping", score);
                return;
            }
        }
        self.total_responses += 1;
    }

    pub fn get(&self, segment: Segment) -> u64 {
        match segment {
            Segment::Detractor => self.detractors,
            Segment::Neutral => self.neutrals,
            Segment::Promoter => self.promoters,
        }
    }

    /// Net balance as a fraction of responses; 0 when there are none.
    fn net_ratio(&self) -> f64 {
        if self.total_responses == 0 {
            return 0.0;
        }
        (self.promoters as f64 - self.detractors as f64) / self.total_responses as f64
    }

    /// Standard NPS in percent, in [-100, 100]. Zero responses yield 0.
    pub fn nps_percent(&self) -> f64 {
        self.net_ratio() * 100.0
    }

    /// Leaderboard score: net balance plus a volume term for favourable
    /// responses (promoters + neutrals).
    ///
    /// The volume term reaches 100% at 40 favourable responses and is not
    /// capped past that.
    pub fn nps_reclassified_percent(&self) -> f64 {
        let favourable = (self.promoters + self.neutrals) as f64;
        (self.net_ratio() + favourable / RECLASSIFIED_VOLUME_DIVISOR) * 100.0
    }

    /// Share of a segment over all responses, in percent.
    pub fn share_percent(&self, segment: Segment) -> f64 {
        if self.total_responses == 0 {
            return 0.0;
        }
        self.get(segment) as f64 / self.total_responses as f64 * 100.0
    }
}
