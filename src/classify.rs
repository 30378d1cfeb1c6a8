use crate::models::Band;
use crate::policy::BandThresholds;

/// Maps a rate to its severity band. Lower bounds are inclusive; a higher
/// rate never classifies to a worse band, whatever thresholds the caller
/// injects.
pub fn classify(rate_percent: u8, thresholds: BandThresholds) -> Band {
    if rate_percent >= thresholds.good {
        Band::Good
    } else if rate_percent >= thresholds.warning {
        Band::Warning
    } else {
        Band::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: BandThresholds = BandThresholds { good: 90, warning: 70 };

    #[test]
    fn bands_follow_expected_tiers() {
        assert_eq!(classify(95, DEFAULT), Band::Good);
        assert_eq!(classify(80, DEFAULT), Band::Warning);
        assert_eq!(classify(50, DEFAULT), Band::Critical);
    }

    #[test]
    fn lower_bounds_are_inclusive() {
        assert_eq!(classify(90, DEFAULT), Band::Good);
        assert_eq!(classify(89, DEFAULT), Band::Warning);
        assert_eq!(classify(70, DEFAULT), Band::Warning);
        assert_eq!(classify(69, DEFAULT), Band::Critical);
    }

    #[test]
    fn zero_and_full_rates_classify() {
        assert_eq!(classify(0, DEFAULT), Band::Critical);
        assert_eq!(classify(100, DEFAULT), Band::Good);
    }

    #[test]
    fn thresholds_are_injectable() {
        let calendar_legacy = BandThresholds { good: 90, warning: 80 };
        assert_eq!(classify(85, calendar_legacy), Band::Warning);
        assert_eq!(classify(79, calendar_legacy), Band::Critical);
    }

    #[test]
    fn monotonic_over_full_rate_sweep() {
        for thresholds in [DEFAULT, BandThresholds { good: 90, warning: 80 }] {
            let mut previous = classify(0, thresholds);
            for rate in 1..=100u8 {
                let band = classify(rate, thresholds);
                assert!(band >= previous, "band regressed at rate {rate}");
                previous = band;
            }
        }
    }
}
