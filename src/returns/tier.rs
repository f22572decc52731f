use crate::config::TierThresholds;
use crate::decimal::Money;
use crate::types::Tier;

/// maps cumulative qualifying principal to a withdrawal tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierClassifier {
    thresholds: TierThresholds,
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::new(TierThresholds::default())
    }
}

impl TierClassifier {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    /// lower bounds are inclusive
    pub fn classify(&self, qualifying_principal: Money) -> Tier {
        if qualifying_principal >= self.thresholds.tier_three {
            Tier::Three
        } else if qualifying_principal >= self.thresholds.tier_two {
            Tier::Two
        } else {
            Tier::One
        }
    }

    /// principal needed to enter the next tier, None at the top
    pub fn next_tier_requirement(&self, tier: Tier) -> Option<Money> {
        match tier {
            Tier::One => Some(self.thresholds.tier_two),
            Tier::Two => Some(self.thresholds.tier_three),
            Tier::Three => None,
        }
    }

    /// lower bound of a tier
    pub fn lower_bound(&self, tier: Tier) -> Money {
        match tier {
            Tier::One => Money::ZERO,
            Tier::Two => self.thresholds.tier_two,
            Tier::Three => self.thresholds.tier_three,
        }
    }
}

/// classify with the default thresholds
pub fn classify(qualifying_principal: Money) -> Tier {
    TierClassifier::default().classify(qualifying_principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(Money::from_major(999_999)), Tier::One);
        assert_eq!(classify(Money::from_major(1_000_000)), Tier::Two);
        assert_eq!(classify(Money::from_major(4_999_999)), Tier::Two);
        assert_eq!(classify(Money::from_major(5_000_000)), Tier::Three);
        assert_eq!(classify(Money::ZERO), Tier::One);
    }

    #[test]
    fn test_just_below_threshold_by_a_cent() {
        assert_eq!(classify(Money::from_cents(499_999_999_99)), Tier::Two);
    }

    #[test]
    fn test_next_tier_requirement() {
        let classifier = TierClassifier::default();
        assert_eq!(classifier.next_tier_requirement(Tier::One), Some(Money::from_major(1_000_000)));
        assert_eq!(classifier.next_tier_requirement(Tier::Two), Some(Money::from_major(5_000_000)));
        assert_eq!(classifier.next_tier_requirement(Tier::Three), None);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = TierClassifier::new(TierThresholds {
            tier_two: Money::from_major(100),
            tier_three: Money::from_major(200),
        });
        assert_eq!(classifier.classify(Money::from_major(150)), Tier::Two);
        assert_eq!(classifier.lower_bound(Tier::Three), Money::from_major(200));
    }

    proptest! {
        #[test]
        fn prop_classify_is_monotonic(a in 0i64..10_000_000, b in 0i64..10_000_000) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(Money::from_major(low)) <= classify(Money::from_major(high)));
        }

        #[test]
        fn prop_classified_tier_bounds_input(amount in 0i64..10_000_000) {
            let classifier = TierClassifier::default();
            let money = Money::from_major(amount);
            let tier = classifier.classify(money);
            prop_assert!(classifier.lower_bound(tier) <= money);
            if let Some(next) = classifier.next_tier_requirement(tier) {
                prop_assert!(money < next);
            }
        }
    }
}
