//! Per-key bit-flip mutation.

use rand::distributions::{Bernoulli, Distribution};

use crate::schema::Rule;

use super::encode::RuleRng;
use super::search::EvolutionError;

impl RuleRng {
    /// Return a copy of `rule` where each defined value flips independently
    /// with probability `rate`. Undefined pattern keys stay undefined.
    pub fn mutate(&mut self, rule: &Rule, rate: f64) -> Result<Rule, EvolutionError> {
        let flip = Bernoulli::new(rate).map_err(|_| EvolutionError::InvalidMutationRate(rate))?;

        let table = rule
            .table()
            .iter()
            .map(|value| match value {
                Some(bit) if flip.sample(&mut self.rng) => Some(bit ^ 1),
                other => *other,
            })
            .collect();

        Ok(Rule::from_raw(rule.encoding(), table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_is_identity() {
        let mut rng = RuleRng::new(42);
        let rule = rng.encode_pattern();
        assert_eq!(rng.mutate(&rule, 0.0).unwrap(), rule);
    }

    #[test]
    fn test_rate_one_flips_everything() {
        let mut rng = RuleRng::new(42);
        let rule = rng.encode_living();
        let mutated = rng.mutate(&rule, 1.0).unwrap();
        for i in 0..rule.key_count() {
            assert_eq!(mutated.get(i), rule.get(i).map(|v| v ^ 1));
        }
    }

    #[test]
    fn test_rate_is_per_key() {
        let mut rng = RuleRng::new(7);
        let rule = rng.encode_pattern();
        let mutated = rng.mutate(&rule, 0.5).unwrap();
        let flipped = (0..rule.key_count())
            .filter(|&i| mutated.get(i) != rule.get(i))
            .count();
        assert!(flipped > 150 && flipped < 362);
    }

    #[test]
    fn test_undefined_keys_stay_undefined() {
        let mut rng = RuleRng::new(0);
        let partial = Rule::from_entries([("000000001", 0u8)]).unwrap();
        let mutated = rng.mutate(&partial, 1.0).unwrap();
        assert_eq!(mutated.get(1), Some(1));
        assert_eq!(mutated.entries().count(), 1);
    }

    #[test]
    fn test_invalid_rate() {
        let mut rng = RuleRng::new(0);
        let rule = rng.encode_living();
        assert!(matches!(
            rng.mutate(&rule, -0.1),
            Err(EvolutionError::InvalidMutationRate(_))
        ));
        assert!(rng.mutate(&rule, f64::NAN).is_err());
    }
}
