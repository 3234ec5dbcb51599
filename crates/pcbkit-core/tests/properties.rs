use pcbkit_core::{format_length, parse_length, Coordi, MeasurementSystem};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = Coordi> {
    (-1_000_000_000i64..1_000_000_000, -1_000_000_000i64..1_000_000_000)
        .prop_map(|(x, y)| Coordi::new(x, y))
}

proptest! {
    #[test]
    fn displayed_length_parses_back_within_rounding(nm in -1_000_000_000i64..1_000_000_000) {
        let text = format_length(nm, MeasurementSystem::Metric);
        let parsed = parse_length(&text, MeasurementSystem::Imperial).unwrap();
        prop_assert!((parsed - nm).abs() <= 5_000, "{} -> {} -> {}", nm, text, parsed);
    }

    #[test]
    fn min_max_bound_both_points(a in coord(), b in coord()) {
        let lo = a.min(b);
        let hi = a.max(b);
        prop_assert!(lo.x <= a.x && lo.x <= b.x && lo.y <= a.y && lo.y <= b.y);
        prop_assert!(hi.x >= a.x && hi.x >= b.x && hi.y >= a.y && hi.y >= b.y);
    }

    #[test]
    fn subtraction_inverts_addition(a in coord(), b in coord()) {
        prop_assert_eq!((a - b) + b, a);
    }
}
