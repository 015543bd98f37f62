use proptest::prelude::*;

use treasury_curves::report::{hit_rate, wmae};

proptest! {
    #[test]
    fn perfect_fit_scores(
        quotes in prop::collection::vec((50.0f64..150.0, 0.0f64..2.0, 0.05f64..30.0), 1..40)
    ) {
        let bid: Vec<f64> = quotes.iter().map(|q| q.0).collect();
        let ask: Vec<f64> = quotes.iter().map(|q| q.0 + q.1).collect();
        let duration: Vec<f64> = quotes.iter().map(|q| q.2).collect();
        let mid: Vec<f64> = bid.iter().zip(&ask).map(|(b, a)| (b + a) * 0.5).collect();

        prop_assert_eq!(wmae(&mid, &bid, &ask, &duration).unwrap(), 0.0);
        prop_assert_eq!(hit_rate(&mid, &bid, &ask).unwrap(), 1.0);
    }

    #[test]
    fn wmae_is_bounded_by_largest_error(
        quotes in prop::collection::vec((90.0f64..110.0, -3.0f64..3.0, 0.1f64..30.0), 1..40)
    ) {
        let bid: Vec<f64> = quotes.iter().map(|q| q.0 - 0.25).collect();
        let ask: Vec<f64> = quotes.iter().map(|q| q.0 + 0.25).collect();
        let model: Vec<f64> = quotes.iter().map(|q| q.0 + q.1).collect();
        let duration: Vec<f64> = quotes.iter().map(|q| q.2).collect();

        let worst = quotes.iter().map(|q| q.1.abs()).fold(0.0, f64::max);
        let v = wmae(&model, &bid, &ask, &duration).unwrap();
        prop_assert!(v >= 0.0 && v <= worst + 1e-9);
        let h = hit_rate(&model, &bid, &ask).unwrap();
        prop_assert!((0.0..=1.0).contains(&h));
    }
}

#[test]
fn half_the_models_inside_the_band() {
    let h = hit_rate(&[100.0, 105.0], &[99.0, 100.0], &[101.0, 104.0]).unwrap();
    assert_eq!(h, 0.5);
}

#[test]
fn model_on_mid_has_zero_wmae() {
    let v = wmae(&[101.0, 100.0], &[100.0, 99.0], &[102.0, 101.0], &[1.0, 2.0]).unwrap();
    assert_eq!(v, 0.0);
}
