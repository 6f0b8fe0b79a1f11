use overlayrank::layout::CenterBand;
use overlayrank::{OverlayBox, PositionValidator, Role, ValidatorConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-9;

fn random_coord(rng: &mut StdRng) -> f64 {
    match rng.random_range(0..10) {
        0 => f64::NAN,
        1 => -rng.random_range(0.0..500.0),
        2 => rng.random_range(100.0..1000.0),
        3 => 0.0,
        _ => rng.random_range(0.0..100.0),
    }
}

fn random_box(rng: &mut StdRng) -> OverlayBox {
    if rng.random_bool(0.2) {
        OverlayBox::pixels(
            rng.random_range(-200.0..1400.0),
            rng.random_range(-200.0..800.0),
            rng.random_range(-50.0..1500.0),
            rng.random_range(-50.0..900.0),
        )
    } else {
        OverlayBox::percent(
            random_coord(rng),
            random_coord(rng),
            random_coord(rng),
            random_coord(rng),
        )
    }
}

fn assert_valid(cfg: &ValidatorConfig, b: &OverlayBox, input: &OverlayBox) {
    let m = cfg.margin_percent;
    assert!(b.use_percentage, "{input:?} -> {b:?}");
    assert!(b.is_finite(), "{input:?} -> {b:?}");
    assert!(b.width > 0.0 && b.height > 0.0, "{input:?} -> {b:?}");
    assert!(b.x >= m - TOL && b.x <= 100.0 - m - b.width + TOL, "{input:?} -> {b:?}");
    assert!(b.y >= m - TOL && b.y <= 100.0 - m - b.height + TOL, "{input:?} -> {b:?}");
    assert!(b.width <= cfg.max_width_percent + TOL, "{input:?} -> {b:?}");
    if let Some(band) = cfg.center_band {
        let (cx, cy) = b.center();
        assert!(!band.contains(cx, cy), "{input:?} -> {b:?} centered in band");
    }
}

#[test]
fn random_boxes_always_come_back_valid() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let validator = PositionValidator::default();
    let cfg = validator.config().clone();
    for _ in 0..5_000 {
        let input = random_box(&mut rng);
        let fixed = validator.validate(&input, 1200, 627);
        assert_valid(&cfg, &fixed, &input);
        assert!(validator.is_compliant(&fixed));
    }
}

#[test]
fn validation_is_idempotent_with_defaults() {
    let mut rng = StdRng::seed_from_u64(7);
    let validator = PositionValidator::default();
    for _ in 0..2_000 {
        let once = validator.validate(&random_box(&mut rng), 800, 800);
        let twice = validator.validate(&once, 800, 800);
        assert!((once.x - twice.x).abs() < 1e-9);
        assert!((once.y - twice.y).abs() < 1e-9);
        assert!((once.width - twice.width).abs() < 1e-9);
        assert!((once.height - twice.height).abs() < 1e-9);
    }
}

#[test]
fn invariants_hold_across_margins_and_bands() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let margin = rng.random_range(0.0..20.0);
        let lo = rng.random_range(margin + 1.0..49.0);
        let hi = rng.random_range(51.0..99.0 - margin);
        let validator = PositionValidator::new(ValidatorConfig {
            margin_percent: margin,
            center_band: Some(CenterBand { lo, hi }),
            ..ValidatorConfig::default()
        });
        let cfg = validator.config().clone();
        for _ in 0..50 {
            let input = random_box(&mut rng);
            let fixed = validator.validate(&input, 1000, 500);
            assert_valid(&cfg, &fixed, &input);
        }
    }
}

#[test]
fn separated_layouts_never_overlap() {
    const ROLES: [Role; 7] = [
        Role::Headline,
        Role::Subhead,
        Role::Tagline,
        Role::Body,
        Role::Cta,
        Role::Caption,
        Role::Hashtag,
    ];
    let mut rng = StdRng::seed_from_u64(0x57ac);
    for _ in 0..300 {
        let margin = rng.random_range(0.0..20.0);
        let lo = rng.random_range(margin + 1.0..49.0);
        let hi = rng.random_range(51.0..99.0 - margin);
        let validator = PositionValidator::new(ValidatorConfig {
            margin_percent: margin,
            center_band: Some(CenterBand { lo, hi }),
            stack_gap_percent: rng.random_range(0.0..5.0),
            ..ValidatorConfig::default()
        });
        let cfg = validator.config().clone();

        let count = rng.random_range(1..=8);
        let roles: Vec<Role> = (0..count)
            .map(|_| ROLES[rng.random_range(0..ROLES.len())])
            .collect();
        let inputs: Vec<OverlayBox> = (0..count).map(|_| random_box(&mut rng)).collect();
        let mut boxes: Vec<OverlayBox> = inputs
            .iter()
            .map(|b| validator.validate(b, 1000, 800))
            .collect();
        validator.separate(&mut boxes, &roles);

        for (i, (a, input)) in boxes.iter().zip(&inputs).enumerate() {
            assert_valid(&cfg, a, input);
            for b in &boxes[i + 1..] {
                assert!(!a.intersects(b, TOL), "{a:?} overlaps {b:?}");
            }
        }
    }
}

#[test]
fn pixel_boxes_are_converted_to_percent() {
    let validator = PositionValidator::default();
    let fixed = validator.validate(&OverlayBox::pixels(120.0, 62.7, 600.0, 125.4), 1200, 627);
    assert!(fixed.use_percentage);
    assert!((fixed.x - 10.0).abs() < 1e-9);
    assert!((fixed.y - 10.0).abs() < 1e-9);
    assert!((fixed.width - 50.0).abs() < 1e-9);
    assert!((fixed.height - 20.0).abs() < 1e-9);
}

#[test]
fn compliant_boxes_are_left_alone() {
    let validator = PositionValidator::default();
    let input = OverlayBox::percent(8.0, 12.0, 45.0, 20.0);
    assert_eq!(validator.validate(&input, 1200, 627), input);
}

#[test]
fn out_of_range_width_resets_to_canonical() {
    let validator = PositionValidator::default();
    let narrow = validator.validate(&OverlayBox::percent(8.0, 8.0, 5.0, 10.0), 800, 800);
    assert_eq!(narrow.width, 60.0);
    let wide = validator.validate(&OverlayBox::percent(8.0, 8.0, 95.0, 10.0), 800, 800);
    assert_eq!(wide.width, 60.0);
}

#[test]
fn nan_box_gets_defaults() {
    let validator = PositionValidator::default();
    let fixed = validator.validate(
        &OverlayBox::percent(f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        800,
        800,
    );
    assert_eq!((fixed.x, fixed.y, fixed.width, fixed.height), (5.0, 5.0, 60.0, 15.0));
}

#[test]
fn disabled_band_allows_centered_boxes() {
    let validator = PositionValidator::new(ValidatorConfig {
        center_band: None,
        ..ValidatorConfig::default()
    });
    let input = OverlayBox::percent(20.0, 40.0, 60.0, 20.0);
    assert_eq!(validator.validate(&input, 800, 800), input);
}

#[test]
fn config_validation_reports_bad_fields() {
    assert!(ValidatorConfig::default().validate().is_ok());
    let bad = ValidatorConfig {
        margin_percent: 30.0,
        ..ValidatorConfig::default()
    };
    assert!(bad.validate().is_err());
    let bad_band = ValidatorConfig {
        center_band: Some(CenterBand { lo: 60.0, hi: 40.0 }),
        ..ValidatorConfig::default()
    };
    assert!(bad_band.validate().is_err());
}
