use overlayrank::color::{contrast_ratio, BackgroundTone};
use overlayrank::image::Rgb8;
use overlayrank::{
    Color, ContrastAnalyzer, ContrastConfig, ContrastDecision, ImageView, OverlayBox, Scene,
};

fn solid(width: usize, height: usize, rgb: Rgb8) -> Vec<Rgb8> {
    vec![rgb; width * height]
}

fn decide(data: &[Rgb8], width: usize, height: usize, candidate: Option<Color>) -> ContrastDecision {
    let view = ImageView::from_slice(data, width, height).unwrap();
    ContrastAnalyzer::default().analyze(
        &Scene::from_view(view),
        &OverlayBox::percent(10.0, 10.0, 40.0, 20.0),
        candidate,
    )
}

#[test]
fn ratio_extremes() {
    assert!((contrast_ratio(1.0, 0.0) - 21.0).abs() < 1e-12);
    assert!((contrast_ratio(0.0, 1.0) - 21.0).abs() < 1e-12);
    assert_eq!(contrast_ratio(0.3, 0.3), 1.0);
}

#[test]
fn white_background_gets_black_text_with_light_effects() {
    let data = solid(800, 800, [255, 255, 255]);
    let d = decide(&data, 800, 800, None);
    assert_eq!(d.tone, BackgroundTone::Light);
    assert_eq!(d.text_color.to_hex(), "#000000");
    assert_eq!(d.shadow_color, Color::WHITE);
    assert_eq!(d.stroke_color, Color::WHITE);
    assert!(d.stroke_width > 0.0);
    assert_eq!(d.background, Some(Color::WHITE));
    assert!((d.contrast_ratio.unwrap() - 21.0).abs() < 1e-9);
}

#[test]
fn mid_gray_is_medium_with_white_text() {
    let data = solid(120, 63, [128, 128, 128]);
    let d = decide(&data, 120, 63, None);
    assert_eq!(d.tone, BackgroundTone::Medium);
    assert_eq!(d.text_color, Color::WHITE);
    assert_eq!(d.shadow_blur, 10.0);
    assert_eq!(d.stroke_width, 0.0);
}

#[test]
fn black_background_is_dark() {
    let data = solid(64, 64, [0, 0, 0]);
    let d = decide(&data, 64, 64, None);
    assert_eq!(d.tone, BackgroundTone::Dark);
    assert_eq!(d.text_color, Color::WHITE);
}

#[test]
fn readable_candidate_colors_survive() {
    let data = solid(64, 64, [0, 0, 0]);
    let yellow = Color::parse_hex("#FFD400").unwrap();
    let navy = Color::parse_hex("#1A237E").unwrap();
    assert_eq!(decide(&data, 64, 64, Some(yellow)).text_color, yellow);
    assert_eq!(decide(&data, 64, 64, Some(navy)).text_color, Color::WHITE);
}

#[test]
fn thresholds_are_configurable() {
    let data = solid(64, 64, [128, 128, 128]);
    let view = ImageView::from_slice(&data, 64, 64).unwrap();
    let analyzer = ContrastAnalyzer::new(ContrastConfig {
        light_threshold: 0.2,
        ..ContrastConfig::default()
    });
    let d = analyzer.analyze(
        &Scene::from_view(view),
        &OverlayBox::percent(0.0, 0.0, 100.0, 100.0),
        None,
    );
    assert_eq!(d.tone, BackgroundTone::Light);
    assert_eq!(d.text_color, Color::BLACK);
}

#[test]
fn sample_is_clamped_at_image_edges() {
    let mut data = solid(100, 100, [0, 0, 0]);
    for y in 0..100 {
        for x in 90..100 {
            data[y * 100 + x] = [255, 255, 255];
        }
    }
    let view = ImageView::from_slice(&data, 100, 100).unwrap();
    let mean = ContrastAnalyzer::default()
        .sample_mean(
            &Scene::from_view(view),
            &OverlayBox::percent(95.0, 45.0, 10.0, 10.0),
        )
        .unwrap();
    // Square spans x in [75, 100): 10 of 25 columns are white.
    assert!((mean[0] - 255.0 * 10.0 / 25.0).abs() < 1e-9);
}

#[test]
fn sample_ignores_row_padding_of_strided_views() {
    let (width, height, stride) = (100, 100, 120);
    let mut data = vec![[255u8, 0, 0]; stride * height];
    for y in 0..height {
        for x in 0..width {
            data[y * stride + x] = [20, 20, 20];
        }
    }
    let view = ImageView::new(&data, width, height, stride).unwrap();
    let mean = ContrastAnalyzer::default()
        .sample_mean(
            &Scene::from_view(view),
            &OverlayBox::percent(95.0, 95.0, 10.0, 10.0),
        )
        .unwrap();
    assert_eq!(mean, [20.0, 20.0, 20.0]);
}

#[test]
fn unsampleable_scene_falls_back_to_dark_default() {
    let d = ContrastAnalyzer::default().analyze(
        &Scene::blank(100, 100),
        &OverlayBox::percent(10.0, 10.0, 40.0, 20.0),
        Some(Color::BLACK),
    );
    assert_eq!(d, ContrastDecision::dark_default());
    assert_eq!(d.text_color, Color::WHITE);
    assert!(d.contrast_ratio.is_none());
}
