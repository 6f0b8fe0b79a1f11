use overlayrank::image::Rgb8;
use overlayrank::layout::{Effects, PanelStyle, TextAlign, Typography};
use overlayrank::{
    Color, ImageView, OverlayBox, OverlayElement, OverlayError, OwnedImage, Role, Scene, Strategy,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        OverlayError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        OverlayError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        OverlayError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, OverlayError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn image_view_roi_matches_expected_values() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();
    assert_eq!(view.stride(), 4);
    assert_eq!(view.as_slice(), data.as_slice());

    let roi = view.roi(1, 1, 2, 2).unwrap();
    assert_eq!(roi.width(), 2);
    assert_eq!(roi.height(), 2);
    assert_eq!(roi.stride(), 4);
    assert_eq!(roi.row(0).unwrap(), &[5u8, 6u8]);
    assert_eq!(roi.row(1).unwrap(), &[9u8, 10u8]);
    assert_eq!(roi.get(0, 0).copied(), Some(5u8));
    assert!(roi.get(2, 0).is_none());

    assert!(view.roi(3, 3, 2, 2).is_err());
}

#[test]
fn owned_image_round_trips_through_view() {
    let pixels: Vec<Rgb8> = vec![[1, 2, 3], [4, 5, 6], [7, 8, 9], [10, 11, 12]];
    let owned = OwnedImage::new(pixels.clone(), 2, 2).unwrap();
    let view = owned.view();
    assert_eq!(view.get(1, 1), Some(&[10, 11, 12]));
    assert_eq!(OwnedImage::from_view(view).unwrap(), owned);

    let err = OwnedImage::new(pixels, 3, 2).err().unwrap();
    assert_eq!(err, OverlayError::BufferTooSmall { needed: 6, got: 4 });
}

#[test]
fn scene_reports_dimensions_without_pixels() {
    let blank = Scene::blank(1200, 627);
    assert!(blank.pixels().is_none());
    assert!((blank.aspect_ratio() - 1200.0 / 627.0).abs() < 1e-12);
    assert_eq!(Scene::blank(0, 0).aspect_ratio(), 1.0);
}

#[test]
fn colors_parse_and_format_as_hex() {
    assert_eq!(Color::parse_hex("#fff"), Some(Color::WHITE));
    assert_eq!(Color::parse_hex("000000"), Some(Color::BLACK));
    assert_eq!(Color::parse_hex("#1a237e").unwrap().to_hex(), "#1A237E");
    assert_eq!(Color::parse_hex("#12345"), None);
    assert_eq!(Color::parse_hex("not a color"), None);
    assert_eq!(Color::parse_hex("#+f+f+f"), None);
    assert_eq!(Color::parse_hex("+ff"), None);
    assert_eq!(Color::parse_hex("#-1-1-1"), None);
    assert!((Color::WHITE.contrast_with(&Color::BLACK) - 21.0).abs() < 1e-9);
}

#[test]
fn overlay_element_serializes_to_the_output_contract() {
    let bbox = OverlayBox::percent(8.0, 10.0, 45.0, 20.0);
    let element = OverlayElement {
        role: Role::Headline,
        text: "Hello".to_string(),
        bbox,
        typography: Typography::for_role(Role::Headline, "Inter", 48.0),
        effects: Effects {
            stroke_width: 0.0,
            stroke_color: Color::BLACK,
            shadow_enabled: true,
            shadow_color: Color::BLACK,
            shadow_blur: 10.0,
            shadow_offset_x: 2.0,
            shadow_offset_y: 2.0,
            opacity: 100.0,
        },
        color: Color::WHITE,
        text_align: TextAlign::for_box(&bbox),
        panel: PanelStyle::none(),
    };

    let json = serde_json::to_value(&element).unwrap();
    assert_eq!(json["role"], "headline");
    assert_eq!(json["color"], "#FFFFFF");
    assert_eq!(json["text_align"], "left");
    assert_eq!(json["box"]["use_percentage"], true);
    assert_eq!(json["box"]["width"], 45.0);
    assert_eq!(json["typography"]["font_weight"], 700);

    let back: OverlayElement = serde_json::from_value(json).unwrap();
    assert_eq!(back, element);
}

#[test]
fn subtext_is_an_alias_for_subhead() {
    let role: Role = serde_json::from_str("\"subtext\"").unwrap();
    assert_eq!(role, Role::Subhead);
    let strategy: Strategy = serde_json::from_str("\"bottom-banner\"").unwrap();
    assert_eq!(strategy, Strategy::BottomBanner);
}
