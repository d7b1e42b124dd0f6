//! Modifier mapping: selection flags to ordered ratio keys, plus the label
//! decorations that go with them.
//!
//! Key order is fixed: area auto-ratios, coverage band, painting modifiers
//! (two-component, then thickness), then site conditions in enumeration order.

use crate::catalog::{Localized, PriceItem};

use super::requests::{PaintingModifiers, WorkSelection};

pub const AREA_LT_30: &str = "area_lt_30";
pub const AREA_LT_70: &str = "area_lt_70";
pub const DOUBLE_COMPONENT: &str = "painting.full_double_ratio";
pub const DFT150: &str = "painting.dft150_ratio";
pub const DFT200: &str = "painting.dft200_ratio";

const PAINTING_PREFIX: &str = "painting.";

/// Coverage-band surcharge for partial coverage.
pub fn coverage_ratio(percent: u8) -> Option<&'static str> {
    if percent < 30 {
        Some(AREA_LT_30)
    } else if percent < 70 {
        Some(AREA_LT_70)
    } else {
        None
    }
}

/// Thickness tier in microns used for the label: custom > 200 tier > 150 tier.
pub fn thickness_annotation(painting: &PaintingModifiers) -> Option<u32> {
    if let Some(microns) = painting.custom_microns() {
        Some(microns)
    } else if painting.dft200 {
        Some(200)
    } else if painting.dft150 {
        Some(150)
    } else {
        None
    }
}

/// Thickness ratio: a custom value picks its tier, otherwise the tier flags
/// decide with 200 taking priority over 150.
pub fn thickness_ratio(painting: &PaintingModifiers) -> Option<&'static str> {
    match painting.custom_microns() {
        Some(microns) if microns >= 200 => Some(DFT200),
        Some(microns) if microns >= 150 => Some(DFT150),
        Some(_) => None,
        None if painting.dft200 => Some(DFT200),
        None if painting.dft150 => Some(DFT150),
        None => None,
    }
}

/// Painting modifiers count only for items in the painting section.
fn painting_modifiers<'a>(selection: &'a WorkSelection) -> Option<&'a PaintingModifiers> {
    selection
        .path
        .starts_with(PAINTING_PREFIX)
        .then_some(&selection.painting)
}

/// Ordered ratio keys for a selection priced against `item`.
pub fn ratio_keys(
    item: &PriceItem,
    selection: &WorkSelection,
    auto_ratios: &[String],
) -> Vec<String> {
    let mut keys: Vec<String> = auto_ratios.to_vec();

    if item.unit.is_area() {
        if let Some(band) = coverage_ratio(selection.percent) {
            keys.push(band.to_string());
        }
    }

    if let Some(painting) = painting_modifiers(selection) {
        if painting.double_component {
            keys.push(DOUBLE_COMPONENT.to_string());
        }
        if let Some(thickness) = thickness_ratio(painting) {
            keys.push(thickness.to_string());
        }
    }

    keys.extend(
        selection
            .conditions
            .iter()
            .map(|condition| condition.ratio_key().to_string()),
    );
    keys
}

/// Decorated label for area items; `None` keeps the catalog name.
pub fn decorate_title(item: &PriceItem, selection: &WorkSelection) -> Option<Localized> {
    if !item.unit.is_area() {
        return None;
    }

    let mut en = item.name.en.clone();
    let mut ru = item.name.ru.clone();
    let mut microns = None;

    if let Some(painting) = painting_modifiers(selection) {
        if painting.double_component {
            en = en.replace("single-component", "epoxy");
            ru = ru.replace("однокомпонентная", "эпоксидная");
        }
        microns = thickness_annotation(painting);
    }

    let percent = selection.percent;
    if percent < 100 {
        en = en.replace("Full coat", "TU");
        ru = ru.replace("Полный слой", "TU");
    }

    let (dft_en, dft_ru) = microns
        .map(|m| (format!(" {}mic", m), format!(" {} мкм", m)))
        .unwrap_or_default();

    Some(Localized::new(
        format!("{}{} – {}%", en, dft_en, percent),
        format!("{}{} – {}%", ru, dft_ru, percent),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Unit;
    use crate::pricing::requests::SiteCondition;
    use rust_decimal_macros::dec;

    fn area_item(en: &str, ru: &str) -> PriceItem {
        PriceItem {
            name: Localized::new(en, ru),
            unit: Unit::Area,
            price: dec!(1.6),
        }
    }

    fn paint_item() -> PriceItem {
        area_item(
            "Full coat, single-component paint",
            "Полный слой, однокомпонентная краска",
        )
    }

    fn painting(double: bool, dft150: bool, dft200: bool, custom: Option<u32>) -> PaintingModifiers {
        PaintingModifiers {
            double_component: double,
            dft150,
            dft200,
            custom_dft: custom,
        }
    }

    // ==================== coverage tests ====================

    #[test]
    fn test_coverage_bands() {
        assert_eq!(coverage_ratio(1), Some(AREA_LT_30));
        assert_eq!(coverage_ratio(29), Some(AREA_LT_30));
        assert_eq!(coverage_ratio(30), Some(AREA_LT_70));
        assert_eq!(coverage_ratio(50), Some(AREA_LT_70));
        assert_eq!(coverage_ratio(69), Some(AREA_LT_70));
        assert_eq!(coverage_ratio(70), None);
        assert_eq!(coverage_ratio(100), None);
    }

    #[test]
    fn test_coverage_band_skipped_for_non_area_items() {
        let item = PriceItem {
            name: Localized::new("Stripe coat", "Полосовое покрытие"),
            unit: Unit::Length,
            price: dec!(0.9),
        };
        let selection = WorkSelection::new("painting.stripe").with_percent(10);
        assert!(ratio_keys(&item, &selection, &[]).is_empty());
    }

    // ==================== thickness tests ====================

    #[test]
    fn test_custom_thickness_overrides_checkboxes() {
        let p = painting(false, true, false, Some(180));
        assert_eq!(thickness_ratio(&p), Some(DFT150));

        let p = painting(false, false, false, Some(200));
        assert_eq!(thickness_ratio(&p), Some(DFT200));

        // Below the first tier: no ratio, even with both boxes ticked
        let p = painting(false, true, true, Some(120));
        assert_eq!(thickness_ratio(&p), None);
    }

    #[test]
    fn test_checkbox_priority() {
        assert_eq!(thickness_ratio(&painting(false, true, false, None)), Some(DFT150));
        assert_eq!(thickness_ratio(&painting(false, false, true, None)), Some(DFT200));
        assert_eq!(thickness_ratio(&painting(false, true, true, None)), Some(DFT200));
        assert_eq!(thickness_ratio(&painting(false, false, false, None)), None);
        // zero custom value counts as not entered
        assert_eq!(thickness_ratio(&painting(false, true, false, Some(0))), Some(DFT150));
    }

    #[test]
    fn test_thickness_annotation_priority() {
        assert_eq!(thickness_annotation(&painting(false, true, true, Some(175))), Some(175));
        assert_eq!(thickness_annotation(&painting(false, true, true, None)), Some(200));
        assert_eq!(thickness_annotation(&painting(false, true, false, None)), Some(150));
        assert_eq!(thickness_annotation(&painting(false, false, false, None)), None);
    }

    // ==================== ratio_keys tests ====================

    #[test]
    fn test_ratio_key_order() {
        let selection = WorkSelection::new("painting.full_single")
            .with_percent(50)
            .with_painting(painting(true, false, true, None))
            .with_condition(SiteCondition::Lifting)
            .with_condition(SiteCondition::Framework);
        let auto = vec!["hold".to_string()];

        let keys = ratio_keys(&paint_item(), &selection, &auto);
        assert_eq!(
            keys,
            vec![
                "hold",
                AREA_LT_70,
                DOUBLE_COMPONENT,
                DFT200,
                "framework",
                "lifting",
            ]
        );
    }

    #[test]
    fn test_painting_modifiers_ignored_outside_painting() {
        let item = area_item("Sand blasting SA-2", "Пескоструйная очистка SA-2");
        let selection = WorkSelection::new("cleaning.sand_blasting.sa2")
            .with_painting(painting(true, true, true, Some(250)))
            .with_condition(SiteCondition::Confined);

        assert_eq!(ratio_keys(&item, &selection, &[]), vec!["confined"]);
        let title = decorate_title(&item, &selection).unwrap();
        assert_eq!(title.en, "Sand blasting SA-2 – 100%");
    }

    // ==================== decorate_title tests ====================

    #[test]
    fn test_title_full_coverage() {
        let selection = WorkSelection::new("painting.full_single");
        let title = decorate_title(&paint_item(), &selection).unwrap();
        assert_eq!(title.en, "Full coat, single-component paint – 100%");
        assert_eq!(title.ru, "Полный слой, однокомпонентная краска – 100%");
    }

    #[test]
    fn test_title_touch_up_epoxy_with_thickness() {
        let selection = WorkSelection::new("painting.full_single")
            .with_percent(40)
            .with_painting(painting(true, false, false, Some(180)));
        let title = decorate_title(&paint_item(), &selection).unwrap();
        assert_eq!(title.en, "TU, epoxy paint 180mic – 40%");
        assert_eq!(title.ru, "TU, эпоксидная краска 180 мкм – 40%");
    }

    #[test]
    fn test_title_tier_annotation() {
        let selection = WorkSelection::new("painting.full_single")
            .with_painting(painting(false, true, true, None));
        let title = decorate_title(&paint_item(), &selection).unwrap();
        assert_eq!(title.en, "Full coat, single-component paint 200mic – 100%");
    }

    #[test]
    fn test_title_untouched_for_non_area_items() {
        let item = PriceItem {
            name: Localized::new("Porthole protection", "Защита иллюминаторов"),
            unit: Unit::Piece,
            price: dec!(12),
        };
        let selection = WorkSelection::new("other.porthole_protection").with_percent(20);
        assert_eq!(decorate_title(&item, &selection), None);
    }
}
