//! Default reference catalog of herbs, aliases and lookup tables.
//!
//! Everything the engine dispatches through lives here as flat data: herb
//! entries, the alias table, processing-method heat deltas, the
//! channel-to-region map, flavor weight/direction tables and the interaction
//! rule set. A deployment can replace the whole catalog from a TOML file via
//! [`Catalog::load_from`] without touching engine code.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
///
/// Returns a reference to the pre-built catalog, avoiding the cost of
/// rebuilding the herb table on every analysis.
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in herbs and lookup tables
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn herb(
    id: &str,
    name: &str,
    thermal: ThermalClass,
    flavors: &[Flavor],
    channels: &[Channel],
    direction: DirectionClass,
    default_dosage: f64,
) -> CatalogEntry {
    CatalogEntry {
        id: id.into(),
        name: name.into(),
        thermal,
        flavors: flavors.to_vec(),
        channels: channels.to_vec(),
        direction,
        default_dosage: Some(default_dosage),
        region_weights: None,
        note: None,
    }
}

fn rule(
    id: &str,
    label: &str,
    herbs: &[&str],
    kind: InteractionKind,
    effect: &str,
) -> InteractionRule {
    InteractionRule {
        id: id.into(),
        label: label.into(),
        herbs: herbs.iter().map(|h| h.to_string()).collect(),
        effect: effect.into(),
        kind,
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    use Channel as C;
    use DirectionClass as D;
    use Flavor as F;
    use InteractionKind as K;
    use ThermalClass as T;

    let mut herbs_table: HashMap<String, CatalogEntry> = HashMap::new();
    let mut add = |e: CatalogEntry| {
        herbs_table.insert(e.id.clone(), e);
    };

    // ========================================================================
    // Herbs
    // ========================================================================

    add({
        let mut e = herb(
            "gan_cao",
            "Gan Cao (licorice root)",
            T::Neutral,
            &[F::Sweet],
            &[C::Heart, C::Lung, C::Spleen, C::Stomach],
            D::Neutral,
            6.0,
        );
        e.note = Some("Harmonizes the other herbs in a formula.".into());
        e
    });
    add(herb(
        "ren_shen",
        "Ren Shen (ginseng)",
        T::SlightlyWarm,
        &[F::Sweet, F::Bitter],
        &[C::Spleen, C::Lung, C::Heart],
        D::Lifting,
        9.0,
    ));
    add(herb(
        "huang_qi",
        "Huang Qi (astragalus)",
        T::SlightlyWarm,
        &[F::Sweet],
        &[C::Spleen, C::Lung],
        D::Lifting,
        12.0,
    ));
    add({
        let mut e = herb(
            "fu_zi",
            "Fu Zi (prepared aconite)",
            T::GreatHot,
            &[F::Pungent, F::Sweet],
            &[C::Heart, C::Kidney, C::Spleen],
            D::Lifting,
            6.0,
        );
        e.note = Some("Only the processed root is used; the raw root is toxic.".into());
        e
    });
    add(herb(
        "gan_jiang",
        "Gan Jiang (dried ginger)",
        T::Hot,
        &[F::Pungent],
        &[C::Spleen, C::Stomach, C::Kidney, C::Heart, C::Lung],
        D::Lifting,
        6.0,
    ));
    add(herb(
        "sheng_jiang",
        "Sheng Jiang (fresh ginger)",
        T::Warm,
        &[F::Pungent],
        &[C::Lung, C::Spleen, C::Stomach],
        D::Lifting,
        9.0,
    ));
    add(herb(
        "gui_zhi",
        "Gui Zhi (cinnamon twig)",
        T::Warm,
        &[F::Pungent, F::Sweet],
        &[C::Heart, C::Lung, C::Bladder],
        D::Lifting,
        9.0,
    ));
    add(herb(
        "rou_gui",
        "Rou Gui (cinnamon bark)",
        T::GreatHot,
        &[F::Pungent, F::Sweet],
        &[C::Kidney, C::Spleen, C::Heart, C::Liver],
        D::Sinking,
        3.0,
    ));
    add(herb(
        "ma_huang",
        "Ma Huang (ephedra)",
        T::Warm,
        &[F::Pungent, F::Bitter],
        &[C::Lung, C::Bladder],
        D::Lifting,
        6.0,
    ));
    add(herb(
        "xi_xin",
        "Xi Xin (asarum)",
        T::Warm,
        &[F::Pungent],
        &[C::Lung, C::Kidney, C::Heart],
        D::Lifting,
        3.0,
    ));
    add({
        let mut e = herb(
            "shi_gao",
            "Shi Gao (gypsum)",
            T::GreatCold,
            &[F::Pungent, F::Sweet],
            &[C::Lung, C::Stomach],
            D::Sinking,
            30.0,
        );
        // Mineral; acts almost entirely on the upper and middle burners.
        e.region_weights = Some(RegionWeights {
            upper: 0.5,
            middle: 0.5,
            lower: 0.0,
        });
        e
    });
    add(herb(
        "zhi_mu",
        "Zhi Mu (anemarrhena)",
        T::Cold,
        &[F::Bitter, F::Sweet],
        &[C::Lung, C::Stomach, C::Kidney],
        D::Sinking,
        9.0,
    ));
    add(herb(
        "huang_lian",
        "Huang Lian (coptis)",
        T::Cold,
        &[F::Bitter],
        &[
            C::Heart,
            C::Spleen,
            C::Stomach,
            C::Liver,
            C::Gallbladder,
            C::LargeIntestine,
        ],
        D::Sinking,
        3.0,
    ));
    add(herb(
        "huang_qin",
        "Huang Qin (baical skullcap)",
        T::Cold,
        &[F::Bitter],
        &[
            C::Lung,
            C::Gallbladder,
            C::Spleen,
            C::LargeIntestine,
            C::SmallIntestine,
        ],
        D::Sinking,
        9.0,
    ));
    add(herb(
        "huang_bai",
        "Huang Bai (phellodendron)",
        T::Cold,
        &[F::Bitter],
        &[C::Kidney, C::Bladder, C::LargeIntestine],
        D::Sinking,
        6.0,
    ));
    add({
        let mut e = herb(
            "da_huang",
            "Da Huang (rhubarb)",
            T::Cold,
            &[F::Bitter],
            &[C::Spleen, C::Stomach, C::LargeIntestine, C::Liver, C::Heart],
            D::Sinking,
            6.0,
        );
        e.note = Some("Purgative; dosage drives the strength of the downward action.".into());
        e
    });
    add(herb(
        "bo_he",
        "Bo He (field mint)",
        T::Cool,
        &[F::Pungent],
        &[C::Lung, C::Liver],
        D::Lifting,
        6.0,
    ));
    add(herb(
        "chai_hu",
        "Chai Hu (bupleurum)",
        T::SlightlyCool,
        &[F::Bitter, F::Pungent],
        &[C::Liver, C::Gallbladder],
        D::Lifting,
        9.0,
    ));
    add(herb(
        "jin_yin_hua",
        "Jin Yin Hua (honeysuckle flower)",
        T::Cold,
        &[F::Sweet],
        &[C::Lung, C::Heart, C::Stomach],
        D::Neutral,
        12.0,
    ));
    add(herb(
        "lian_qiao",
        "Lian Qiao (forsythia fruit)",
        T::SlightlyCool,
        &[F::Bitter],
        &[C::Lung, C::Heart, C::Gallbladder],
        D::Lifting,
        9.0,
    ));
    add(herb(
        "dang_gui",
        "Dang Gui (angelica root)",
        T::Warm,
        &[F::Sweet, F::Pungent],
        &[C::Liver, C::Heart, C::Spleen],
        D::Neutral,
        9.0,
    ));
    add(herb(
        "bai_shao",
        "Bai Shao (white peony root)",
        T::SlightlyCool,
        &[F::Bitter, F::Sour],
        &[C::Liver, C::Spleen],
        D::Sinking,
        9.0,
    ));
    add({
        let mut e = herb(
            "di_huang",
            "Di Huang (rehmannia root)",
            T::Cold,
            &[F::Sweet],
            &[C::Heart, C::Liver, C::Kidney],
            D::Sinking,
            12.0,
        );
        e.note = Some("Steam-cured root (shu di huang) turns markedly warmer.".into());
        e
    });
    add(herb(
        "wu_wei_zi",
        "Wu Wei Zi (schisandra fruit)",
        T::Warm,
        &[F::Sour, F::Sweet],
        &[C::Lung, C::Heart, C::Kidney],
        D::Neutral,
        5.0,
    ));
    add(herb(
        "jie_geng",
        "Jie Geng (platycodon root)",
        T::Neutral,
        &[F::Bitter, F::Pungent],
        &[C::Lung],
        D::Lifting,
        5.0,
    ));
    add(herb(
        "niu_xi",
        "Niu Xi (achyranthes root)",
        T::Neutral,
        &[F::Bitter, F::Sour],
        &[C::Liver, C::Kidney],
        D::Sinking,
        9.0,
    ));
    add(herb(
        "fu_ling",
        "Fu Ling (poria)",
        T::Neutral,
        &[F::Sweet, F::Bland],
        &[C::Heart, C::Spleen, C::Kidney],
        D::Neutral,
        12.0,
    ));
    add(herb(
        "xing_ren",
        "Xing Ren (apricot kernel)",
        T::SlightlyWarm,
        &[F::Bitter],
        &[C::Lung, C::LargeIntestine],
        D::Sinking,
        9.0,
    ));
    add(herb(
        "ban_xia",
        "Ban Xia (pinellia rhizome)",
        T::Warm,
        &[F::Pungent],
        &[C::Spleen, C::Stomach, C::Lung],
        D::Sinking,
        9.0,
    ));
    add({
        let mut e = herb(
            "gan_sui",
            "Gan Sui (kansui root)",
            T::Cold,
            &[F::Bitter],
            &[C::Lung, C::Kidney, C::LargeIntestine],
            D::Sinking,
            1.5,
        );
        e.note = Some("Drastic cathartic; incompatible with licorice.".into());
        e
    });
    add(herb(
        "lai_fu_zi",
        "Lai Fu Zi (radish seed)",
        T::Neutral,
        &[F::Pungent, F::Sweet],
        &[C::Spleen, C::Stomach, C::Lung],
        D::Sinking,
        9.0,
    ));
    add(herb(
        "da_zao",
        "Da Zao (jujube)",
        T::Warm,
        &[F::Sweet],
        &[C::Spleen, C::Stomach],
        D::Neutral,
        10.0,
    ));
    add(herb(
        "long_gu",
        "Long Gu (fossilized bone)",
        T::Neutral,
        &[F::Astringent, F::Sweet],
        &[C::Heart, C::Liver, C::Kidney],
        D::Sinking,
        15.0,
    ));

    // ========================================================================
    // Alias Table
    // ========================================================================

    let aliases: HashMap<String, String> = [
        ("guo_lao", "gan_cao"),
        ("yun_ling", "fu_ling"),
        ("shuang_hua", "jin_yin_hua"),
        ("yin_hua", "jin_yin_hua"),
        ("bei_qi", "huang_qi"),
        ("mian_qi", "huang_qi"),
        ("jiang_jun", "da_huang"),
        ("sheng_di", "di_huang"),
        ("shu_di", "di_huang"),
    ]
    .into_iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();

    // ========================================================================
    // Processing Deltas
    // ========================================================================

    // Signed heat shift per processing method, applied on the -4..=+4 scale.
    let processing_deltas: HashMap<String, i8> = [
        ("sheng", 0), // raw
        ("zhi", 1),   // honey-fried / prepared
        ("mi", 1),    // honey-processed
        ("chao", 1),  // dry-fried
        ("jiu", 1),   // wine-processed
        ("jiang", 1), // ginger-processed
        ("shu", 2),   // steam-cured
        ("tan", 1),   // charred
        ("yan", -1),  // salt-processed
        ("cu", 0),    // vinegar-processed
        ("duan", 0),  // calcined
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    // ========================================================================
    // Channel -> Region Map
    // ========================================================================

    let channel_regions: HashMap<Channel, Vec<Region>> = [
        (C::Lung, vec![Region::Upper]),
        (C::Heart, vec![Region::Upper]),
        (C::Pericardium, vec![Region::Upper]),
        (C::Spleen, vec![Region::Middle]),
        (C::Stomach, vec![Region::Middle]),
        (C::Liver, vec![Region::Middle]),
        (C::Gallbladder, vec![Region::Middle]),
        (C::Kidney, vec![Region::Lower]),
        (C::Bladder, vec![Region::Lower]),
        (C::LargeIntestine, vec![Region::Lower]),
        (C::SmallIntestine, vec![Region::Lower]),
        (
            C::TripleBurner,
            vec![Region::Upper, Region::Middle, Region::Lower],
        ),
    ]
    .into_iter()
    .collect();

    // ========================================================================
    // Flavor and Direction Tables
    // ========================================================================

    // Potency weight: pungent/bitter carry the largest magnitude, sweet and
    // bland stay near neutral.
    let flavor_weights: HashMap<Flavor, f64> = [
        (F::Pungent, 1.4),
        (F::Bitter, 1.3),
        (F::Sour, 1.1),
        (F::Salty, 1.1),
        (F::Astringent, 1.0),
        (F::Sweet, 0.9),
        (F::Bland, 0.8),
    ]
    .into_iter()
    .collect();

    // Dispersing(+) / collecting(-) axis.
    let flavor_x: HashMap<Flavor, f64> = [
        (F::Pungent, 1.0),
        (F::Sour, -0.8),
        (F::Astringent, -1.0),
        (F::Sweet, 0.0),
        (F::Bitter, 0.0),
        (F::Salty, 0.0),
        (F::Bland, 0.0),
    ]
    .into_iter()
    .collect();

    // Ascending(+) / descending(-) axis.
    let direction_y: HashMap<DirectionClass, f64> = [
        (D::Lifting, 1.0),
        (D::Sinking, -1.0),
        (D::Neutral, 0.0),
    ]
    .into_iter()
    .collect();

    // ========================================================================
    // Interaction Rules
    // ========================================================================

    let rules = vec![
        rule(
            "fuzi_ganjiang",
            "Fu Zi + Gan Jiang",
            &["fu_zi", "gan_jiang"],
            K::Synergy,
            "Dried ginger reinforces aconite's heat and spreads it through the interior.",
        ),
        rule(
            "mahuang_guizhi",
            "Ma Huang + Gui Zhi",
            &["ma_huang", "gui_zhi"],
            K::Synergy,
            "Classic exterior-releasing pair; promotes sweating and disperses cold.",
        ),
        rule(
            "mahuang_xingren",
            "Ma Huang + Xing Ren",
            &["ma_huang", "xing_ren"],
            K::Synergy,
            "Ephedra opens the lung while apricot kernel redirects the qi downward.",
        ),
        rule(
            "shigao_zhimu",
            "Shi Gao + Zhi Mu",
            &["shi_gao", "zhi_mu"],
            K::Synergy,
            "Gypsum and anemarrhena clear qi-level heat together.",
        ),
        rule(
            "danggui_huangqi",
            "Dang Gui + Huang Qi",
            &["dang_gui", "huang_qi"],
            K::Synergy,
            "Astragalus drives blood generation alongside angelica.",
        ),
        rule(
            "huanglian_rougui",
            "Huang Lian + Rou Gui",
            &["huang_lian", "rou_gui"],
            K::Modifier,
            "Coptis and cinnamon bark balance heart fire against kidney cold.",
        ),
        rule(
            "guizhi_baishao",
            "Gui Zhi + Bai Shao",
            &["gui_zhi", "bai_shao"],
            K::Modifier,
            "Cinnamon twig and peony harmonize the defensive and nutritive layers.",
        ),
        rule(
            "gancao_gansui",
            "Gan Cao + Gan Sui",
            &["gan_cao", "gan_sui"],
            K::Antagonism,
            "Licorice clashes with kansui; one of the eighteen incompatibilities.",
        ),
        rule(
            "fuzi_banxia",
            "Fu Zi + Ban Xia",
            &["fu_zi", "ban_xia"],
            K::Antagonism,
            "Aconite with pinellia; one of the eighteen incompatibilities.",
        ),
        rule(
            "renshen_laifuzi",
            "Ren Shen + Lai Fu Zi",
            &["ren_shen", "lai_fu_zi"],
            K::Antagonism,
            "Radish seed blunts ginseng's tonifying effect.",
        ),
    ];

    Catalog {
        herbs: herbs_table,
        aliases,
        processing_deltas,
        channel_regions,
        flavor_weights,
        flavor_x,
        direction_y,
        rules,
    }
}

impl Catalog {
    /// Load a complete catalog from a TOML file.
    ///
    /// The file carries the same tables as the built-in catalog, so a
    /// deployment can swap the reference data without code changes.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Catalog = toml::from_str(&contents)?;
        tracing::info!("Loaded catalog with {} herbs from {:?}", catalog.herbs.len(), path);
        Ok(catalog)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, entry) in &self.herbs {
            if id.is_empty() || entry.id.is_empty() {
                errors.push("Herb has empty ID".to_string());
            }
            if id != &entry.id {
                errors.push(format!(
                    "Herb key '{}' doesn't match entry.id '{}'",
                    id, entry.id
                ));
            }
            if entry.name.is_empty() {
                errors.push(format!("Herb '{}' has empty name", id));
            }
            if entry.flavors.is_empty() {
                errors.push(format!("Herb '{}' has no flavors", id));
            }
            if let Some(dosage) = entry.default_dosage {
                if dosage <= 0.0 {
                    errors.push(format!(
                        "Herb '{}' has non-positive default dosage {}",
                        id, dosage
                    ));
                }
            }
            if let Some(weights) = &entry.region_weights {
                if !weights.is_normalized() {
                    errors.push(format!(
                        "Herb '{}' region weights don't sum to 1: {:?}",
                        id, weights
                    ));
                }
            }
            for flavor in &entry.flavors {
                if !self.flavor_weights.contains_key(flavor) {
                    errors.push(format!(
                        "Herb '{}' flavor {:?} missing from flavor_weights table",
                        id, flavor
                    ));
                }
                if !self.flavor_x.contains_key(flavor) {
                    errors.push(format!(
                        "Herb '{}' flavor {:?} missing from flavor_x table",
                        id, flavor
                    ));
                }
            }
            for channel in &entry.channels {
                if !self.channel_regions.contains_key(channel) {
                    errors.push(format!(
                        "Herb '{}' channel {:?} missing from channel_regions table",
                        id, channel
                    ));
                }
            }
            if !self.direction_y.contains_key(&entry.direction) {
                errors.push(format!(
                    "Herb '{}' direction {:?} missing from direction_y table",
                    id, entry.direction
                ));
            }
        }

        // Check that aliases point at existing herbs
        for (alias, target) in &self.aliases {
            if alias.is_empty() {
                errors.push("Alias table has empty alias".to_string());
            }
            if !self.herbs.contains_key(target) {
                errors.push(format!(
                    "Alias '{}' points at non-existent herb '{}'",
                    alias, target
                ));
            }
        }

        // Check that interaction rules reference existing herbs
        for rule in &self.rules {
            if rule.id.is_empty() || rule.label.is_empty() {
                errors.push(format!("Rule '{}' has empty id or label", rule.id));
            }
            if rule.herbs.len() < 2 {
                errors.push(format!(
                    "Rule '{}' requires fewer than 2 herbs",
                    rule.id
                ));
            }
            for herb_id in &rule.herbs {
                if !self.herbs.contains_key(herb_id) {
                    errors.push(format!(
                        "Rule '{}' references non-existent herb '{}'",
                        rule.id, herb_id
                    ));
                }
            }
        }

        errors
    }

    /// Convenience accessor used by tests and by the CLI's catalog listing.
    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.herbs.get(id)
    }
}

/// Load the catalog from an override file or fall back to the built-in set.
///
/// A failed override load is a hard error rather than a silent fallback so a
/// broken deployment catalog can't masquerade as the default.
pub fn load_catalog(override_path: Option<&Path>) -> Result<Catalog> {
    match override_path {
        Some(path) => {
            let catalog = Catalog::load_from(path)?;
            let errors = catalog.validate();
            if !errors.is_empty() {
                return Err(Error::CatalogValidation(format!(
                    "catalog at {:?} has {} problems: {}",
                    path,
                    errors.len(),
                    errors.join("; ")
                )));
            }
            Ok(catalog)
        }
        None => Ok(get_default_catalog().clone()),
    }
}
