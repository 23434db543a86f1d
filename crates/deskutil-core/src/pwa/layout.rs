//! Toolbar layout encoding for `browser.uiCustomization.state`.
//!
//! A comma-separated keyword list such as `arrows,refresh` becomes the
//! toolbar placement document the browser stores in that preference.

use serde::{Deserialize, Serialize};

/// Preference that holds the serialized [`ToolbarState`].
pub const LAYOUT_PREF: &str = "browser.uiCustomization.state";

/// Schema version of the customization state the browser expects.
const CUSTOMIZATION_VERSION: u32 = 20;

/// Map one layout keyword to the toolbar widgets it stands for.
///
/// Unknown keywords map to `None` and are dropped by the encoder.
pub fn widgets_for(keyword: &str) -> Option<&'static [&'static str]> {
    let widgets: &'static [&'static str] = match keyword {
        "arrows" => &["back-button", "forward-button"],
        "back" => &["back-button"],
        "forward" => &["forward-button"],
        "refresh" | "reload" => &["stop-reload-button"],
        "home" => &["home-button"],
        "spacer" => &["spacer"],
        "spring" => &["spring"],
        _ => return None,
    };
    Some(widgets)
}

/// Widget placement per toolbar area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarPlacements {
    #[serde(rename = "widget-overflow-fixed-list")]
    pub widget_overflow_fixed_list: Vec<String>,
    #[serde(rename = "nav-bar")]
    pub nav_bar: Vec<String>,
    #[serde(rename = "toolbar-menubar")]
    pub toolbar_menubar: Vec<String>,
    #[serde(rename = "TabsToolbar")]
    pub tabs_toolbar: Vec<String>,
    #[serde(rename = "PersonalToolbar")]
    pub personal_toolbar: Vec<String>,
    #[serde(rename = "unified-extensions-area")]
    pub unified_extensions_area: Vec<String>,
}

/// The browser's toolbar customization state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub placements: ToolbarPlacements,
    pub seen: Vec<String>,
    pub dirty_area_cache: Vec<String>,
    pub current_version: u32,
    pub new_element_count: u32,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Encode a comma-separated keyword list into a toolbar state.
///
/// Keywords are trimmed and case-insensitive. Output order follows input
/// order; unknown keywords are dropped.
pub fn encode_layout(keywords: &str) -> ToolbarState {
    let nav_bar: Vec<String> = keywords
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter_map(|k| widgets_for(&k))
        .flat_map(|widgets| widgets.iter().map(|w| w.to_string()))
        .collect();

    let mut seen = nav_bar.clone();
    seen.push("developer-button".to_string());

    ToolbarState {
        placements: ToolbarPlacements {
            widget_overflow_fixed_list: Vec::new(),
            nav_bar,
            toolbar_menubar: owned(&["menubar-items"]),
            tabs_toolbar: owned(&["tabbrowser-tabs", "new-tab-button"]),
            personal_toolbar: owned(&["personal-bookmarks"]),
            unified_extensions_area: Vec::new(),
        },
        seen,
        dirty_area_cache: owned(&["nav-bar", "unified-extensions-area"]),
        current_version: CUSTOMIZATION_VERSION,
        new_element_count: 0,
    }
}

/// Serialize the encoded layout to the compact JSON stored in [`LAYOUT_PREF`].
pub fn layout_pref_value(keywords: &str) -> String {
    // Plain structs of strings and integers cannot fail to serialize.
    serde_json::to_string(&encode_layout(keywords)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_refresh() {
        let state = encode_layout("arrows,refresh");
        assert_eq!(
            state.placements.nav_bar,
            vec!["back-button", "forward-button", "stop-reload-button"]
        );
        assert_eq!(
            state.seen,
            vec![
                "back-button",
                "forward-button",
                "stop-reload-button",
                "developer-button"
            ]
        );
    }

    #[test]
    fn test_synonyms_and_case() {
        assert_eq!(
            encode_layout(" Reload , HOME").placements.nav_bar,
            vec!["stop-reload-button", "home-button"]
        );
        assert_eq!(
            encode_layout("refresh").placements,
            encode_layout("reload").placements
        );
    }

    #[test]
    fn test_unknown_keywords_dropped_anywhere() {
        for input in ["bogus,back", "back,bogus", "bo,back,gus", "back"] {
            assert_eq!(encode_layout(input).placements.nav_bar, vec!["back-button"]);
            assert!(!layout_pref_value(input).contains("bogus"));
        }
        assert!(encode_layout("").placements.nav_bar.is_empty());
    }

    #[test]
    fn test_deterministic_bytes() {
        let a = layout_pref_value("arrows,spring,home,spacer");
        let b = layout_pref_value("arrows,spring,home,spacer");
        assert_eq!(a, b);
        assert!(a.starts_with(r#"{"placements":{"widget-overflow-fixed-list":[],"nav-bar":["back-button""#));
        assert!(a.contains(r#""currentVersion":20"#));
        assert!(a.contains(r#""dirtyAreaCache":["nav-bar","unified-extensions-area"]"#));
    }
}
