//! Typed reading state owned by the controller
//!
//! Split by concern: [`NavigationState`] for position and the rendered
//! window, [`ViewConfig`] for presentation settings, and
//! [`ViewProperties`] as the strict persisted projection of the config.
//! Reading position is persisted through a separate keyed channel (see
//! [`PositionStore`](crate::store::PositionStore)), not through the
//! projection; the two channels have different durability needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::structure::ViewportSize;

/// Navigation and rendering state for one reading session.
///
/// `spine_position` is `None` until the package document has been fetched
/// and the persisted position restored. Once navigation has completed,
/// the position is always a member of `rendered_spine_items`; the single
/// exception is the window of a deferred render that has not completed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Current spine item index; `None` before restore.
    pub spine_position: Option<usize>,
    /// Spine indices currently materialized by the paginator, in order.
    pub rendered_spine_items: Vec<usize>,
    /// Intra-section anchor target from the last href navigation.
    pub hash_fragment: Option<String>,
    /// Viewport of the current section, for fixed-layout sections that
    /// declare one.
    pub meta_size: Option<ViewportSize>,
    /// Whether the package declares a table-of-contents item.
    pub has_toc: bool,
}

/// Presentation settings, independent of navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    /// Font scale in display units.
    pub font_size: i32,
    /// Two-page spread mode.
    pub two_up: bool,
    /// Full-screen flag.
    pub full_screen: bool,
    /// Toolbar visibility.
    pub toolbar_visible: bool,
    /// Table-of-contents panel visibility.
    pub toc_visible: bool,
    /// Whether the viewport is wide enough for two-page mode.
    pub can_two_up: bool,
    /// Theme identifier.
    pub theme: String,
    /// Page margin size in display units.
    pub margin: u8,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            font_size: 10,
            two_up: false,
            full_screen: false,
            toolbar_visible: true,
            toc_visible: false,
            can_two_up: true,
            theme: "default-theme".to_string(),
            margin: 3,
        }
    }
}

/// Persisted projection of [`ViewConfig`].
///
/// Only whitelisted settings are persisted; transient view state
/// (full-screen, panel visibility) is deliberately excluded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewProperties {
    /// Theme identifier.
    pub current_theme: String,
    /// Page margin size.
    pub current_margin: u8,
    /// Font scale.
    pub font_size: i32,
    /// Two-page spread mode.
    pub two_up: bool,
    /// Storage key derived from the document key.
    pub key: String,
    /// Stamp of the save that produced this record.
    pub updated_at: DateTime<Utc>,
}

impl ViewProperties {
    /// Build the persisted projection for `config` under `key`.
    pub fn project(config: &ViewConfig, key: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            current_theme: config.theme.clone(),
            current_margin: config.margin,
            font_size: config.font_size,
            two_up: config.two_up,
            key,
            updated_at,
        }
    }
}
