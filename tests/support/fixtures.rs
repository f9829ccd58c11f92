//! Markup and JSON shaped like the site's grid and lesson pages.

use serde_json::{Value, json};

pub const AJAX_PATH: &str = "/wp-admin/admin-ajax.php";

/// One lesson card as rendered in the posts fragment.
pub fn lesson_card(post: &str, page_id: &str, name: &str, chapter: u32) -> String {
    format!(
        r#"<article class="wpgb-card wpgb-post-{post}"><div class="wpgb-card-body">
<a class="rabbi" href="https://meirtv.com/rabbis/rav-levi/">Rav Levi</a>
<a class="series" href="/shiurim-series/kuzari/">Kuzari&nbsp;Series</a>
<span>פרק: {chapter}</span> <span>14/2/2024</span> <span>52 דקות</span>
<h3 class="title"><a href="/shiurim/{page_id}/">{name}</a></h3>
</div></article>"#
    )
}

/// Select-style markup for the rabbis facet.
pub fn rabbis_select() -> String {
    concat!(
        r#"<select class="wpgb-select"><option value="">All</option>"#,
        r#"<option value="12">Rav Levi&nbsp;(34)</option>"#,
        r#"<option value="rav-cohen">Rav Cohen&nbsp;(7)</option></select>"#,
    )
    .to_string()
}

/// Checkbox-style markup for the occasions facet.
pub fn occasions_checkboxes() -> String {
    concat!(
        r#"<ul><li><div class="wpgb-checkbox" data-facet-value="pesach">"#,
        r#"<span class="wpgb-checkbox-label">Pesach</span>"#,
        r#"<span class="wpgb-facet-count">(4)</span></div></li></ul>"#,
    )
    .to_string()
}

/// Grid endpoint body with facets keyed by numeric facet id.
pub fn grid_body(facets: &[(&str, String)], posts: &str) -> Value {
    let mut facet_map = serde_json::Map::new();
    for (id, html) in facets {
        facet_map.insert((*id).to_string(), json!({ "html": html }));
    }
    json!({ "facets": facet_map, "posts": posts })
}

/// Lesson page embedding an audio player.
pub fn lesson_page(src: &str) -> String {
    format!(
        r#"<html><body><div class="player"><audio controls preload="none">
<source src="{src}" type="audio/mpeg"></audio></div></body></html>"#
    )
}
