// src/page/topbar.rs
// Navigation bar shared by every generated page and the site index.

use crate::markdown::escape;

/// Top bar markup: the site name twice (wide and narrow layouts) and a
/// "Packages" link, all pointing at the site root.
pub fn top_bar(base_path: &str, site_name: &str, link_index: bool) -> String {
    let home = if link_index {
        format!("{}index.html", base_path)
    } else {
        base_path.to_string()
    };
    let home = escape(&home);
    let name = escape(site_name);

    format!(
        r#"<div class="container">
<div class="top-heading" id="heading-wide"><a href="{home}">{name}</a></div>
<div class="top-heading" id="heading-narrow"><a href="{home}">{name}</a></div>
<div id="menu">
<a href="{home}" style="margin-right: 10px;">Packages</a>
</div>
</div>"#
    )
}
