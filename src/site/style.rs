// src/site/style.rs
// The site stylesheet: godoc's own style.css plus rules for the static
// <details>/<summary> widgets that replace godoc's script-driven toggles.

/// Backend path of godoc's stylesheet.
pub const BACKEND_STYLESHEET: &str = "/lib/godoc/style.css";

const STATIC_CSS: &str = r#"
/* godoc-static */
details {
	margin-bottom: 1.25rem;
}
details > summary {
	cursor: pointer;
	color: #375EAB;
	font-weight: bold;
	margin: 1.25rem 0 0.625rem 0;
}
details > summary:hover {
	text-decoration: underline;
}
details > .expanded {
	display: block;
}
#topbar #menu a {
	white-space: nowrap;
}
"#;

/// Backend stylesheet with the static-mode rules appended.
pub fn site_stylesheet(backend_css: &str) -> String {
    let mut css = String::with_capacity(backend_css.len() + STATIC_CSS.len() + 1);
    css.push_str(backend_css);
    css.push('\n');
    css.push_str(STATIC_CSS);
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_details_rules() {
        let css = site_stylesheet("body { margin: 0; }");
        assert!(css.starts_with("body { margin: 0; }\n"));
        assert!(css.contains("details > summary"));
    }
}
