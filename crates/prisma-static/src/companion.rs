//! Companion pages.
//!
//! Secondary hand-written pages (an inclusion page, say) get the
//! accessibility controls of the generated main page, a floating link back
//! to it, and a contact form id the contact script can bind to.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

pub const ACCESSIBILITY_BUTTON_ID: &str = "accessibility-btn";
pub const ACCESSIBILITY_PANEL_ID: &str = "accessibility-panel";
pub const CONTACT_FORM_ID: &str = "contact-form";

static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>.*?</script>").expect("Invalid script block regex")
});

static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body\b[^>]*>").expect("Invalid body regex"));

static BODY_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("Invalid body close regex"));

static MAIN_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<main\b[^>]*>").expect("Invalid main regex"));

static SECTION_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<section\b[^>]*>").expect("Invalid section regex"));

static FORM_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<form\b([^>]*)>").expect("Invalid form regex"));

static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bid\s*=").expect("Invalid id attribute regex"));

/// Statement on its own line that looks up the toggle button, e.g.
/// `const accBtn = document.getElementById('accessibility-btn');`.
static WIRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*(?:const|let|var)\s+[\w$]+\s*=\s*document\.getElementById\(\s*["']accessibility-btn["']\s*\)"#,
    )
    .expect("Invalid accessibility wiring regex")
});

static CONTACT_FORM_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bid\s*=\s*["']contact-form["']"#).expect("Invalid contact form id regex")
});

/// Link rendered as a floating button on companion pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackLink {
    pub href: String,
    pub label: String,
}

/// A hand-written page published next to the generated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionPage {
    /// Source HTML file; the output keeps its file name
    pub source: PathBuf,
    pub back_link: Option<BackLink>,
}

/// Accessibility markup lifted from the generated main page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessibilityKit {
    /// Toggle button followed by its panel, only when both exist
    pub controls: Option<String>,
    /// Inline script wiring the toggle button
    pub script: Option<String>,
}

impl AccessibilityKit {
    /// Extract the accessibility button, panel and wiring script from `html`.
    pub fn extract(html: &str) -> Self {
        let button = find_element(html, "button", ACCESSIBILITY_BUTTON_ID);
        let panel = find_element(html, "div", ACCESSIBILITY_PANEL_ID);

        let controls = match (button, panel) {
            (Some(button), Some(panel)) => Some(format!("{}\n{}", button, panel)),
            _ => None,
        };

        let script = SCRIPT_BLOCK_RE
            .captures_iter(html)
            .filter(|caps| !caps[1].to_ascii_lowercase().contains("src="))
            .map(|caps| caps[0].to_string())
            .find(|block| WIRING_RE.is_match(block));

        Self { controls, script }
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_none() && self.script.is_none()
    }
}

/// Apply the accessibility kit, back link and contact form id to a page.
pub fn integrate(page: &str, kit: &AccessibilityKit, back_link: Option<&BackLink>) -> String {
    let mut html = page.to_string();

    if let Some(controls) = &kit.controls {
        if let Some(body) = BODY_OPEN_RE.find(&html) {
            html.insert_str(body.end(), &format!("\n{}", controls));
        }
    }

    if let Some(link) = back_link {
        let anchor = render_back_link(link);
        if let Some(main) = MAIN_OPEN_RE.find(&html) {
            html.insert_str(main.end(), &anchor);
        } else if let Some(section) = SECTION_OPEN_RE.find(&html) {
            html.insert_str(section.start(), &anchor);
        }
    }

    if let Some(script) = &kit.script {
        if let Some(close) = BODY_CLOSE_RE.find(&html) {
            html.insert_str(close.start(), &format!("{}\n", script));
        }
    }

    tag_contact_form(&mut html);

    html
}

fn render_back_link(link: &BackLink) -> String {
    format!(
        "\n<a href=\"{}\" class=\"fixed bottom-6 right-6 z-50 bg-[#0d9488] hover:bg-[#0d7a6b] text-white font-semibold px-6 py-3 rounded-lg shadow-md transition-colors\" style=\"box-shadow: 0 2px 8px rgba(0,0,0,0.15);\">\n    {}\n</a>\n",
        escape_html(&link.href),
        escape_html(&link.label)
    )
}

/// Give the first id-less `<form>` the contact form id, unless some element
/// already carries it.
fn tag_contact_form(html: &mut String) {
    if CONTACT_FORM_ID_RE.is_match(html) {
        return;
    }

    let position = FORM_OPEN_RE
        .captures_iter(html)
        .find(|caps| !ID_ATTR_RE.is_match(&caps[1]))
        .and_then(|caps| caps.get(0))
        .map(|form| form.start() + "<form".len());

    if let Some(position) = position {
        html.insert_str(position, &format!(" id=\"{}\"", CONTACT_FORM_ID));
    }
}

/// Return the complete `<tag id="id">…</tag>` element, nested same-name tags
/// included.
fn find_element<'h>(html: &'h str, tag: &str, id: &str) -> Option<&'h str> {
    let tag = regex::escape(tag);
    let open = Regex::new(&format!(
        r#"(?i)<{tag}\b[^>]*\bid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    ))
    .ok()?;
    let boundary = Regex::new(&format!(r"(?i)<(/?){tag}\b[^>]*>")).ok()?;

    let start = open.find(html)?;
    let mut depth = 1usize;

    for caps in boundary.captures_iter(&html[start.end()..]) {
        let whole = caps.get(0)?;
        if caps[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&html[start.start()..start.end() + whole.end()]);
            }
        }
    }

    None
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
