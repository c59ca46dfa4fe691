//! Code-bundle extraction from generated text
//!
//! The model answers with three fenced blocks. While the answer is still
//! streaming, a block may be open without its closing fence; its partial body
//! is used until the next block starts.

/// The html/css/js triple carried by a generation response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBundle {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl CodeBundle {
    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }
}

const CLOSING_FENCE: &str = "\n```";

fn opening_fence(lang: &str) -> String {
    format!("```{}\n", lang)
}

/// Body of the first complete `lang` block
fn complete_block<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let fence = opening_fence(lang);
    let start = text.find(&fence)? + fence.len();
    let body = &text[start..];
    let end = body.find(CLOSING_FENCE)?;
    Some(body[..end].trim())
}

/// Everything after the first `lang` opening fence
fn open_block<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let fence = opening_fence(lang);
    let start = text.find(&fence)? + fence.len();
    Some(&text[start..])
}

fn extract_section(text: &str, lang: &str, next_lang: Option<&str>, previous: &str) -> String {
    if let Some(body) = complete_block(text, lang) {
        return body.to_string();
    }
    match open_block(text, lang) {
        Some(partial) => {
            let next_started = next_lang
                .map(|next| partial.contains(&format!("```{}", next)))
                .unwrap_or(false);
            if next_started {
                previous.to_string()
            } else {
                partial.trim().to_string()
            }
        }
        None => previous.to_string(),
    }
}

/// Extract the html, css and javascript blocks from `text`
///
/// Sections not present in `text` keep their value from `previous`.
pub fn extract_bundle(text: &str, previous: &CodeBundle) -> CodeBundle {
    CodeBundle {
        html: extract_section(text, "html", Some("css"), &previous.html),
        css: extract_section(text, "css", Some("javascript"), &previous.css),
        js: extract_section(text, "javascript", None, &previous.js),
    }
}

/// Accumulates streamed text and tracks the bundle it describes
#[derive(Debug, Default)]
pub struct BundleAccumulator {
    text: String,
    bundle: CodeBundle,
    deltas: usize,
}

impl BundleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing bundle, e.g. the site being modified
    pub fn with_initial(bundle: CodeBundle) -> Self {
        Self {
            bundle,
            ..Self::default()
        }
    }

    /// Append a delta; returns the bundle when it changed
    pub fn push(&mut self, delta: &str) -> Option<&CodeBundle> {
        self.text.push_str(delta);
        self.deltas += 1;

        let next = extract_bundle(&self.text, &self.bundle);
        if next == self.bundle {
            return None;
        }
        self.bundle = next;
        Some(&self.bundle)
    }

    pub fn bundle(&self) -> &CodeBundle {
        &self.bundle
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of deltas pushed so far
    pub fn deltas(&self) -> usize {
        self.deltas
    }

    pub fn finish(self) -> CodeBundle {
        self.bundle
    }
}
