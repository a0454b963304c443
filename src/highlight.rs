//! Syntax highlighting for the markup and metadata previews using syntect.

use egui::Color32;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Cached syntax highlighting resources.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight `code` as the language of files ending in `extension`
    /// (`html`, `json`, ...) and return a list of (text, color) spans.
    pub fn highlight(&self, code: &str, extension: &str) -> Vec<(String, Color32)> {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension(extension)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme() else {
            return vec![(code.to_string(), Color32::LIGHT_GRAY)];
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut result = Vec::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, text) in ranges {
                        result.push((text.to_string(), style_to_color32(style)));
                    }
                }
                Err(_) => {
                    result.push((line.to_string(), Color32::LIGHT_GRAY));
                }
            }
        }

        result
    }

    /// Render highlighted code as a LayoutJob for egui.
    pub fn layout_job(&self, code: &str, extension: &str) -> egui::text::LayoutJob {
        let mut job = egui::text::LayoutJob::default();

        for (text, color) in self.highlight(code, extension) {
            job.append(
                &text,
                0.0,
                egui::TextFormat {
                    font_id: egui::FontId::monospace(12.0),
                    color,
                    ..Default::default()
                },
            );
        }

        job
    }
}

fn style_to_color32(style: Style) -> Color32 {
    Color32::from_rgb(style.foreground.r, style.foreground.g, style.foreground.b)
}

/// Read-only viewer. Highlighting can be turned off for large documents.
pub fn code_viewer(
    ui: &mut egui::Ui,
    highlighter: &Highlighter,
    code: &str,
    extension: &str,
    highlighted: bool,
) {
    egui::ScrollArea::both()
        .id_salt(("code_viewer", extension))
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if highlighted {
                let job = highlighter.layout_job(code, extension);
                ui.add(egui::Label::new(job).selectable(true));
            } else {
                ui.add(egui::Label::new(egui::RichText::new(code).monospace()).selectable(true));
            }
        });
}

/// Pretty-prints compact markup one element per line so the preview is
/// readable. Text content and empty bodies stay on their element's line.
pub fn indent_markup(markup: &str) -> String {
    #[derive(PartialEq)]
    enum Last {
        Nothing,
        Open,
        Text,
        Close,
    }

    let mut out = String::with_capacity(markup.len() * 2);
    let mut depth = 0usize;
    let mut last = Last::Nothing;
    let mut rest = markup;

    let newline = |out: &mut String, depth: usize| {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    };

    while let Some(start) = rest.find('<') {
        if start > 0 {
            out.push_str(&rest[..start]);
            last = Last::Text;
        }
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start..=start + len];
        if tag.starts_with("</") {
            depth = depth.saturating_sub(1);
            if last == Last::Close {
                newline(&mut out, depth);
            }
            last = Last::Close;
        } else {
            if last != Last::Nothing {
                newline(&mut out, depth);
            }
            depth += 1;
            last = Last::Open;
        }
        out.push_str(tag);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}
