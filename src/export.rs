//! Exports of a cell's content.
//!
//! All exports are pure functions of the buffer text (and, for the highlighted
//! formats, its styled runs). Soft breaks never reach an export: they are
//! layout, not content.

use std::ops::Range;

use crate::style::run::{DisplayRun, RunKind};
use crate::style::token::TextStyle;
use crate::style::{CellKind, StyledText};
use crate::util::text::NBSP;

/// Logical text with non-breaking spaces turned into plain spaces.
///
/// With `range`, only that part of the text is returned (clamped).
pub fn to_plain_text(text: &str, range: Option<Range<usize>>) -> String {
    let plain = text.chars().map(|ch| match ch {
        '\r' | NBSP => ' ',
        other => other,
    });
    match range {
        Some(range) => {
            let len = text.chars().count();
            let start = range.start.min(len);
            let end = range.end.clamp(start, len);
            plain.skip(start).take(end - start).collect()
        }
        None => plain.collect(),
    }
}

// =============================================================================
// HTML
// =============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br/>\n"),
            '\r' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Keep the first space of every run of spaces breakable, pin the rest
fn pin_repeated_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut first_space = true;
    for ch in text.chars() {
        if ch == ' ' {
            if first_space {
                out.push(' ');
                first_space = false;
            } else {
                out.push(NBSP);
            }
        } else {
            out.push(ch);
            first_space = true;
        }
    }
    out
}

/// HTML fragment with one `<span class="code_*">` per highlighted run
pub fn to_html(styled: &StyledText) -> String {
    let mut html = String::new();
    for run in &styled.runs {
        let text = if run.is_soft_break() {
            " ".to_string()
        } else {
            pin_repeated_spaces(&escape_html(&run.text))
        };
        match run.style.and_then(TextStyle::css_class) {
            Some(class) => {
                html.push_str("<span class=\"");
                html.push_str(class);
                html.push_str("\">");
                html.push_str(&text);
                html.push_str("</span>");
            }
            None => html.push_str(&text),
        }
    }
    html
}

// =============================================================================
// Markup (RTF paragraphs)
// =============================================================================

fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\line\n"),
            '\r' | NBSP => out.push(' '),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF wants signed 16 bit code units
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

/// Paragraph prefix for a heading, None for code and plain text
fn heading_paragraph(kind: CellKind) -> Option<&'static str> {
    match kind {
        CellKind::Title => Some("\\pard\\s16\\b\\f0\\fs56 "),
        CellKind::Section => Some("\\pard\\s1\\b\\f0\\fs40 "),
        CellKind::Subsection => Some("\\pard\\s2\\b\\f0\\fs36 "),
        CellKind::Subsubsection => Some("\\pard\\s3\\b\\f0\\fs32 "),
        CellKind::Heading5 => Some("\\pard\\s4\\b\\f0\\fs32 "),
        CellKind::Heading6 => Some("\\pard\\s5\\b\\f0\\fs32 "),
        CellKind::Code | CellKind::Text => None,
    }
}

const CODE_PARAGRAPH: &str = "\\pard\\s21\\li1105\\lin1105\\f0\\fs24 ";

/// RTF fragment: heading paragraphs by cell role, colour-tagged code runs
pub fn to_markup(kind: CellKind, text: &str, styled: &StyledText) -> String {
    if let Some(paragraph) = heading_paragraph(kind) {
        return format!("{paragraph}{}\n", escape_rtf(text));
    }
    if !kind.is_code() {
        return format!("\\pard\\s0 {}", escape_rtf(text));
    }

    let default = TextStyle::Default.color_index();
    let mut rtf = String::from(" ");
    for run in styled.runs.iter().filter(|r| r.kind != RunKind::Annotation) {
        push_code_run(&mut rtf, run, default);
    }
    rtf.push_str(&format!("\\cf{default} "));
    rtf
}

fn push_code_run(rtf: &mut String, run: &DisplayRun, default: u8) {
    let text = escape_rtf(&run.text);
    match run.style {
        Some(style) => {
            rtf.push_str(&format!("\\cf{} ", style.color_index()));
            rtf.push_str(&text);
        }
        None => {
            rtf.push_str(&format!("\\cf{default} {{"));
            rtf.push_str(&text);
            rtf.push_str("}\n");
        }
    }
    if run.text.contains('\n') {
        rtf.push_str(CODE_PARAGRAPH);
    }
}

// =============================================================================
// XML persistence tag
// =============================================================================

fn xml_type(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Code => "input",
        CellKind::Text => "text",
        CellKind::Title => "title",
        CellKind::Section => "section",
        // deeper headings load as subsections in readers that predate them
        CellKind::Subsection
        | CellKind::Subsubsection
        | CellKind::Heading5
        | CellKind::Heading6 => "subsection",
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            '\r' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// `<editor type="...">` element with one `<line>` per hard line
pub fn to_xml(kind: CellKind, text: &str) -> String {
    let mut xml = format!("<editor type=\"{}\"", xml_type(kind));
    if let Some(level) = kind.sectioning_level() {
        xml.push_str(&format!(" sectioning_level=\"{level}\""));
    }
    xml.push_str(">\n");
    for line in text.split('\n') {
        xml.push_str("<line>");
        xml.push_str(&escape_xml(line));
        xml.push_str("</line>\n");
    }
    xml.push_str("</editor>\n");
    xml
}

// =============================================================================
// TeX
// =============================================================================

/// Marks a cell whose text is already TeX
const RAW_TEX_PREFIX: &str = "TeX:";

fn tex_symbol(ch: char) -> Option<&'static str> {
    let tex = match ch {
        '\\' => "\\ensuremath{\\backslash}",
        '^' => "\\^ ",
        '~' => "\\ensuremath{\\sim }",
        '_' => "\\_",
        '$' => "\\$",
        '%' => "\\%",
        '&' => "\\&",
        '@' => "\\ensuremath{@}",
        '#' => "\\ensuremath{\\neq}",
        '<' => "\\ensuremath{<}",
        '>' => "\\ensuremath{>}",
        NBSP => "~",
        '\r' => " ",
        '\u{00B0}' => "\\ensuremath{^\\circ}",
        '\u{2212}' | '\u{2052}' | '\u{FE63}' | '\u{FF0D}' => "-",
        '\u{FF0B}' | '\u{FB29}' => "+",
        '\u{00B1}' => "\\ensuremath{\\pm}",
        '\u{00B2}' => "\\ensuremath{^2}",
        '\u{00B3}' => "\\ensuremath{^3}",
        '\u{00BD}' => "\\ensuremath{\\frac{1}{2}}",
        '\u{00AC}' => "\\ensuremath{\\neg}",
        '\u{221A}' => "\\ensuremath{\\sqrt{}}",
        '\u{2148}' => "\\ensuremath{\\mathbbm{i}}",
        '\u{2147}' => "\\ensuremath{\\mathbbm{e}}",
        '\u{210F}' | '\u{0127}' => "\\ensuremath{\\hbar}",
        '\u{0126}' => "\\ensuremath{\\Hbar}",
        '\u{2203}' => "\\ensuremath{\\exists}",
        '\u{2204}' => "\\ensuremath{\\nexists}",
        '\u{2208}' => "\\ensuremath{\\in}",
        '\u{21D2}' => "\\ensuremath{\\Longrightarrow}",
        '\u{221E}' => "\\ensuremath{\\infty}",
        '\u{22C0}' => "\\ensuremath{\\wedge}",
        '\u{22C1}' => "\\ensuremath{\\vee}",
        '\u{22BB}' => "\\ensuremath{\\oplus}",
        '\u{22BC}' => "\\ensuremath{\\overline{\\wedge}}",
        '\u{22BD}' => "\\ensuremath{\\overline{\\vee}}",
        '\u{22C3}' => "\\ensuremath{\\cup}",
        '\u{22C2}' => "\\ensuremath{\\cap}",
        '\u{2286}' => "\\ensuremath{\\subseteq}",
        '\u{2282}' => "\\ensuremath{\\subset}",
        '\u{2288}' => "\\ensuremath{\\not\\subseteq}",
        '\u{2205}' => "\\ensuremath{\\emptyset}",
        '\u{2202}' => "\\ensuremath{\\partial}",
        '\u{222B}' => "\\ensuremath{\\int}",
        '\u{2245}' => "\\ensuremath{\\approx}",
        '\u{221D}' => "\\ensuremath{\\propto}",
        '\u{2260}' => "\\ensuremath{\\neq}",
        '\u{2264}' => "\\ensuremath{\\leq}",
        '\u{2265}' => "\\ensuremath{\\geq}",
        '\u{226A}' => "\\ensuremath{\\ll}",
        '\u{226B}' => "\\ensuremath{\\gg}",
        '\u{220E}' => "\\ensuremath{\\blacksquare}",
        '\u{2263}' => "\\ensuremath{\\equiv}",
        '\u{2211}' => "\\ensuremath{\\sum}",
        '\u{220F}' => "\\ensuremath{\\prod}",
        '\u{2225}' => "\\ensuremath{\\parallel}",
        '\u{27C2}' => "\\ensuremath{\\bot}",
        '\u{219D}' => "\\ensuremath{\\leadsto}",
        '\u{2192}' => "\\ensuremath{\\rightarrow}",
        '\u{27F6}' => "\\ensuremath{\\longrightarrow}",
        _ => return greek_symbol(ch),
    };
    Some(tex)
}

fn greek_symbol(ch: char) -> Option<&'static str> {
    let tex = match ch {
        '\u{03B1}' => "\\ensuremath{\\alpha}",
        '\u{03B2}' => "\\ensuremath{\\beta}",
        '\u{03B3}' => "\\ensuremath{\\gamma}",
        '\u{03B4}' => "\\ensuremath{\\delta}",
        '\u{03B5}' => "\\ensuremath{\\epsilon}",
        '\u{03B6}' => "\\ensuremath{\\zeta}",
        '\u{03B7}' => "\\ensuremath{\\eta}",
        '\u{03B8}' => "\\ensuremath{\\theta}",
        '\u{03B9}' => "\\ensuremath{\\iota}",
        '\u{03BA}' => "\\ensuremath{\\kappa}",
        '\u{03BB}' => "\\ensuremath{\\lambda}",
        '\u{03BC}' => "\\ensuremath{\\mu}",
        '\u{03BD}' => "\\ensuremath{\\nu}",
        '\u{03BE}' => "\\ensuremath{\\xi}",
        '\u{03BF}' => "o",
        '\u{03C0}' => "\\ensuremath{\\pi}",
        '\u{03C1}' => "\\ensuremath{\\rho}",
        '\u{03C3}' => "\\ensuremath{\\sigma}",
        '\u{03C4}' => "\\ensuremath{\\tau}",
        '\u{03C5}' => "\\ensuremath{\\upsilon}",
        '\u{03C6}' => "\\ensuremath{\\phi}",
        '\u{03C7}' => "\\ensuremath{\\chi}",
        '\u{03C8}' => "\\ensuremath{\\psi}",
        '\u{03C9}' => "\\ensuremath{\\omega}",
        '\u{0391}' => "A",
        '\u{0392}' => "B",
        '\u{0393}' => "\\ensuremath{\\Gamma}",
        '\u{0394}' => "\\ensuremath{\\Delta}",
        '\u{0395}' => "E",
        '\u{0396}' => "Z",
        '\u{0397}' => "H",
        '\u{0398}' => "\\ensuremath{\\Theta}",
        '\u{0399}' => "I",
        '\u{039A}' => "K",
        '\u{039B}' => "\\ensuremath{\\Lambda}",
        '\u{039C}' => "M",
        '\u{039D}' => "N",
        '\u{039E}' => "\\ensuremath{\\Xi}",
        '\u{039F}' => "O",
        '\u{03A0}' => "\\ensuremath{\\Pi}",
        '\u{03A1}' => "P",
        '\u{03A3}' => "\\ensuremath{\\Sigma}",
        '\u{03A4}' => "T",
        '\u{03A5}' => "\\ensuremath{\\Upsilon}",
        '\u{03A6}' => "\\ensuremath{\\Phi}",
        '\u{03A7}' => "X",
        '\u{03A8}' => "\\ensuremath{\\Psi}",
        '\u{03A9}' => "\\ensuremath{\\Omega}",
        _ => return None,
    };
    Some(tex)
}

/// TeX source for the cell.
///
/// Text starting with `TeX:` is passed through verbatim (minus the marker).
/// In code cells spaces and line breaks are forced so the layout survives.
pub fn to_tex(kind: CellKind, text: &str) -> String {
    if let Some(raw) = text.strip_prefix(RAW_TEX_PREFIX) {
        return raw.strip_prefix(' ').unwrap_or(raw).to_string();
    }

    let mut tex = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' if kind.is_code() => tex.push_str("\\\\\n"),
            ' ' if kind.is_code() => tex.push_str("\\ "),
            _ => match tex_symbol(ch) {
                Some(symbol) => tex.push_str(symbol),
                None => tex.push(ch),
            },
        }
    }
    tex
}
