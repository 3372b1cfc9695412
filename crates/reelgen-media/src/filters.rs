//! FFmpeg filter chain for captioned segments.
//!
//! The chain is deterministic: scale to fit inside the target frame keeping
//! aspect ratio, pad to the exact target size centered, then draw the caption.

use reelgen_models::{CaptionPosition, FrameSize};

/// Captions up to this many characters use the large font.
pub const CAPTION_SHORT_CHARS: usize = 40;
/// Captions up to this many characters use the medium font.
pub const CAPTION_MEDIUM_CHARS: usize = 100;

const FONT_SCALE_LARGE: f64 = 0.070;
const FONT_SCALE_MEDIUM: f64 = 0.055;
const FONT_SCALE_SMALL: f64 = 0.042;
const MIN_FONT_SIZE: u32 = 12;

/// Escape text for use as a `drawtext` literal.
///
/// Backslash is escaped first so no other escape is doubled.
pub fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' | ':' | '\'' | '%' | ',' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\r' => {}
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Characters the option parser treats specially inside a filter argument.
const OPTION_SPECIALS: [char; 3] = ['\\', '\'', ':'];
/// Characters the filtergraph parser treats specially.
const GRAPH_SPECIALS: [char; 6] = ['\\', '\'', '[', ']', ',', ';'];

fn escape_chars(value: &str, specials: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if specials.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// The `text=` value of a `drawtext` filter placed inside a `-vf` graph.
///
/// FFmpeg unescapes the value three times: once while splitting the graph,
/// once while splitting the filter's options, and once when drawtext expands
/// the text. Each line goes through [`escape_drawtext`] for the last pass and
/// lines are joined with a real newline, which drawtext renders as a break.
pub fn drawtext_text_value(caption: &str) -> String {
    let literal = caption
        .lines()
        .map(escape_drawtext)
        .collect::<Vec<_>>()
        .join("\n");
    escape_chars(&escape_chars(&literal, &OPTION_SPECIALS), &GRAPH_SPECIALS)
}

/// Caption font size for a frame width, shrinking as the caption grows.
pub fn caption_font_size(caption: &str, frame_width: u32) -> u32 {
    let chars = caption.chars().count();
    let scale = if chars <= CAPTION_SHORT_CHARS {
        FONT_SCALE_LARGE
    } else if chars <= CAPTION_MEDIUM_CHARS {
        FONT_SCALE_MEDIUM
    } else {
        FONT_SCALE_SMALL
    };
    ((frame_width as f64 * scale).round() as u32).max(MIN_FONT_SIZE)
}

/// Scale-to-fit then center-pad to exactly `size`.
pub fn scale_pad_filter(size: FrameSize) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1",
        w = size.width,
        h = size.height
    )
}

/// `drawtext` filter for a caption.
pub fn caption_filter(caption: &str, size: FrameSize, position: CaptionPosition) -> String {
    format!(
        "drawtext=text={text}:fontsize={font}:fontcolor=white:borderw=3:bordercolor=black:\
         line_spacing=8:x=(w-text_w)/2:y={y}",
        text = drawtext_text_value(caption.trim()),
        font = caption_font_size(caption.trim(), size.width),
        y = position.y_expression(),
    )
}

/// Full segment filter chain. Empty captions skip the overlay.
pub fn build_segment_filter(caption: &str, size: FrameSize, position: CaptionPosition) -> String {
    let base = scale_pad_filter(size);
    if caption.trim().is_empty() {
        base
    } else {
        format!("{},{}", base, caption_filter(caption, size, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_each_special_character() {
        assert_eq!(escape_drawtext(r"\"), r"\\");
        assert_eq!(escape_drawtext(":"), r"\:");
        assert_eq!(escape_drawtext("'"), r"\'");
        assert_eq!(escape_drawtext("%"), r"\%");
        assert_eq!(escape_drawtext(","), r"\,");
        assert_eq!(escape_drawtext("["), r"\[");
        assert_eq!(escape_drawtext("]"), r"\]");
        assert_eq!(escape_drawtext("a\nb"), r"a\nb");
    }

    #[test]
    fn test_escape_mixed_text() {
        assert_eq!(
            escape_drawtext(r"It's 50%: [ok], C:\path"),
            r"It\'s 50\%\: \[ok\]\, C\:\\path"
        );
    }

    #[test]
    fn test_escape_safe_text_unchanged_and_deterministic() {
        let safe = "Hello world from the ocean";
        assert_eq!(escape_drawtext(safe), safe);
        let tricky = "a:b,c'd%e[f]g\\h\ni";
        assert_eq!(escape_drawtext(tricky), escape_drawtext(tricky));
    }

    #[test]
    fn test_every_special_is_preceded_by_backslash() {
        let escaped = escape_drawtext(r"\:'%,[]");
        let chars: Vec<char> = escaped.chars().collect();
        assert_eq!(chars.len(), 14);
        for pair in chars.chunks(2) {
            assert_eq!(pair[0], '\\');
        }
    }

    /// One FFmpeg tokenizer pass: backslash takes the next character
    /// literally, single quotes group literally, and any of `terms` ends the
    /// token. Returns the token and the unparsed rest.
    fn take_token<'a>(input: &'a str, terms: &[char]) -> (String, &'a str) {
        let mut token = String::new();
        let mut chars = input.char_indices();
        while let Some((i, c)) = chars.next() {
            if terms.contains(&c) {
                return (token, &input[i..]);
            }
            match c {
                '\\' => {
                    if let Some((_, next)) = chars.next() {
                        token.push(next);
                    }
                }
                '\'' => {
                    for (_, quoted) in chars.by_ref() {
                        if quoted == '\'' {
                            break;
                        }
                        token.push(quoted);
                    }
                }
                _ => token.push(c),
            }
        }
        (token, "")
    }

    /// Parse a `-vf` argument the way FFmpeg does and return the drawtext
    /// options in order.
    fn drawtext_options(graph: &str) -> Option<Vec<(String, String)>> {
        let mut rest = graph;
        while !rest.is_empty() {
            let (filter, after) = take_token(rest, &['[', ']', ',', ';']);
            rest = after.get(1..).unwrap_or("");
            let Some(args) = filter.strip_prefix("drawtext=") else {
                continue;
            };

            let mut options = Vec::new();
            let mut args = args;
            while !args.is_empty() {
                let (key, after_key) = args.split_once('=')?;
                let (value, after_value) = take_token(after_key, &[':']);
                options.push((key.to_string(), value));
                args = after_value.get(1..).unwrap_or("");
            }
            return Some(options);
        }
        None
    }

    /// The caption text drawtext ends up drawing for a `-vf` argument.
    fn rendered_caption(graph: &str) -> Option<String> {
        let options = drawtext_options(graph)?;
        let (_, text) = options.into_iter().find(|(k, _)| k == "text")?;

        let mut drawn = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => drawn.extend(chars.next()),
                '%' => return None,
                _ => drawn.push(c),
            }
        }
        Some(drawn)
    }

    #[test]
    fn test_caption_survives_filtergraph_parsing() {
        let size = FrameSize::new(480, 852);
        for caption in [
            "Tip: it's\nnew",
            "50% off, [today]; C:\\temp",
            "Plain caption",
            "Quote 'inside' here",
        ] {
            let filter = build_segment_filter(caption, size, CaptionPosition::Bottom);
            assert_eq!(rendered_caption(&filter).as_deref(), Some(caption), "{filter}");

            let keys: Vec<String> = drawtext_options(&filter)
                .unwrap()
                .into_iter()
                .map(|(k, _)| k)
                .collect();
            assert_eq!(
                keys,
                vec![
                    "text", "fontsize", "fontcolor", "borderw", "bordercolor", "line_spacing",
                    "x", "y",
                ]
            );
        }
    }

    #[test]
    fn test_text_value_escapes_every_level() {
        assert_eq!(drawtext_text_value("a:b"), r"a\\\\\\:b");
        assert_eq!(drawtext_text_value("plain words"), "plain words");
    }

    #[test]
    fn test_font_size_tiers() {
        let short = caption_font_size("Hello world", 480);
        let medium = caption_font_size(&"a".repeat(80), 480);
        let long = caption_font_size(&"a".repeat(200), 480);
        assert!(short > medium);
        assert!(medium > long);
        assert_eq!(short, 34);
        assert!(caption_font_size(&"a".repeat(500), 100) >= MIN_FONT_SIZE);
    }

    #[test]
    fn test_scale_pad_filter() {
        let filter = scale_pad_filter(FrameSize::new(480, 852));
        assert!(filter.starts_with("scale=480:852:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=480:852:(ow-iw)/2:(oh-ih)/2"));
    }

    #[test]
    fn test_caption_positions() {
        let size = FrameSize::new(720, 1280);
        assert!(caption_filter("x", size, CaptionPosition::Top).contains("y=h*0.08"));
        assert!(caption_filter("x", size, CaptionPosition::Center).contains("y=(h-text_h)/2"));
        assert!(caption_filter("x", size, CaptionPosition::Bottom).contains("y=h-text_h-h*0.12"));
    }

    #[test]
    fn test_segment_filter_order() {
        let filter = build_segment_filter("Hi, there", FrameSize::new(480, 852), CaptionPosition::Bottom);
        let scale = filter.find("scale=").unwrap();
        let pad = filter.find("pad=").unwrap();
        let text = filter.find("drawtext=").unwrap();
        assert!(scale < pad && pad < text);
        assert_eq!(rendered_caption(&filter).as_deref(), Some("Hi, there"));

        let bare = build_segment_filter("  ", FrameSize::new(480, 852), CaptionPosition::Bottom);
        assert!(!bare.contains("drawtext"));
    }
}
