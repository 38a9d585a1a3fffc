use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

const ELLIPSIS: char = '…';

/// Makes API-provided text safe to print on a single terminal line.
///
/// Drops ANSI escape sequences and other control characters, and folds any
/// run of whitespace (including newlines) into one space. Returns
/// `Cow::Borrowed` when nothing needed changing.
pub fn sanitize_line(s: &str) -> Cow<'_, str> {
    let clean = !s.chars().any(|c| c.is_control())
        && !s.contains("  ")
        && s.trim() == s;
    if clean {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                // CSI: parameters until a final byte in @..~
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() {
            continue;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    Cow::Owned(out)
}

/// Cuts `s` to at most `max_width` terminal columns, ending in `…` when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let mut width = 0;
    // Byte offset where the text must stop to leave room for the ellipsis
    let mut keep_until = None;

    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if keep_until.is_none() && width + w + 1 > max_width {
            keep_until = Some(idx);
        }
        width += w;
        if width > max_width {
            let end = keep_until.unwrap_or(idx);
            if max_width == 0 {
                return Cow::Borrowed("");
            }
            let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
            out.push_str(&s[..end]);
            out.push(ELLIPSIS);
            return Cow::Owned(out);
        }
    }

    Cow::Borrowed(s)
}
