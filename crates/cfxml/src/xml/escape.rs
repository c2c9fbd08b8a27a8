//! Entity escaping for text and attribute values

use std::borrow::Cow;

/// Escape character data for element content
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Escape an attribute value delimited by `quote`
pub fn escape_attr(input: &str, quote: char) -> Cow<'_, str> {
    if !input.contains(['&', '<', quote, '\t', '\n', '\r']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Decode entity and character references plus CDATA sections.
///
/// Returns the byte offset of the first malformed reference on failure.
pub fn unescape(raw: &str) -> Result<Cow<'_, str>, usize> {
    if !raw.contains(['&', '<']) {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find(['&', '<']) {
        let (plain, marked) = rest.split_at(idx);
        out.push_str(plain);
        let offset = raw.len() - marked.len();

        if let Some(cdata) = marked.strip_prefix("<![CDATA[") {
            let end = cdata.find("]]>").ok_or(offset)?;
            let (content, after) = cdata.split_at(end);
            out.push_str(content);
            rest = after.get(3..).unwrap_or_default();
            continue;
        }
        if marked.starts_with('<') {
            return Err(offset);
        }

        let end = marked.find(';').ok_or(offset)?;
        let entity = marked.get(1..end).ok_or(offset)?;
        let ch = decode_entity(entity).ok_or(offset)?;
        out.push(ch);
        rest = marked.get(end + 1..).unwrap_or_default();
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    }
}
