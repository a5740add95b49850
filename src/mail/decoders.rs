use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use html2text::render::TrivialDecorator;

/// Gmail emits URL-safe base64, sometimes without padding.
const GMAIL_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const HTML_WRAP_WIDTH: usize = 4096;

/// Decode a `body.data` field into text. Never fails: invalid UTF-8 is
/// replaced by U+FFFD and undecodable base64 yields a single U+FFFD.
pub fn decode_body_data(data: &str) -> String {
    match GMAIL_BASE64.decode(data.trim()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            log::debug!("body data is not valid base64: {e}");
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// Render HTML to its visible text, without any markup decoration.
pub fn html_to_text(html: &str) -> String {
    // html2text has panicked on hostile input before
    let rendered = std::panic::catch_unwind(|| {
        html2text::config::with_decorator(TrivialDecorator::new())
            .raw_mode(true)
            .allow_width_overflow()
            .string_from_read(html.as_bytes(), HTML_WRAP_WIDTH)
    });

    match rendered {
        Ok(Ok(text)) => text.trim_end().to_string(),
        Ok(Err(e)) => {
            log::debug!("html2text failed ({e}); stripping tags instead");
            strip_tags(html)
        }
        Err(_) => {
            log::debug!("html2text panicked; stripping tags instead");
            strip_tags(html)
        }
    }
}

/// Best-effort tag removal. An unterminated tag swallows the rest of the
/// input, matching how browsers treat it.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.trim_end().to_string()
}
