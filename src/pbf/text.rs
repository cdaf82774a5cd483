use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::pbf::{PbfError, Result};

/// Characters left alone by URI-component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

/// Standard alphabet, padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Marker introducing a two-digit hex escape inside string values.
pub(crate) const ESCAPE_MARKER: char = '*';

/// One `NUMBER LETTER REST` token, delimiter already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
	pub field_number: u32,
	pub letter: char,
	pub rest: &'a str,
}

/// Split a delimiter-free token into number, type letter, and payload.
pub(crate) fn parse_token<'a>(piece: &'a str, name: &str) -> Result<Token<'a>> {
	let malformed = || PbfError::MalformedToken {
		token: piece.to_owned(),
		name: name.to_owned(),
	};

	let digits = piece.bytes().take_while(u8::is_ascii_digit).count();
	if digits == 0 {
		return Err(malformed());
	}
	let letter = piece[digits..].chars().next().filter(char::is_ascii_lowercase).ok_or_else(malformed)?;
	let field_number = piece[..digits].parse::<u32>().map_err(|_| malformed())?;
	if field_number == 0 {
		return Err(PbfError::InvalidFieldNumber {
			field_number,
			name: name.to_owned(),
		});
	}

	Ok(Token {
		field_number,
		letter,
		rest: &piece[digits + 1..],
	})
}

/// Remove an optional leading `DELIM NUMBER LETTER` from a single field's text value.
///
/// Returns the number found in the prefix, if any, and the remaining payload.
pub(crate) fn strip_field_prefix<'a>(text: &'a str, delimiter: char, own_number: Option<u32>, own_letter: char, name: &str) -> Result<(Option<u32>, &'a str)> {
	let Some(token_text) = text.strip_prefix(delimiter) else {
		return Ok((None, text));
	};

	let token = parse_token(token_text, name)?;
	if let Some(expected) = own_number.filter(|expected| *expected != token.field_number) {
		return Err(PbfError::FieldNumberMismatch {
			expected,
			got: token.field_number,
			name: name.to_owned(),
		});
	}
	if token.letter != own_letter {
		return Err(PbfError::TypeLetterMismatch {
			expected: own_letter,
			got: token.letter,
			name: name.to_owned(),
		});
	}
	Ok((Some(token.field_number), token.rest))
}

/// URI-component encode, then hex-escape the escape marker and the delimiter.
pub(crate) fn escape_string(value: &str, delimiter: char) -> String {
	let encoded = utf8_percent_encode(value, URI_COMPONENT).to_string();
	let mut out = String::with_capacity(encoded.len());
	for ch in encoded.chars() {
		if ch == ESCAPE_MARKER || ch == delimiter {
			out.push(ESCAPE_MARKER);
			out.push_str(&format!("{:02X}", u32::from(ch)));
		} else {
			out.push(ch);
		}
	}
	out
}

/// Reverse [`escape_string`].
pub(crate) fn unescape_string(text: &str, name: &str) -> Result<String> {
	let invalid = || PbfError::InvalidEscape {
		text: text.to_owned(),
		name: name.to_owned(),
	};

	let mut unescaped = String::with_capacity(text.len());
	let mut chars = text.char_indices();
	while let Some((at, ch)) = chars.next() {
		if ch != ESCAPE_MARKER {
			unescaped.push(ch);
			continue;
		}
		let hex = text.get(at + 1..at + 3).ok_or_else(invalid)?;
		let code = u8::from_str_radix(hex, 16).map_err(|_| invalid())?;
		if !code.is_ascii() {
			return Err(invalid());
		}
		unescaped.push(char::from(code));
		chars.nth(1);
	}

	percent_decode_str(&unescaped)
		.decode_utf8()
		.map(|value| value.into_owned())
		.map_err(|_| PbfError::InvalidUtf8 { name: name.to_owned() })
}

/// URL-safe base64 without padding.
pub(crate) fn encode_base64_url(bytes: &[u8]) -> String {
	URL_SAFE_NO_PAD.encode(bytes)
}

/// Standard padded base64.
pub(crate) fn encode_base64(bytes: &[u8]) -> String {
	STANDARD.encode(bytes)
}

/// Decode either base64 alphabet, with or without padding.
pub(crate) fn decode_base64(text: &str, name: &str) -> Result<Vec<u8>> {
	let normalized: String = text
		.chars()
		.map(|ch| match ch {
			'-' => '+',
			'_' => '/',
			other => other,
		})
		.collect();
	LENIENT.decode(normalized).map_err(|source| PbfError::InvalidBase64 {
		source,
		name: name.to_owned(),
	})
}
