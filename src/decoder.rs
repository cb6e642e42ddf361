use indexmap::IndexMap;

use crate::bencode::Bencode;
use crate::error::DecodeError;

/// Containers nested deeper than this are rejected instead of recursing further.
pub const MAX_DEPTH: usize = 64;

impl Bencode {
    /// Decodes exactly one value starting at `offset`.
    ///
    /// Returns the value and the number of bytes it occupies, so
    /// `bytes[offset..offset + consumed]` is its complete encoding. Anything
    /// after that span is left alone.
    pub fn decode(bytes: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        decode_at(bytes, offset, 0)
    }

    /// Decodes a buffer that must contain a single value and nothing else.
    pub fn decode_all(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (value, consumed) = Self::decode(bytes, 0)?;

        if consumed != bytes.len() {
            return Err(DecodeError::TrailingData { offset: consumed });
        }

        Ok(value)
    }
}

fn decode_at(bytes: &[u8], offset: usize, depth: usize) -> Result<(Bencode, usize), DecodeError> {
    let Some(&lead) = bytes.get(offset) else {
        return Err(DecodeError::TruncatedInput { offset });
    };

    match lead {
        b'0'..=b'9' => decode_string(bytes, offset),
        b'i' => decode_integer(bytes, offset),
        b'l' => decode_list(bytes, offset, depth),
        b'd' => decode_dictionary(bytes, offset, depth),
        byte => Err(DecodeError::UnknownValueType { byte, offset }),
    }
}

fn decode_string(bytes: &[u8], offset: usize) -> Result<(Bencode, usize), DecodeError> {
    let (payload, consumed) = decode_bytes(bytes, offset)?;
    Ok((Bencode::String(payload), consumed))
}

fn decode_bytes(bytes: &[u8], offset: usize) -> Result<(Vec<u8>, usize), DecodeError> {
    let rest = &bytes[offset..];

    let colon = rest
        .iter()
        .position(|&c| c == b':')
        .ok_or(DecodeError::MalformedLength { offset })?;
    let len = parse_length(&rest[..colon]).ok_or(DecodeError::MalformedLength { offset })?;

    let start = colon + 1;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= rest.len())
        .ok_or(DecodeError::TruncatedInput {
            offset: bytes.len(),
        })?;

    Ok((rest[start..end].to_vec(), end))
}

// Plain decimal, no sign, no leading zeros except for `0:` itself.
fn parse_length(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    if digits.len() > 1 && digits[0] == b'0' {
        return None;
    }

    std::str::from_utf8(digits).ok()?.parse().ok()
}

fn decode_integer(bytes: &[u8], offset: usize) -> Result<(Bencode, usize), DecodeError> {
    let start = offset + 1;
    let mut cursor = start;

    if bytes.get(cursor) == Some(&b'-') {
        cursor += 1;
    }

    let digits_start = cursor;
    while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
        cursor += 1;
    }

    match bytes.get(cursor) {
        None => return Err(DecodeError::TruncatedInput { offset: cursor }),
        Some(b'e') => {}
        Some(_) => return Err(DecodeError::MalformedInteger { offset }),
    }

    let body = &bytes[start..cursor];
    let digits = &bytes[digits_start..cursor];

    // Rejects `03` and `-0` alike.
    let leading_zero =
        digits.first() == Some(&b'0') && (digits.len() > 1 || digits.len() != body.len());

    if digits.is_empty() || leading_zero {
        return Err(DecodeError::MalformedInteger { offset });
    }

    let number = std::str::from_utf8(body)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(DecodeError::IntegerOverflow { offset })?;

    // Through the closing `e`.
    Ok((Bencode::Integer(number), cursor + 1 - offset))
}

fn decode_list(bytes: &[u8], offset: usize, depth: usize) -> Result<(Bencode, usize), DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::NestingTooDeep { offset });
    }

    let mut cursor = offset + 1;
    let mut list = Vec::new();

    loop {
        match bytes.get(cursor) {
            None => return Err(DecodeError::TruncatedInput { offset: cursor }),
            Some(b'e') => return Ok((Bencode::List(list), cursor + 1 - offset)),
            Some(_) => {
                let (value, consumed) = decode_at(bytes, cursor, depth + 1)?;
                list.push(value);
                cursor += consumed;
            }
        }
    }
}

fn decode_dictionary(
    bytes: &[u8],
    offset: usize,
    depth: usize,
) -> Result<(Bencode, usize), DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::NestingTooDeep { offset });
    }

    let mut cursor = offset + 1;
    let mut dict = IndexMap::new();

    loop {
        match bytes.get(cursor) {
            None => return Err(DecodeError::TruncatedInput { offset: cursor }),
            Some(b'e') => return Ok((Bencode::Dictionary(dict), cursor + 1 - offset)),
            Some(lead) if !lead.is_ascii_digit() => {
                return Err(DecodeError::InvalidKeyType { offset: cursor })
            }
            Some(_) => {
                let (key, consumed) = decode_bytes(bytes, cursor)?;
                cursor += consumed;

                let (value, consumed) = decode_at(bytes, cursor, depth + 1)?;
                cursor += consumed;

                dict.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<(Bencode, usize), DecodeError> {
        Bencode::decode(bytes, 0)
    }

    #[test]
    fn decode_bencode_string() {
        assert_eq!(decode(b"5:hello"), Ok((Bencode::string("hello"), 7)));
        assert_eq!(decode(b"10:hello12345"), Ok((Bencode::string("hello12345"), 13)));
        assert_eq!(decode(b"0:"), Ok((Bencode::String(vec![]), 2)));
    }

    #[test]
    fn decode_bencode_string_binary_payload() {
        let (value, consumed) = decode(b"4:\x00\xff:e").unwrap();
        assert_eq!(value, Bencode::String(vec![0x00, 0xff, b':', b'e']));
        assert_eq!(consumed, 6);
    }

    #[test]
    fn decode_bencode_string_errors() {
        assert_eq!(decode(b"5:hi"), Err(DecodeError::TruncatedInput { offset: 4 }));
        assert_eq!(decode(b"5hello"), Err(DecodeError::MalformedLength { offset: 0 }));
        assert_eq!(decode(b"05:hello"), Err(DecodeError::MalformedLength { offset: 0 }));
        assert_eq!(decode(b"5x:hello"), Err(DecodeError::MalformedLength { offset: 0 }));
        assert_eq!(
            decode(b"99999999999999999999999:a"),
            Err(DecodeError::MalformedLength { offset: 0 })
        );
    }

    #[test]
    fn decode_bencode_integer() {
        assert_eq!(decode(b"i30e"), Ok((Bencode::Integer(30), 4)));
        assert_eq!(decode(b"i-42e"), Ok((Bencode::Integer(-42), 5)));
        assert_eq!(decode(b"i0e"), Ok((Bencode::Integer(0), 3)));
        assert_eq!(
            decode(b"i9223372036854775807e"),
            Ok((Bencode::Integer(i64::MAX), 21))
        );
        assert_eq!(
            decode(b"i-9223372036854775808e"),
            Ok((Bencode::Integer(i64::MIN), 22))
        );
    }

    #[test]
    fn decode_bencode_integer_malformed() {
        let inputs: [&[u8]; 10] = [
            b"i04e", b"i-0e", b"i-03e", b"ie", b"i-e", b"i1.5e", b"i+1e", b"i 1e", b"i--1e", b"i1x",
        ];
        for input in inputs {
            assert_eq!(
                decode(input),
                Err(DecodeError::MalformedInteger { offset: 0 }),
                "{}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn decode_bencode_integer_unterminated() {
        assert_eq!(decode(b"i42"), Err(DecodeError::TruncatedInput { offset: 3 }));
        assert_eq!(decode(b"i-"), Err(DecodeError::TruncatedInput { offset: 2 }));
    }

    #[test]
    fn decode_bencode_integer_error_ignores_later_bytes() {
        assert_eq!(decode(b"i1x"), Err(DecodeError::MalformedInteger { offset: 0 }));
        assert_eq!(
            decode(b"li1x4:spame"),
            Err(DecodeError::MalformedInteger { offset: 1 })
        );
    }

    #[test]
    fn decode_bencode_integer_overflow() {
        assert_eq!(
            decode(b"i9223372036854775808e"),
            Err(DecodeError::IntegerOverflow { offset: 0 })
        );
        assert_eq!(
            decode(b"i-99999999999999999999e"),
            Err(DecodeError::IntegerOverflow { offset: 0 })
        );
    }

    #[test]
    fn decode_bencode_list() {
        assert_eq!(
            decode(b"l5:helloi52ee"),
            Ok((
                Bencode::List(vec![Bencode::string("hello"), Bencode::Integer(52)]),
                13
            ))
        );
        assert_eq!(decode(b"le"), Ok((Bencode::List(vec![]), 2)));
    }

    #[test]
    fn decode_bencode_nested_list() {
        assert_eq!(
            decode(b"l4:spaml3:heyei52ee"),
            Ok((
                Bencode::List(vec![
                    Bencode::string("spam"),
                    Bencode::List(vec![Bencode::string("hey")]),
                    Bencode::Integer(52)
                ]),
                19
            ))
        );
    }

    #[test]
    fn decode_bencode_list_unterminated() {
        assert_eq!(decode(b"l5:hello"), Err(DecodeError::TruncatedInput { offset: 8 }));
        assert_eq!(decode(b"l"), Err(DecodeError::TruncatedInput { offset: 1 }));
    }

    #[test]
    fn decode_bencode_dictionary() {
        let mut expected = IndexMap::new();
        expected.insert(b"foo".to_vec(), Bencode::string("bar"));
        expected.insert(b"hello".to_vec(), Bencode::Integer(52));

        assert_eq!(
            decode(b"d3:foo3:bar5:helloi52ee"),
            Ok((Bencode::Dictionary(expected), 23))
        );
    }

    #[test]
    fn decode_bencode_dictionary_keeps_wire_order() {
        let (value, _) = decode(b"d5:helloi52e3:foo3:bare").unwrap();
        let keys: Vec<&[u8]> = value.as_dict().unwrap().keys().map(Vec::as_slice).collect();
        assert_eq!(keys, vec![&b"hello"[..], &b"foo"[..]]);
    }

    #[test]
    fn decode_bencode_nested_dict() {
        let mut nested = IndexMap::new();
        nested.insert(b"hello".to_vec(), Bencode::Integer(52));

        let mut expected = IndexMap::new();
        expected.insert(b"foo".to_vec(), Bencode::string("bar"));
        expected.insert(b"hi".to_vec(), Bencode::Dictionary(nested));

        assert_eq!(
            decode(b"d3:foo3:bar2:hid5:helloi52eee"),
            Ok((Bencode::Dictionary(expected), 29))
        );
    }

    #[test]
    fn decode_bencode_dictionary_errors() {
        assert_eq!(decode(b"di1ei2ee"), Err(DecodeError::InvalidKeyType { offset: 1 }));
        assert_eq!(decode(b"dl1:aei1ee"), Err(DecodeError::InvalidKeyType { offset: 1 }));
        assert_eq!(decode(b"d3:foo3:bar"), Err(DecodeError::TruncatedInput { offset: 11 }));
        assert_eq!(decode(b"d3:foo"), Err(DecodeError::TruncatedInput { offset: 6 }));
    }

    #[test]
    fn decode_duplicate_key_keeps_last_value() {
        let (value, _) = decode(b"d1:ai1e1:bi2e1:ai3ee").unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get_index(0), Some((&b"a".to_vec(), &Bencode::Integer(3))));
    }

    #[test]
    fn decode_unknown_value_type() {
        assert_eq!(
            decode(b"x"),
            Err(DecodeError::UnknownValueType { byte: b'x', offset: 0 })
        );
        assert_eq!(
            decode(b"l-1e"),
            Err(DecodeError::UnknownValueType { byte: b'-', offset: 1 })
        );
    }

    #[test]
    fn decode_empty_input() {
        assert_eq!(decode(b""), Err(DecodeError::TruncatedInput { offset: 0 }));
        assert_eq!(
            Bencode::decode(b"i1e", 3),
            Err(DecodeError::TruncatedInput { offset: 3 })
        );
    }

    #[test]
    fn decode_at_offset_reports_own_span() {
        let input = b"i1e4:spamle";
        assert_eq!(Bencode::decode(input, 3), Ok((Bencode::string("spam"), 6)));
        assert_eq!(Bencode::decode(input, 9), Ok((Bencode::List(vec![]), 2)));
    }

    #[test]
    fn decode_nesting_limit() {
        let nested = |depth: usize| {
            let mut input = vec![b'l'; depth];
            input.extend(std::iter::repeat(b'e').take(depth));
            input
        };

        assert!(decode(&nested(MAX_DEPTH)).is_ok());
        assert_eq!(
            decode(&nested(MAX_DEPTH + 1)),
            Err(DecodeError::NestingTooDeep { offset: MAX_DEPTH })
        );
        // Unterminated hostile input trips the guard before running out of bytes.
        assert_eq!(
            decode(&[b'l'; 10_000]),
            Err(DecodeError::NestingTooDeep { offset: MAX_DEPTH })
        );
    }

    #[test]
    fn decode_all_rejects_trailing_data() {
        assert_eq!(Bencode::decode_all(b"i42e"), Ok(Bencode::Integer(42)));
        assert_eq!(
            Bencode::decode_all(b"i42eextra"),
            Err(DecodeError::TrailingData { offset: 4 })
        );
    }
}
