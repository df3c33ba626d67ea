// Licensed under the Apache-2.0 license

/// Text codecs for share blocks: plain lowercase hex, or the C-style escaped
/// form (`\x6c\x31...`) pasteable into firmware source. The two are symmetric
/// serializations behind one interface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    Hex,
    CEscaped,
}

impl Encoding {
    pub fn bytes_to_text(self, data: &[u8]) -> String {
        match self {
            Encoding::Hex => hex::encode(data),
            Encoding::CEscaped => data.iter().map(|b| format!("\\x{b:02x}")).collect(),
        }
    }

    pub fn text_to_bytes(self, text: &str) -> Result<Vec<u8>, String> {
        match self {
            Encoding::Hex => {
                hex::decode(text).map_err(|_| "input must be valid hexadecimal".to_string())
            }
            Encoding::CEscaped => {
                let mut bytes = Vec::new();
                let mut rest = text.as_bytes();
                while !rest.is_empty() {
                    let [b'\\', b'x', hi, lo, tail @ ..] = rest else {
                        return Err("input must be a sequence of \\xHH escapes".to_string());
                    };
                    let hx = [*hi, *lo];
                    let byte = std::str::from_utf8(&hx)
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok())
                        .ok_or_else(|| "input must be a sequence of \\xHH escapes".to_string())?;
                    bytes.push(byte);
                    rest = tail;
                }
                Ok(bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let data = [0x6c, 0x31, 0x10, 0x89];
        let text = Encoding::Hex.bytes_to_text(&data);
        assert_eq!(text, "6c311089");
        assert_eq!(Encoding::Hex.text_to_bytes(&text).unwrap(), data);
    }

    #[test]
    fn test_c_escaped_round_trip() {
        let data = [0x6c, 0x31, 0x10, 0x89];
        let text = Encoding::CEscaped.bytes_to_text(&data);
        assert_eq!(text, "\\x6c\\x31\\x10\\x89");
        assert_eq!(Encoding::CEscaped.text_to_bytes(&text).unwrap(), data);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Encoding::Hex.text_to_bytes("zz").is_err());
        assert!(Encoding::Hex.text_to_bytes("abc").is_err());
    }

    #[test]
    fn test_c_escaped_rejects_garbage() {
        assert!(Encoding::CEscaped.text_to_bytes("6c31").is_err());
        assert!(Encoding::CEscaped.text_to_bytes("\\x6").is_err());
        assert!(Encoding::CEscaped.text_to_bytes("\\xzz").is_err());
    }
}
