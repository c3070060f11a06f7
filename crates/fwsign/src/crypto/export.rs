//! Embeddable C headers for key material.
//!
//! Firmware that validates images needs the public keys compiled in, and the
//! signing side wants the private scalar in the same familiar shape. Each
//! header carries the hex encoding on a marker comment line so that
//! [`crate::crypto::keys`] can read it back without depending on line numbers.

use super::keys::{public_key_bytes, PRIVATE_KEY_MARKER, PUBLIC_KEY_MARKER};
use p256::ecdsa::SigningKey;

/// Rendered C headers for one generated key pair.
#[derive(Debug, Clone)]
pub struct KeyPairHeaders {
    /// File name for the private key header, e.g. `private_key1.h`
    pub private_file_name: String,
    /// Contents of the private key header
    pub private_header: String,
    /// File name for the public key header, e.g. `public_key1.h`
    pub public_file_name: String,
    /// Contents of the public key header
    pub public_header: String,
}

/// Render both headers for `key`, naming variables `private_key{index}` and
/// `public_key{index}`.
pub fn key_pair_headers(key: &SigningKey, index: u32) -> KeyPairHeaders {
    let private_name = format!("private_key{index}");
    let public_name = format!("public_key{index}");

    let private_header = render_c_header(&private_name, PRIVATE_KEY_MARKER, &key.to_bytes());
    let public_header = render_c_header(
        &public_name,
        PUBLIC_KEY_MARKER,
        &public_key_bytes(key.verifying_key()),
    );

    KeyPairHeaders {
        private_file_name: format!("{private_name}.h"),
        private_header,
        public_file_name: format!("{public_name}.h"),
        public_header,
    }
}

/// Render `data` as a `const uint8_t` array split over two lines.
pub fn render_c_header(var_name: &str, marker: &str, data: &[u8]) -> String {
    let elements: Vec<String> = data.iter().map(|b| format!("0x{b:02x}")).collect();
    let mid = elements.len().div_ceil(2);
    let (first, second) = elements.split_at(mid);

    let mut body = format!("\t{}", first.join(", "));
    if !second.is_empty() {
        body.push_str(",\n\t");
        body.push_str(&second.join(", "));
    }

    format!(
        "/*\n\
         \x20* ******************* WARNING ******************\n\
         \x20* This is an auto generated file, don't make any changes.\n\
         \x20* Otherwise this will not be compatible with the CLI.\n\
         \x20*/\n\
         \n\
         // {marker}{hex}\n\
         const uint8_t {var_name}[{len}] =\n\
         {{\n\
         {body}\n\
         }};\n",
        hex = hex::encode(data),
        len = data.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{parse_signing_key, parse_verifying_key, signing_key_from_bytes};

    #[test]
    fn test_render_layout() {
        let header = render_c_header("demo", "DEMO_HEX=", &[0x01, 0x02, 0x0a]);
        assert!(header.contains("// DEMO_HEX=01020a\n"));
        assert!(header.contains("const uint8_t demo[3] =\n{\n\t0x01, 0x02,\n\t0x0a\n};\n"));
    }

    #[test]
    fn test_headers_load_back() {
        let key = signing_key_from_bytes(&[0x5a; 32]).unwrap();
        let headers = key_pair_headers(&key, 2);

        assert_eq!(headers.private_file_name, "private_key2.h");
        assert_eq!(headers.public_file_name, "public_key2.h");
        assert!(headers.private_header.contains("private_key2[32]"));
        assert!(headers.public_header.contains("public_key2[33]"));

        let loaded = parse_signing_key(headers.private_header.as_bytes()).unwrap();
        assert_eq!(loaded.to_bytes(), key.to_bytes());
        let loaded_pub = parse_verifying_key(headers.public_header.as_bytes()).unwrap();
        assert_eq!(&loaded_pub, key.verifying_key());
    }
}
