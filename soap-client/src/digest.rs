//! HTTP Digest authentication (RFC 7616, MD5 / `qop=auth` only)
//!
//! The SOAP client always sends its first request without credentials. When a
//! device answers `401` with a `WWW-Authenticate: Digest ...` challenge, this
//! module turns the challenge plus the configured credentials into the
//! `Authorization` header of the single retried request.
//!
//! Every header uses a fresh client nonce and a nonce count of `00000001`; no
//! state is kept between calls.

use std::collections::HashMap;

use md5::{Digest, Md5};
use rand::RngCore;

use crate::error::SoapError;

/// Method used for every SOAP invocation
const METHOD: &str = "POST";

/// Nonce count sent with every header
pub const NONCE_COUNT: &str = "00000001";

/// A parsed `WWW-Authenticate: Digest` challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub qop: String,
    pub opaque: Option<String>,
}

impl DigestChallenge {
    /// Parse a challenge header value.
    ///
    /// Fails with [`SoapError::UnsupportedDigest`] when the scheme is not
    /// `Digest`, the algorithm is anything but MD5, `qop` is not exactly
    /// `auth`, or `realm`/`nonce` are missing.
    pub fn parse(header: &str) -> Result<Self, SoapError> {
        let header = header.trim();
        let (scheme, rest) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
        if !scheme.eq_ignore_ascii_case("digest") {
            return Err(SoapError::UnsupportedDigest(format!(
                "expected Digest scheme, got '{}'",
                scheme
            )));
        }

        let mut directives = parse_directives(rest);

        if let Some(algorithm) = directives.get("algorithm") {
            if algorithm != "MD5" {
                return Err(SoapError::UnsupportedDigest(format!(
                    "algorithm '{}'",
                    algorithm
                )));
            }
        }

        let qop = directives.remove("qop").unwrap_or_default();
        if qop != "auth" {
            return Err(SoapError::UnsupportedDigest(format!("qop '{}'", qop)));
        }

        let realm = directives
            .remove("realm")
            .ok_or_else(|| SoapError::UnsupportedDigest("missing realm".to_string()))?;
        let nonce = directives
            .remove("nonce")
            .ok_or_else(|| SoapError::UnsupportedDigest("missing nonce".to_string()))?;

        Ok(Self {
            realm,
            nonce,
            qop,
            opaque: directives.remove("opaque"),
        })
    }

    /// Build the `Authorization` header value using the given client nonce
    pub fn authorization(
        &self,
        username: &str,
        password: &str,
        request_path: &str,
        cnonce: &str,
    ) -> String {
        let response = response_digest(
            username,
            &self.realm,
            password,
            &self.nonce,
            NONCE_COUNT,
            cnonce,
            &self.qop,
            request_path,
        );

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", cnonce="{}", nc={}, qop={}, response="{}", algorithm=MD5"#,
            quote(username),
            quote(&self.realm),
            quote(&self.nonce),
            quote(request_path),
            cnonce,
            NONCE_COUNT,
            self.qop,
            response
        );
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{}""#, quote(opaque)));
        }
        header
    }
}

/// Compute the `Authorization` header answering `challenge`.
///
/// # Arguments
/// * `challenge` - Raw `WWW-Authenticate` header value
/// * `username` / `password` - Device credentials
/// * `request_path` - Path of the control URL the request is sent to
pub fn authorization_header(
    challenge: &str,
    username: &str,
    password: &str,
    request_path: &str,
) -> Result<String, SoapError> {
    let challenge = DigestChallenge::parse(challenge)?;
    Ok(challenge.authorization(username, password, request_path, &client_nonce()))
}

/// The RFC digest: `MD5(HA1:nonce:nc:cnonce:qop:HA2)`
#[allow(clippy::too_many_arguments)]
pub fn response_digest(
    username: &str,
    realm: &str,
    password: &str,
    nonce: &str,
    nc: &str,
    cnonce: &str,
    qop: &str,
    request_path: &str,
) -> String {
    let ha1 = hex_md5(&[username, realm, password]);
    let ha2 = hex_md5(&[METHOD, request_path]);
    hex_md5(&[&ha1, nonce, nc, cnonce, qop, &ha2])
}

/// 8 random bytes rendered as lowercase hex
fn client_nonce() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hex_md5(parts: &[&str]) -> String {
    let mut hasher = Md5::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Split `k=v, k="v, with comma"` into a map with lowercased keys
fn parse_directives(input: &str) -> HashMap<String, String> {
    let mut directives = HashMap::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ',' {
                break;
            }
            key.push(c);
            chars.next();
        }
        let key = key.trim().to_ascii_lowercase();

        if chars.peek().is_none() && key.is_empty() {
            break;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            if chars.peek() == Some(&'"') {
                chars.next();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => value.push(c),
                    }
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
                value = value.trim().to_string();
            }
        }

        if !key.is_empty() {
            directives.insert(key, value);
        }
    }

    directives
}
