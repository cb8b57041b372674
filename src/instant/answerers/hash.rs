use async_trait::async_trait;
use md5::Md5;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest as _, Sha224, Sha256, Sha512};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

/// A hex digest and the text it was computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub original: String,
    pub algo: String,
    pub digest: String,
}

/// `md5 this`, `sha256 hash of "some text"`.
pub struct Hash {
    patterns: Vec<Regex>,
}

impl Hash {
    pub fn new() -> Result<Self> {
        let t = alternation(&["md5", "sha", "sha1", "sha224", "sha256", "sha512"]);
        Ok(Self {
            patterns: compile(&[format!(r"^(?P<trigger>{t}) (?P<remainder>.*)$")])?,
        })
    }
}

/// Drop `hash ` then `of ` then a pair of double quotes.
fn subject(remainder: &str) -> &str {
    let s = remainder.strip_prefix("hash ").unwrap_or(remainder);
    let s = s.strip_prefix("of ").unwrap_or(s);
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hex digest of `input` under the named algorithm. `sha` means SHA-1.
pub fn digest(algo: &str, input: &str) -> Option<(&'static str, String)> {
    let bytes = input.as_bytes();
    let out = match algo {
        "md5" => ("MD5", hex(&Md5::digest(bytes))),
        "sha" | "sha1" => ("SHA1", hex(&Sha1::digest(bytes))),
        "sha224" => ("SHA224", hex(&Sha224::digest(bytes))),
        "sha256" => ("SHA256", hex(&Sha256::digest(bytes))),
        "sha512" => ("SHA512", hex(&Sha512::digest(bytes))),
        _ => return None,
    };
    Some(out)
}

#[async_trait]
impl Answerer for Hash {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Hash
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let original = subject(&m.remainder);
        if original.trim().is_empty() {
            return Err(JiveError::InvalidInput("nothing to hash".into()));
        }
        let (algo, digest) = digest(&m.trigger, original.trim())
            .ok_or_else(|| JiveError::InvalidInput(format!("unknown hash {}", m.trigger)))?;
        Ok(Solution::Hash(Digest {
            original: original.to_owned(),
            algo: algo.to_owned(),
            digest,
        }))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        let expect = |original: &str, algo: &str, digest: &str| {
            Solution::Hash(Digest {
                original: original.into(),
                algo: algo.into(),
                digest: digest.into(),
            })
        };
        let sentence = "this entire string";
        vec![
            SelfTest::new(
                "md5 this",
                expect("this", "MD5", "9e925e9341b490bfd3b4c4ca3b0c1ef2"),
            ),
            SelfTest::new(
                r#"sha hash of "this entire string""#,
                expect(sentence, "SHA1", "dd5c370a950f4dbb48a6212b0bde03eb3a021897"),
            ),
            SelfTest::new(
                r#"sha1 "this entire string""#,
                expect(sentence, "SHA1", "dd5c370a950f4dbb48a6212b0bde03eb3a021897"),
            ),
            SelfTest::new(
                r#"sha224 hash of "this entire string""#,
                expect(
                    sentence,
                    "SHA224",
                    "f9cbc8589549f186e44921d765a93719f380097e0af88070bf6607a9",
                ),
            ),
            SelfTest::new(
                r#"sha256 hash of "this entire string""#,
                expect(
                    sentence,
                    "SHA256",
                    "820b0b1b609e77038b1f37e623e7f05cce9f7727fd1f557607e9badd431d208f",
                ),
            ),
            SelfTest::new(
                "sha512 of another string",
                expect(
                    "another string",
                    "SHA512",
                    "410f7993f53b148c5b439c8e48fd5083860d648a00ff7579b0046257822c35658591bddc662ea8bda650cd729f1f3f876038240fa0422a811cc00eeff170e500",
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_strips_filler_and_quotes() {
        assert_eq!(subject("hash of \"abc\""), "abc");
        assert_eq!(subject("of abc"), "abc");
        assert_eq!(subject("abc"), "abc");
    }

    #[test]
    fn known_vectors() {
        assert_eq!(
            digest("md5", "").unwrap().1,
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest("sha", "abc").unwrap(),
            ("SHA1", "a9993e364706816aba3e25717850c26c9cd0d89d".to_owned())
        );
        assert!(digest("crc32", "abc").is_none());
    }

    #[test]
    fn triggers_only_as_prefix() {
        let h = Hash::new().unwrap();
        assert!(h.matches("this md5").is_none());
        assert_eq!(h.matches("sha256 foo").unwrap().trigger, "sha256");
    }

    #[tokio::test]
    async fn empty_subject_is_invalid() {
        let h = Hash::new().unwrap();
        let m = h.matches(r#"md5 """#).unwrap();
        let err = h.solve(&m, &QueryContext::new(r#"md5 """#)).await.unwrap_err();
        assert_eq!(err.kind(), "invalid-input");
    }
}
