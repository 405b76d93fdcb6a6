use crate::error::Error;
use regex::Regex;

/// Characters allowed between the identifier and the rest of the name.
const SEPARATORS: &[char] = &['_', ' ', '-'];

/// Canonical form of an identifier, shared by folder parsing and the record
/// index.
pub fn canonical_identifier(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parts of a folder name after identifier and suffix extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub identifier: Option<String>,
    pub base_part: String,
    pub suffix: Option<String>,
}

/// Extracts canonical identifiers (`RJ01234567`) and `.partN` suffixes from
/// folder names.
#[derive(Debug, Clone)]
pub struct IdentifierMatcher {
    prefix: String,
    identifier_re: Regex,
    suffix_re: Regex,
}

impl IdentifierMatcher {
    pub fn new(prefix: &str) -> Result<Self, Error> {
        let identifier_re = Regex::new(&format!(r"(?i)^({})(\d+)", regex::escape(prefix)))
            .map_err(|e| Error::InvalidInput(format!("bad identifier prefix {:?}: {}", prefix, e)))?;
        let suffix_re = Regex::new(r"(?i)\.(part\d+)$")
            .map_err(|e| Error::Other(format!("suffix pattern: {}", e)))?;

        Ok(Self {
            prefix: prefix.to_uppercase(),
            identifier_re,
            suffix_re,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, name: &str) -> ParsedName {
        let (stem, suffix) = match self.suffix_re.captures(name) {
            Some(caps) => {
                let whole = caps.get(0).map_or(name.len(), |m| m.start());
                (&name[..whole], caps.get(1).map(|m| m.as_str().to_string()))
            }
            None => (name, None),
        };

        match self.identifier_re.captures(stem) {
            Some(caps) => {
                let end = caps.get(0).map_or(0, |m| m.end());
                let identifier = canonical_identifier(&caps[0]);
                let base_part = stem[end..].trim_start_matches(SEPARATORS).to_string();
                ParsedName {
                    identifier: Some(identifier),
                    base_part,
                    suffix,
                }
            }
            None => ParsedName {
                identifier: None,
                base_part: stem.to_string(),
                suffix,
            },
        }
    }

    pub fn extract_identifier(&self, name: &str) -> Option<String> {
        self.parse(name).identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> IdentifierMatcher {
        IdentifierMatcher::new("RJ").unwrap()
    }

    #[test]
    fn test_identifier_any_case() {
        let m = matcher();
        for name in ["RJ243414", "rj243414", "Rj243414_title", "rJ243414.part2"] {
            assert_eq!(m.extract_identifier(name).as_deref(), Some("RJ243414"), "{name}");
        }
        assert_eq!(
            m.extract_identifier("rj01382778_小さなお姉さん").as_deref(),
            Some("RJ01382778")
        );
    }

    #[test]
    fn test_no_identifier() {
        let m = matcher();
        assert_eq!(m.extract_identifier("some_other_folder"), None);
        assert_eq!(m.extract_identifier("RJ_no_digits"), None);
        assert_eq!(m.extract_identifier("xRJ123"), None);
        assert_eq!(m.extract_identifier(""), None);
    }

    #[test]
    fn test_base_part_and_suffix() {
        let m = matcher();
        let parsed = m.parse("RJ243414_OldTitle");
        assert_eq!(parsed.base_part, "OldTitle");
        assert_eq!(parsed.suffix, None);

        let parsed = m.parse("RJ243414_メイドと暮らそ♪.part1");
        assert_eq!(parsed.identifier.as_deref(), Some("RJ243414"));
        assert_eq!(parsed.base_part, "メイドと暮らそ♪");
        assert_eq!(parsed.suffix.as_deref(), Some("part1"));

        let parsed = m.parse("RJ500000.part2");
        assert_eq!(parsed.base_part, "");
        assert_eq!(parsed.suffix.as_deref(), Some("part2"));
    }

    #[test]
    fn test_suffix_without_identifier() {
        let m = matcher();
        let parsed = m.parse("Some Title.Part12");
        assert_eq!(parsed.identifier, None);
        assert_eq!(parsed.base_part, "Some Title");
        assert_eq!(parsed.suffix.as_deref(), Some("Part12"));
    }

    #[test]
    fn test_suffix_only_at_end() {
        let m = matcher();
        let parsed = m.parse("RJ1_a.part1 extra");
        assert_eq!(parsed.suffix, None);
        assert_eq!(parsed.base_part, "a.part1 extra");
        assert_eq!(m.parse("RJ1.part").suffix, None);
    }

    #[test]
    fn test_canonical_identifier() {
        assert_eq!(canonical_identifier(" rj01382778 "), "RJ01382778");
        let m = matcher();
        let from_folder = m.extract_identifier("rJ01382778_title").unwrap();
        assert_eq!(from_folder, canonical_identifier("Rj01382778"));
    }

    #[test]
    fn test_custom_prefix() {
        let m = IdentifierMatcher::new("vj").unwrap();
        assert_eq!(m.prefix(), "VJ");
        assert_eq!(m.extract_identifier("vj0099_x").as_deref(), Some("VJ0099"));
        assert_eq!(m.extract_identifier("RJ0099_x"), None);
    }
}
