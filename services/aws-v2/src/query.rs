use crate::constants::AWS_QUERY_ENCODE_SET;
use percent_encoding::utf8_percent_encode;

/// Percent-encode a query value the way Signature Version 2 expects.
///
/// Letters, digits and `-._~` are kept, every other byte becomes `%XX` with
/// uppercase hex digits. A space is `%20`, never `+`.
pub fn escape(value: &str) -> String {
    utf8_percent_encode(value, &AWS_QUERY_ENCODE_SET).to_string()
}

/// Build the canonical query string.
///
/// Pairs are sorted by key in byte order and joined as `key=escape(value)`
/// with `&`. Keys are not escaped.
pub fn canonicalize<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = pairs.into_iter().collect();
    pairs.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));

    let mut s = String::new();
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            s.push('&');
        }
        s.push_str(k.as_ref());
        s.push('=');
        s.push_str(&escape(v.as_ref()));
    }
    s
}

/// Decode a query string into its pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("abcXYZ019", "abcXYZ019"; "alphanumeric")]
    #[test_case("-._~", "-._~"; "unreserved marks")]
    #[test_case(" ", "%20"; "space")]
    #[test_case("~,", "~%2C"; "comma")]
    #[test_case("…", "%E2%80%A6"; "multibyte")]
    #[test_case("a+b=c&d/e", "a%2Bb%3Dc%26d%2Fe"; "reserved")]
    #[test_case("2011-10-03T15:19:30", "2011-10-03T15%3A19%3A30"; "timestamp")]
    fn test_escape(input: &str, expected: &str) {
        assert_eq!(escape(input), expected);
    }

    #[test]
    fn test_canonicalize_sorts_by_bytes() {
        assert_eq!(canonicalize([("A10", "1"), ("A1", "1")]), "A1=1&A10=1");
        assert_eq!(
            canonicalize([("b", "1"), ("B", "2"), ("a", "3")]),
            "B=2&a=3&b=1"
        );
    }

    #[test]
    fn test_canonicalize_ignores_insertion_order() {
        let pairs = [
            ("Operation", "ItemLookup"),
            ("ItemId", "0816614024"),
            ("Service", "AWSECommerceService"),
        ];
        let mut reversed = pairs;
        reversed.reverse();

        assert_eq!(canonicalize(pairs), canonicalize(reversed));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert_eq!(canonicalize(Vec::<(String, String)>::new()), "");
    }

    #[test]
    fn test_canonical_query_is_fixed_point() {
        let q = canonicalize([
            ("Keywords", "Foucault & Power"),
            ("Title", "…+~"),
            ("Empty", ""),
        ]);
        assert_eq!(
            q,
            "Empty=&Keywords=Foucault%20%26%20Power&Title=%E2%80%A6%2B~"
        );
        assert_eq!(canonicalize(parse_query(&q)), q);
    }
}
